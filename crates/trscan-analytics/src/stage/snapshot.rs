//! EMA 정렬 스냅샷.
//!
//! 스테이지 규칙이 참조하는 모든 조건을 캔들 하나에서 한 번에 추출한
//! 불리언 묶음입니다. 규칙 테이블(`classifier`)은 이 스냅샷만 보고
//! 동작하므로 정렬 케이스별로 단위 테스트할 수 있습니다.

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorFrame;

/// 캔들 하나의 EMA/오실레이터 정렬 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSnapshot {
    /// EMA 3 >= EMA 9
    pub ema3_above_ema9: bool,
    /// EMA 9 > EMA 20
    pub ema9_above_ema20: bool,
    /// EMA 9 > EMA 34
    pub ema9_above_ema34: bool,
    /// EMA 9 상승 중 (3캔들 전 대비)
    pub ema9_rising: bool,
    /// EMA 34 상승 중
    pub ema34_rising: bool,
    /// PPO 라인 > 0
    pub ppo_positive: bool,
    /// PPO 라인 < 0
    pub ppo_negative: bool,
    /// PPO 라인 상승 중
    pub ppo_rising: bool,
    /// PPO 라인 > 시그널
    pub ppo_above_signal: bool,
    /// PMO 라인 > 0
    pub pmo_positive: bool,
    /// PMO 라인 상승 중
    pub pmo_rising: bool,
    /// PMO 라인 > 시그널
    pub pmo_above_signal: bool,
}

impl AlignmentSnapshot {
    /// 프레임의 idx 캔들에서 스냅샷을 추출합니다.
    ///
    /// 필요한 지표 중 하나라도 룩백 미충족(None)이면 None을 반환하며,
    /// 이 경우 분류 결과는 `Indeterminate`입니다.
    pub fn from_frame(frame: &IndicatorFrame, idx: usize) -> Option<Self> {
        if idx >= frame.len() {
            return None;
        }

        let ema_3 = frame.ema_3[idx]?;
        let ema_9 = frame.ema_9[idx]?;
        let ema_20 = frame.ema_20[idx]?;
        let ema_34 = frame.ema_34[idx]?;
        let ppo_line = frame.ppo[idx].line?;
        let ppo_signal = frame.ppo[idx].signal?;
        let pmo_line = frame.pmo[idx].line?;
        let pmo_signal = frame.pmo[idx].signal?;
        let ema9_rising = frame.ema_9_rising[idx]?;
        let ema34_rising = frame.ema_34_rising[idx]?;
        let ppo_rising = frame.ppo_rising[idx]?;
        let pmo_rising = frame.pmo_rising[idx]?;

        Some(Self {
            ema3_above_ema9: ema_3 >= ema_9,
            ema9_above_ema20: ema_9 > ema_20,
            ema9_above_ema34: ema_9 > ema_34,
            ema9_rising,
            ema34_rising,
            ppo_positive: ppo_line > rust_decimal::Decimal::ZERO,
            ppo_negative: ppo_line < rust_decimal::Decimal::ZERO,
            ppo_rising,
            ppo_above_signal: ppo_line > ppo_signal,
            pmo_positive: pmo_line > rust_decimal::Decimal::ZERO,
            pmo_rising,
            pmo_above_signal: pmo_line > pmo_signal,
        })
    }

    /// 완전한 강세 정렬 스냅샷 (테스트 편의용).
    #[cfg(test)]
    pub(crate) fn full_bull() -> Self {
        Self {
            ema3_above_ema9: true,
            ema9_above_ema20: true,
            ema9_above_ema34: true,
            ema9_rising: true,
            ema34_rising: true,
            ppo_positive: true,
            ppo_negative: false,
            ppo_rising: true,
            ppo_above_signal: true,
            pmo_positive: true,
            pmo_rising: true,
            pmo_above_signal: true,
        }
    }

    /// 완전한 약세 정렬 스냅샷 (테스트 편의용).
    #[cfg(test)]
    pub(crate) fn full_bear() -> Self {
        Self {
            ema3_above_ema9: false,
            ema9_above_ema20: false,
            ema9_above_ema34: false,
            ema9_rising: false,
            ema34_rising: false,
            ppo_positive: false,
            ppo_negative: true,
            ppo_rising: false,
            ppo_above_signal: false,
            pmo_positive: false,
            pmo_rising: false,
            pmo_above_signal: false,
        }
    }
}
