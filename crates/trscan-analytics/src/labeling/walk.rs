//! 전방 리플레이 상태 기계.
//!
//! 진입 이후 캔들을 순서대로 걸으며 종가 기준 수익률을 추적합니다:
//!
//! - 수익률이 목표에 먼저 닿으면 `Success`, 손절에 먼저 닿으면 `Failure`
//! - 이력이 끝날 때까지 미결이면 마지막 수익률이 양수일 때만 `Success`
//!   ("수익 중인 미결 포지션은 승리" 규칙), 0 이하면 데이터셋에서 제외
//! - 전방 캔들이 최소 개수보다 적으면 제외
//!
//! 장기 이동평균 이탈은 청산 규칙이지 결과가 아니므로 레이블링에
//! 전혀 반영하지 않습니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use trscan_core::{Bar, BuySignal, LabeledSignal, Outcome};

use super::LabelConfig;

/// 데이터셋에서 제외된 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Excluded {
    /// 전방 캔들 부족 - 판정할 근거가 없음
    InsufficientData { required: usize, provided: usize },
    /// 이력 종료 시점에 수익이 없는 미결 상태 - 증거 불충분
    OpenNotProfitable,
}

/// 레이블링 결과.
///
/// 유지된 신호는 정확히 하나의 레이블을 받고, 제외된 신호는 레이블
/// 없이 사유만 남습니다. 둘 다인 경우는 없습니다.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelResult {
    /// 데이터셋에 포함
    Labeled(LabeledSignal),
    /// 데이터셋에서 제외
    Excluded(Excluded),
}

/// 신호 하나를 전방 캔들로 레이블링합니다.
///
/// `forward_bars`는 진입 캔들 이후의 캔들들입니다 (진입 캔들 제외,
/// 날짜 오름차순).
pub fn label_signal(
    signal: &BuySignal,
    forward_bars: &[Bar],
    config: &LabelConfig,
) -> LabelResult {
    if forward_bars.len() < config.min_forward_bars {
        return LabelResult::Excluded(Excluded::InsufficientData {
            required: config.min_forward_bars,
            provided: forward_bars.len(),
        });
    }

    let entry = signal.entry_price;
    let target_pct = config.target_pct(signal.timeframe);
    let stop_pct = config.stop_pct;

    let mut max_gain_pct = Decimal::MIN;
    let mut max_drawdown_pct = Decimal::MAX;
    let mut last_gain_pct = Decimal::ZERO;

    for (i, bar) in forward_bars.iter().enumerate() {
        let gain_pct = (bar.close - entry) / entry * dec!(100);
        max_gain_pct = max_gain_pct.max(gain_pct);
        max_drawdown_pct = max_drawdown_pct.min(gain_pct);
        last_gain_pct = gain_pct;

        if gain_pct >= target_pct {
            return LabelResult::Labeled(LabeledSignal {
                signal: signal.clone(),
                outcome: Outcome::Success,
                bars_to_resolution: Some((i + 1) as u32),
                max_gain_pct,
                max_drawdown_pct: max_drawdown_pct.min(Decimal::ZERO),
            });
        }

        if gain_pct <= -stop_pct {
            return LabelResult::Labeled(LabeledSignal {
                signal: signal.clone(),
                outcome: Outcome::Failure,
                bars_to_resolution: Some((i + 1) as u32),
                max_gain_pct: max_gain_pct.max(Decimal::ZERO),
                max_drawdown_pct,
            });
        }
    }

    // 이력 종료: 마지막 수익률이 양수인 미결 포지션만 승리로 집계
    if last_gain_pct > Decimal::ZERO {
        LabelResult::Labeled(LabeledSignal {
            signal: signal.clone(),
            outcome: Outcome::Success,
            bars_to_resolution: None,
            max_gain_pct,
            max_drawdown_pct: max_drawdown_pct.min(Decimal::ZERO),
        })
    } else {
        LabelResult::Excluded(Excluded::OpenNotProfitable)
    }
}
