//! 스테이지 규칙 테이블.
//!
//! 스냅샷 → 스테이지 매핑은 2단계를 먼저 확인한 뒤 3단계 조건이 추가로
//! 충족될 때만 Strong으로 승급합니다. 2단계 조건 없이 3단계가 단독으로
//! 판정되는 일은 없습니다.
//!
//! 2/3단계 규칙이 어느 쪽도 성립하지 않으면 EMA 3/9 관계로
//! NeutralBuy/NeutralSell을 부여합니다. 지표가 정의된 캔들은 항상
//! 여섯 스테이지 중 정확히 하나를 받습니다.

use trscan_core::TrStage;

use super::snapshot::AlignmentSnapshot;
use crate::indicators::IndicatorFrame;

/// 상승 2단계 (Buy) 조건.
fn is_uptrend_stage2(s: &AlignmentSnapshot) -> bool {
    s.ppo_positive && s.ppo_rising && s.ema34_rising && s.ppo_above_signal && s.ema9_above_ema20
}

/// 상승 3단계 (Strong Buy) 추가 조건.
///
/// 2단계 위에서 EMA 9 상승과 PMO 양수가 더해지면 승급합니다.
fn is_uptrend_stage3(s: &AlignmentSnapshot) -> bool {
    s.ema9_rising && s.pmo_positive
}

/// 하락 2단계 (Sell) 조건.
fn is_downtrend_stage2(s: &AlignmentSnapshot) -> bool {
    s.ppo_negative
        && !s.ppo_rising
        && !s.ppo_above_signal
        && !s.ema9_rising
        && !s.ema34_rising
        && !s.ema9_above_ema20
}

/// 하락 3단계 (Strong Sell) 추가 조건.
fn is_downtrend_stage3(s: &AlignmentSnapshot) -> bool {
    !s.pmo_rising && !s.pmo_above_signal && !s.ema9_above_ema34
}

/// 스냅샷을 스테이지로 분류하는 순수 함수.
pub fn classify_snapshot(snapshot: &AlignmentSnapshot) -> TrStage {
    if is_uptrend_stage2(snapshot) {
        if is_uptrend_stage3(snapshot) {
            return TrStage::StrongBuy;
        }
        return TrStage::Buy;
    }

    if is_downtrend_stage2(snapshot) {
        if is_downtrend_stage3(snapshot) {
            return TrStage::StrongSell;
        }
        return TrStage::Sell;
    }

    if snapshot.ema3_above_ema9 {
        TrStage::NeutralBuy
    } else {
        TrStage::NeutralSell
    }
}

/// TR 스테이지 분류기.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageClassifier;

impl StageClassifier {
    /// 새 분류기를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 프레임의 idx 캔들을 분류합니다.
    ///
    /// 지표 룩백이 채워지지 않은 캔들은 `Indeterminate`이며, 절대
    /// 스테이지를 추측하지 않습니다.
    pub fn classify(&self, frame: &IndicatorFrame, idx: usize) -> TrStage {
        match AlignmentSnapshot::from_frame(frame, idx) {
            Some(snapshot) => classify_snapshot(&snapshot),
            None => TrStage::Indeterminate,
        }
    }

    /// 프레임 전체를 분류합니다.
    pub fn classify_all(&self, frame: &IndicatorFrame) -> Vec<TrStage> {
        (0..frame.len()).map(|i| self.classify(frame, i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorEngine;
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use trscan_core::Bar;

    #[test]
    fn test_full_bull_is_strong_buy() {
        let snapshot = AlignmentSnapshot::full_bull();
        assert_eq!(classify_snapshot(&snapshot), TrStage::StrongBuy);
    }

    #[test]
    fn test_full_bear_is_strong_sell() {
        let snapshot = AlignmentSnapshot::full_bear();
        assert_eq!(classify_snapshot(&snapshot), TrStage::StrongSell);
    }

    #[test]
    fn test_stage2_without_pmo_is_plain_buy() {
        let snapshot = AlignmentSnapshot {
            pmo_positive: false,
            ..AlignmentSnapshot::full_bull()
        };
        assert_eq!(classify_snapshot(&snapshot), TrStage::Buy);
    }

    #[test]
    fn test_stage2_without_ema9_rising_is_plain_buy() {
        let snapshot = AlignmentSnapshot {
            ema9_rising: false,
            ..AlignmentSnapshot::full_bull()
        };
        assert_eq!(classify_snapshot(&snapshot), TrStage::Buy);
    }

    #[test]
    fn test_sell_without_stage3_extras() {
        // PMO가 아직 시그널 위이면 Strong Sell로 승급하지 못함
        let snapshot = AlignmentSnapshot {
            pmo_above_signal: true,
            ..AlignmentSnapshot::full_bear()
        };
        assert_eq!(classify_snapshot(&snapshot), TrStage::Sell);
    }

    #[test]
    fn test_ambiguous_alignment_is_neutral() {
        // PPO 음수인데 EMA 3 > EMA 9: 어느 2단계 규칙도 성립하지 않음
        let snapshot = AlignmentSnapshot {
            ppo_positive: false,
            ppo_negative: true,
            ppo_above_signal: false,
            ..AlignmentSnapshot::full_bull()
        };
        assert_eq!(classify_snapshot(&snapshot), TrStage::NeutralBuy);

        let snapshot = AlignmentSnapshot {
            ema3_above_ema9: false,
            ppo_rising: true,
            ..AlignmentSnapshot::full_bear()
        };
        assert_eq!(classify_snapshot(&snapshot), TrStage::NeutralSell);
    }

    #[test]
    fn test_classifier_totality_on_real_frame() {
        let start: NaiveDate = "2020-01-01".parse().unwrap();
        // 상승 후 하락이 섞인 시계열
        let bars: Vec<Bar> = (0..300)
            .map(|i| {
                let base = if i < 150 { 100 + i } else { 400 - i };
                let close = Decimal::from(base);
                Bar::new(
                    start + Duration::days(i as i64),
                    close,
                    close + dec!(1),
                    close - dec!(1),
                    close,
                    dec!(10000),
                )
            })
            .collect();

        let frame = IndicatorEngine::new().compute_frame(&bars).unwrap();
        let stages = StageClassifier::new().classify_all(&frame);

        assert_eq!(stages.len(), bars.len());
        // 지표가 정의된 캔들은 모두 확정 스테이지
        for (i, stage) in stages.iter().enumerate() {
            if AlignmentSnapshot::from_frame(&frame, i).is_some() {
                assert!(stage.is_determinate(), "index {} should be determinate", i);
            } else {
                assert_eq!(*stage, TrStage::Indeterminate);
            }
        }
    }

    #[test]
    fn test_accelerating_uptrend_reaches_strong_buy() {
        // 가속 상승: 선형 상승은 PPO가 서서히 줄어 Buy 조건을 깨므로,
        // Strong Buy에는 상승률 자체가 커지는 시계열이 필요함
        let start: NaiveDate = "2020-01-01".parse().unwrap();
        let mut close = dec!(100);
        let bars: Vec<Bar> = (0..200)
            .map(|i| {
                // 상승률이 매일 커지는 시계열: i번째 캔들 상승률 = 0.02% × i
                close *= Decimal::ONE + dec!(0.0002) * Decimal::from(i);
                Bar::new(
                    start + Duration::days(i as i64),
                    close,
                    close + dec!(1),
                    close - dec!(1),
                    close,
                    dec!(10000),
                )
            })
            .collect();

        let frame = IndicatorEngine::new().compute_frame(&bars).unwrap();
        let stage = StageClassifier::new().classify(&frame, 190);
        assert_eq!(stage, TrStage::StrongBuy);
    }
}
