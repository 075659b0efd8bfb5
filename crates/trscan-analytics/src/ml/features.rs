//! 신호 feature 추출.
//!
//! `SignalFeatures`는 학습과 추론이 공유하는 고정 순서 feature
//! 구조체입니다. feature 집합이 바뀌면 이 구조체와 `FEATURE_NAMES`가
//! 함께 바뀌어야 하므로, 학습/추론 경로의 불일치는 타입 수준에서
//! 드러납니다. 런타임 딕셔너리 키 매칭에 의존하지 않습니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use trscan_core::BuySignal;

use super::error::{MlError, MlResult};
use super::types::FeatureVector;

/// feature 개수.
pub const FEATURE_COUNT: usize = 19;

/// feature 이름 (벡터 순서와 동일).
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "tr_stage",
    "distance_from_ema3",
    "distance_from_ema9",
    "distance_from_ema20",
    "distance_from_ema34",
    "above_ema3",
    "above_ema9",
    "above_ema20",
    "above_ema34",
    "ema_alignment",
    "ppo_value",
    "ppo_histogram",
    "ppo_positive",
    "ppo_strong",
    "pmo_value",
    "has_quality",
    "has_buy_point",
    "has_uptrend",
    "has_rs_chaikin",
];

/// PPO 강세 판정 절대값 임계.
const PPO_STRONG_THRESHOLD: Decimal = dec!(1.5);

/// 신호 하나의 feature 값들.
///
/// 필드 순서는 `FEATURE_NAMES` 및 `to_vector` 출력 순서와 같습니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalFeatures {
    /// 스테이지 코드 (1 ~ 6)
    pub tr_stage: f32,
    /// 진입가 대비 EMA 3 거리 (%)
    pub distance_from_ema3: f32,
    /// 진입가 대비 EMA 9 거리 (%)
    pub distance_from_ema9: f32,
    /// 진입가 대비 EMA 20 거리 (%)
    pub distance_from_ema20: f32,
    /// 진입가 대비 EMA 34 거리 (%)
    pub distance_from_ema34: f32,
    /// 진입가 > EMA 3
    pub above_ema3: f32,
    /// 진입가 > EMA 9
    pub above_ema9: f32,
    /// 진입가 > EMA 20
    pub above_ema20: f32,
    /// 진입가 > EMA 34
    pub above_ema34: f32,
    /// 강세 정렬 (EMA 3 > 9 > 20 > 34)
    pub ema_alignment: f32,
    /// PPO 라인 값
    pub ppo_value: f32,
    /// PPO 히스토그램
    pub ppo_histogram: f32,
    /// PPO > 0
    pub ppo_positive: f32,
    /// |PPO| > 1.5
    pub ppo_strong: f32,
    /// PMO 라인 값
    pub pmo_value: f32,
    /// 품질 마커 존재 (플래그 중 하나라도 설정)
    pub has_quality: f32,
    /// 매수 구간 안 진입
    pub has_buy_point: f32,
    /// 장기 EMA 위 진입
    pub has_uptrend: f32,
    /// RS + Chaikin 엘리트
    pub has_rs_chaikin: f32,
}

fn bit(condition: bool) -> f32 {
    if condition {
        1.0
    } else {
        0.0
    }
}

fn pct_distance(entry: Decimal, ema: Decimal) -> Decimal {
    (entry - ema) / entry * dec!(100)
}

fn to_f32(value: Decimal, name: &str) -> MlResult<f32> {
    value
        .to_f32()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MlError::FeatureIncomplete(format!("{} is not representable", name)))
}

impl SignalFeatures {
    /// 매수 신호에서 feature를 추출합니다.
    ///
    /// 스테이지가 미확정이거나 숫자 feature가 유한값으로 표현되지 않으면
    /// `FeatureIncomplete`로 실패합니다. 대체값을 추측해 채우지 않습니다.
    pub fn try_from_signal(signal: &BuySignal) -> MlResult<Self> {
        let stage_code = signal.stage.stage_code().ok_or_else(|| {
            MlError::FeatureIncomplete("stage is indeterminate".to_string())
        })?;

        if signal.entry_price <= Decimal::ZERO {
            return Err(MlError::FeatureIncomplete(
                "entry price must be positive".to_string(),
            ));
        }

        let entry = signal.entry_price;
        let ema_alignment = signal.ema_3 > signal.ema_9
            && signal.ema_9 > signal.ema_20
            && signal.ema_20 > signal.ema_34;

        Ok(Self {
            tr_stage: f32::from(stage_code),
            distance_from_ema3: to_f32(pct_distance(entry, signal.ema_3), "distance_from_ema3")?,
            distance_from_ema9: to_f32(pct_distance(entry, signal.ema_9), "distance_from_ema9")?,
            distance_from_ema20: to_f32(pct_distance(entry, signal.ema_20), "distance_from_ema20")?,
            distance_from_ema34: to_f32(pct_distance(entry, signal.ema_34), "distance_from_ema34")?,
            above_ema3: bit(entry > signal.ema_3),
            above_ema9: bit(entry > signal.ema_9),
            above_ema20: bit(entry > signal.ema_20),
            above_ema34: bit(entry > signal.ema_34),
            ema_alignment: bit(ema_alignment),
            ppo_value: to_f32(signal.ppo_value, "ppo_value")?,
            ppo_histogram: to_f32(signal.ppo_histogram, "ppo_histogram")?,
            ppo_positive: bit(signal.ppo_value > Decimal::ZERO),
            ppo_strong: bit(signal.ppo_value.abs() > PPO_STRONG_THRESHOLD),
            pmo_value: to_f32(signal.pmo_value, "pmo_value")?,
            has_quality: bit(
                signal.flags.has_buy_point
                    || signal.flags.has_uptrend
                    || signal.flags.has_rs_chaikin,
            ),
            has_buy_point: bit(signal.flags.has_buy_point),
            has_uptrend: bit(signal.flags.has_uptrend),
            has_rs_chaikin: bit(signal.flags.has_rs_chaikin),
        })
    }

    /// `FEATURE_NAMES` 순서의 배열로 변환합니다.
    pub fn to_array(&self) -> [f32; FEATURE_COUNT] {
        [
            self.tr_stage,
            self.distance_from_ema3,
            self.distance_from_ema9,
            self.distance_from_ema20,
            self.distance_from_ema34,
            self.above_ema3,
            self.above_ema9,
            self.above_ema20,
            self.above_ema34,
            self.ema_alignment,
            self.ppo_value,
            self.ppo_histogram,
            self.ppo_positive,
            self.ppo_strong,
            self.pmo_value,
            self.has_quality,
            self.has_buy_point,
            self.has_uptrend,
            self.has_rs_chaikin,
        ]
    }

    /// 이름이 붙은 feature vector로 변환합니다.
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector::with_names(
            self.to_array().to_vec(),
            FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trscan_core::{QualityFlags, Symbol, Timeframe, TrStage};

    fn sample_signal() -> BuySignal {
        BuySignal {
            symbol: Symbol::new("AAPL"),
            timeframe: Timeframe::Daily,
            entry_date: "2024-03-04".parse().unwrap(),
            entry_price: dec!(150.5),
            stage: TrStage::StrongBuy,
            buy_point: Some(dec!(152)),
            stop_loss: dec!(135.45),
            ema_3: dec!(149.8),
            ema_9: dec!(148.2),
            ema_20: dec!(145.8),
            ema_34: dec!(142.0),
            ppo_value: dec!(2.1),
            ppo_histogram: dec!(0.5),
            pmo_value: dec!(3.2),
            flags: QualityFlags {
                has_buy_point: true,
                has_uptrend: true,
                has_rs_chaikin: false,
            },
        }
    }

    #[test]
    fn test_feature_extraction() {
        let features = SignalFeatures::try_from_signal(&sample_signal()).unwrap();

        assert_eq!(features.tr_stage, 1.0);
        assert_eq!(features.above_ema3, 1.0);
        assert_eq!(features.ema_alignment, 1.0);
        assert_eq!(features.ppo_positive, 1.0);
        assert_eq!(features.ppo_strong, 1.0);
        assert_eq!(features.has_buy_point, 1.0);
        assert_eq!(features.has_rs_chaikin, 0.0);
        assert_eq!(features.has_quality, 1.0);
        // (150.5 - 149.8) / 150.5 * 100 ≈ 0.465%
        assert!((features.distance_from_ema3 - 0.465).abs() < 0.01);
    }

    #[test]
    fn test_feature_vector_order_matches_names() {
        let features = SignalFeatures::try_from_signal(&sample_signal()).unwrap();
        let vector = features.to_vector();

        assert_eq!(vector.len(), FEATURE_COUNT);
        let names = vector.names().unwrap();
        assert_eq!(names[0], "tr_stage");
        assert_eq!(names[FEATURE_COUNT - 1], "has_rs_chaikin");
        assert_eq!(vector.as_slice()[0], 1.0);
    }

    #[test]
    fn test_indeterminate_stage_is_feature_incomplete() {
        let mut signal = sample_signal();
        signal.stage = TrStage::Indeterminate;

        match SignalFeatures::try_from_signal(&signal) {
            Err(MlError::FeatureIncomplete(_)) => {}
            other => panic!("expected FeatureIncomplete, got {:?}", other),
        }
    }

    #[test]
    fn test_nonpositive_entry_price_rejected() {
        let mut signal = sample_signal();
        signal.entry_price = Decimal::ZERO;

        assert!(matches!(
            SignalFeatures::try_from_signal(&signal),
            Err(MlError::FeatureIncomplete(_))
        ));
    }
}
