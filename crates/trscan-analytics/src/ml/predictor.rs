//! 신뢰도 추론.
//!
//! 로드된 모델 아티팩트로 신호 하나의 성공 확률을 추정하고, 기여 요인과
//! 품질 티어를 함께 돌려줍니다. 아티팩트는 불변이므로 여러 읽기 쪽에서
//! 동시에 호출해도 안전합니다.

use std::sync::Arc;

use tracing::debug;

use trscan_core::Outcome;

use super::error::{MlError, MlResult};
use super::features::SignalFeatures;
use super::train::ConfidenceModel;
use super::types::{ConfidenceLevel, ConfidencePrediction};

/// 엘리트 신호에 권장하는 확장 목표 구간 (%). 기본 목표에서의 과거
/// 성공률이 이 소집단에서 유의하게 낮다는 관찰에 따른 문서화된
/// 휴리스틱이며, 모델이 다시 유도하는 값이 아닙니다.
pub const ELITE_TARGET_RANGE_PCT: (u32, u32) = (10, 15);

/// 신뢰도 추론 인터페이스.
pub trait ConfidenceScorer: Send + Sync {
    /// feature에서 신뢰도를 예측합니다.
    fn predict(&self, features: &SignalFeatures) -> MlResult<ConfidencePrediction>;

    /// 사용 중인 모델 버전을 반환합니다.
    fn model_version(&self) -> &str;
}

/// 모델 아티팩트 기반 predictor.
///
/// `Arc`로 공유되는 불변 모델을 감싸므로 복제 비용 없이 여러 스레드에서
/// 사용할 수 있습니다.
pub struct ModelPredictor {
    model: Arc<ConfidenceModel>,
}

impl ModelPredictor {
    /// 모델 아티팩트로 predictor를 생성합니다.
    pub fn new(model: Arc<ConfidenceModel>) -> Self {
        Self { model }
    }

    /// 모델을 반환합니다.
    pub fn model(&self) -> &ConfidenceModel {
        &self.model
    }
}

impl ConfidenceScorer for ModelPredictor {
    fn predict(&self, features: &SignalFeatures) -> MlResult<ConfidencePrediction> {
        let array = features.to_array();
        if array.iter().any(|v| !v.is_finite()) {
            return Err(MlError::FeatureIncomplete(
                "feature vector contains non-finite values".to_string(),
            ));
        }

        let proba = self.model.forest.predict_proba(&array)?;
        let confidence = (proba * 100.0).clamp(0.0, 100.0);

        let is_elite = features.has_rs_chaikin > 0.5;
        let prediction = ConfidencePrediction {
            confidence,
            level: ConfidenceLevel::from_confidence_pct(confidence),
            expected_outcome: if confidence >= 50.0 {
                Outcome::Success
            } else {
                Outcome::Failure
            },
            is_elite,
            quality_tier: quality_tier(features),
            contributing_factors: contributing_factors(features),
            model_version: self.model.version.clone(),
            timeframe: self.model.timeframe,
        };

        debug!(
            version = %self.model.version,
            confidence = confidence,
            is_elite = is_elite,
            "신뢰도 예측"
        );

        Ok(prediction)
    }

    fn model_version(&self) -> &str {
        &self.model.version
    }
}

/// 품질 티어 설명.
fn quality_tier(features: &SignalFeatures) -> String {
    let has_buy_point = features.has_buy_point > 0.5;
    let has_uptrend = features.has_uptrend > 0.5;
    let is_elite = features.has_rs_chaikin > 0.5;

    match (is_elite, has_uptrend, has_buy_point) {
        (true, _, _) => "Elite (RS + Chaikin top 5%)".to_string(),
        (false, true, true) => "Premium (uptrend + buy point)".to_string(),
        (false, _, true) => "Good (buy point)".to_string(),
        _ => "Basic".to_string(),
    }
}

/// 이 입력에서 prediction을 지지하는 요인 목록.
///
/// 스테이지/정렬/모멘텀/품질 플래그를 규칙 기반으로 설명합니다.
fn contributing_factors(features: &SignalFeatures) -> Vec<String> {
    let mut factors = Vec::new();

    if features.tr_stage <= 1.0 {
        factors.push("Strong Buy stage".to_string());
    } else if features.tr_stage <= 2.0 {
        factors.push("Buy stage".to_string());
    }

    if features.ema_alignment > 0.5 {
        factors.push("Strong bullish EMA alignment".to_string());
    } else if features.above_ema20 > 0.5 {
        factors.push("Price above key EMAs".to_string());
    }

    if features.ppo_value > 2.0 {
        factors.push("Strong positive momentum (PPO)".to_string());
    } else if features.ppo_value > 0.0 {
        factors.push("Positive momentum (PPO)".to_string());
    }

    if features.pmo_value > 2.0 {
        factors.push("Very strong PMO signal".to_string());
    } else if features.pmo_value > 0.0 {
        factors.push("Positive PMO signal".to_string());
    }

    if features.has_buy_point > 0.5 {
        factors.push("Entry inside buy zone".to_string());
    }

    if features.has_uptrend > 0.5 {
        factors.push("Uptrend confirmed (above long EMA)".to_string());
    }

    if features.has_rs_chaikin > 0.5 {
        factors.push(format!(
            "Elite: RS + Chaikin A/D confirmed - consider {}-{}% target",
            ELITE_TARGET_RANGE_PCT.0, ELITE_TARGET_RANGE_PCT.1
        ));
    }

    factors
}

/// 모델 파일 없이 테스트하기 위한 mock scorer.
pub struct MockScorer {
    /// 반환할 고정 신뢰도 (0 ~ 100)
    pub fixed_confidence: f32,
}

impl MockScorer {
    /// 고정 신뢰도로 mock을 생성합니다.
    pub fn new(fixed_confidence: f32) -> Self {
        Self { fixed_confidence }
    }
}

impl ConfidenceScorer for MockScorer {
    fn predict(&self, features: &SignalFeatures) -> MlResult<ConfidencePrediction> {
        Ok(ConfidencePrediction {
            confidence: self.fixed_confidence,
            level: ConfidenceLevel::from_confidence_pct(self.fixed_confidence),
            expected_outcome: if self.fixed_confidence >= 50.0 {
                Outcome::Success
            } else {
                Outcome::Failure
            },
            is_elite: features.has_rs_chaikin > 0.5,
            quality_tier: quality_tier(features),
            contributing_factors: contributing_factors(features),
            model_version: "mock".to_string(),
            timeframe: trscan_core::Timeframe::Daily,
        })
    }

    fn model_version(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trscan_core::{BuySignal, QualityFlags, Symbol, Timeframe, TrStage};

    fn sample_features(flags: QualityFlags) -> SignalFeatures {
        let entry = dec!(150);
        let signal = BuySignal {
            symbol: Symbol::new("AAPL"),
            timeframe: Timeframe::Daily,
            entry_date: "2024-03-04".parse().unwrap(),
            entry_price: entry,
            stage: TrStage::StrongBuy,
            buy_point: None,
            stop_loss: entry * dec!(0.9),
            ema_3: dec!(149),
            ema_9: dec!(147),
            ema_20: dec!(144),
            ema_34: dec!(140),
            ppo_value: dec!(2.5),
            ppo_histogram: dec!(0.6),
            pmo_value: dec!(3.0),
            flags,
        };
        SignalFeatures::try_from_signal(&signal).unwrap()
    }

    #[test]
    fn test_mock_scorer_levels() {
        let features = sample_features(QualityFlags::default());

        let high = MockScorer::new(72.0).predict(&features).unwrap();
        assert_eq!(high.level, ConfidenceLevel::High);
        assert_eq!(high.expected_outcome, Outcome::Success);

        let low = MockScorer::new(38.0).predict(&features).unwrap();
        assert_eq!(low.level, ConfidenceLevel::VeryLow);
        assert_eq!(low.expected_outcome, Outcome::Failure);
    }

    #[test]
    fn test_quality_tier_strings() {
        let basic = sample_features(QualityFlags::default());
        assert_eq!(quality_tier(&basic), "Basic");

        let good = sample_features(QualityFlags {
            has_buy_point: true,
            ..Default::default()
        });
        assert_eq!(quality_tier(&good), "Good (buy point)");

        let premium = sample_features(QualityFlags {
            has_buy_point: true,
            has_uptrend: true,
            ..Default::default()
        });
        assert_eq!(quality_tier(&premium), "Premium (uptrend + buy point)");

        let elite = sample_features(QualityFlags {
            has_buy_point: true,
            has_uptrend: true,
            has_rs_chaikin: true,
        });
        assert!(quality_tier(&elite).starts_with("Elite"));
    }

    #[test]
    fn test_contributing_factors_reflect_inputs() {
        let features = sample_features(QualityFlags {
            has_buy_point: true,
            has_uptrend: true,
            has_rs_chaikin: true,
        });
        let factors = contributing_factors(&features);

        assert!(factors.iter().any(|f| f.contains("Strong Buy stage")));
        assert!(factors.iter().any(|f| f.contains("EMA alignment")));
        assert!(factors.iter().any(|f| f.contains("PPO")));
        assert!(factors.iter().any(|f| f.contains("buy zone")));
        // 엘리트 요인에는 확장 목표 권장이 포함
        assert!(factors.iter().any(|f| f.contains("10-15% target")));
    }

    #[test]
    fn test_elite_flag_propagates() {
        let features = sample_features(QualityFlags {
            has_rs_chaikin: true,
            ..Default::default()
        });
        let prediction = MockScorer::new(60.0).predict(&features).unwrap();
        assert!(prediction.is_elite);
    }
}
