//! ML 모듈의 공통 타입.

use serde::{Deserialize, Serialize};

use trscan_core::{Outcome, Timeframe};

/// ML 모델 입력을 위한 feature vector.
///
/// 디버깅/로깅용 feature 이름을 함께 담을 수 있는 f32 값 벡터입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    /// feature 값들
    values: Vec<f32>,
    /// 선택적 feature 이름
    names: Option<Vec<String>>,
}

impl FeatureVector {
    /// 값으로부터 새 feature vector를 생성합니다.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, names: None }
    }

    /// 이름이 있는 feature vector를 생성합니다.
    pub fn with_names(values: Vec<f32>, names: Vec<String>) -> Self {
        debug_assert_eq!(values.len(), names.len(), "Feature count mismatch");
        Self {
            values,
            names: Some(names),
        }
    }

    /// feature 값을 슬라이스로 반환합니다.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// feature 개수를 반환합니다.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 사용 가능한 경우 feature 이름을 반환합니다.
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    /// 소유된 Vec<f32>로 변환합니다.
    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }

    /// 모든 값이 유한한지 확인합니다.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

impl AsRef<[f32]> for FeatureVector {
    fn as_ref(&self) -> &[f32] {
        &self.values
    }
}

/// 신뢰도 수준 밴드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    /// 매우 낮음 (< 45%)
    VeryLow,
    /// 낮음 (45% ~ 55%)
    Low,
    /// 보통 (55% ~ 65%)
    Moderate,
    /// 높음 (65% ~ 75%)
    High,
    /// 매우 높음 (>= 75%)
    VeryHigh,
}

impl ConfidenceLevel {
    /// 신뢰도 퍼센트(0~100)에서 변환합니다.
    pub fn from_confidence_pct(pct: f32) -> Self {
        match pct {
            p if p >= 75.0 => ConfidenceLevel::VeryHigh,
            p if p >= 65.0 => ConfidenceLevel::High,
            p if p >= 55.0 => ConfidenceLevel::Moderate,
            p if p >= 45.0 => ConfidenceLevel::Low,
            _ => ConfidenceLevel::VeryLow,
        }
    }
}

/// 신뢰도 prediction 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidencePrediction {
    /// 성공 확률 (0 ~ 100)
    pub confidence: f32,
    /// 신뢰도 수준 밴드
    pub level: ConfidenceLevel,
    /// 예상 결과 (신뢰도 50% 기준)
    pub expected_outcome: Outcome,
    /// 엘리트 신호 여부 (has_rs_chaikin)
    pub is_elite: bool,
    /// 품질 티어 설명
    pub quality_tier: String,
    /// prediction에 기여한 요인들
    pub contributing_factors: Vec<String>,
    /// 사용한 모델 버전
    pub model_version: String,
    /// 모델 타임프레임
    pub timeframe: Timeframe,
}

impl ConfidencePrediction {
    /// 유의미한 prediction인지 확인합니다 (임계값 이상).
    pub fn is_significant(&self, threshold_pct: f32) -> bool {
        self.confidence >= threshold_pct
    }
}
