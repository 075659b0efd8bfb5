//! ML 모듈 에러 타입.

use thiserror::Error;

/// ML 작업에서 발생할 수 있는 에러.
#[derive(Debug, Error)]
pub enum MlError {
    /// feature 벡터에 미정의/비유한 값 포함 - 해당 prediction만 실패
    #[error("Feature incomplete: {0}")]
    FeatureIncomplete(String),

    /// 학습 데이터 부족
    #[error("Insufficient data: need {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// 학습 중 에러
    #[error("Training error: {0}")]
    Training(String),

    /// 유효하지 않은 입력
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 모델 저장소 에러
    #[error("Model store error: {0}")]
    Store(String),
}

/// ML 작업을 위한 Result 타입.
pub type MlResult<T> = Result<T, MlError>;

impl MlError {
    /// 다른 데이터로 재시도할 수 있는 에러인지 확인합니다.
    ///
    /// `FeatureIncomplete`는 해당 신호 하나에만 치명적이며, 배치 작업은
    /// 그 항목만 건너뛰고 계속해야 합니다.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MlError::FeatureIncomplete(_)
                | MlError::InsufficientData { .. }
                | MlError::InvalidInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MlError::InsufficientData {
            required: 100,
            actual: 12,
        };
        assert_eq!(err.to_string(), "Insufficient data: need 100 samples, got 12");
    }

    #[test]
    fn test_error_recoverable() {
        assert!(MlError::FeatureIncomplete("NaN ppo".to_string()).is_recoverable());
        assert!(!MlError::Training("empty forest".to_string()).is_recoverable());
    }
}
