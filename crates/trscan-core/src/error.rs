//! 스캐너 시스템의 에러 타입.
//!
//! 이 모듈은 크레이트 경계를 넘어 전파되는 공통 에러를 정의합니다.
//! 모듈별 세부 에러(지표, ML 등)는 각 모듈에 둡니다.

use thiserror::Error;

/// 핵심 스캐너 에러.
#[derive(Debug, Error)]
pub enum ScanError {
    /// 잘못된 입력 데이터 (비단조 타임스탬프, 음수 가격 등) - 치명적
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 저장소 에러
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 스캐너 작업을 위한 Result 타입.
pub type ScanResult<T> = Result<T, ScanError>;

impl ScanError {
    /// 호출자가 해당 항목만 건너뛰고 배치를 계속할 수 있는 에러인지 확인합니다.
    ///
    /// 데이터 에러는 해당 (심볼, 신호) 단위에만 치명적이며, 전체 데이터셋
    /// 빌드를 중단시켜서는 안 됩니다.
    pub fn is_skippable(&self) -> bool {
        matches!(self, ScanError::Data(_) | ScanError::NotFound(_))
    }

    /// 호출자가 진행을 중단해야 하는 치명적 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::Config(_) | ScanError::Internal(_))
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(err: serde_json::Error) -> Self {
        ScanError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for ScanError {
    fn from(err: config::ConfigError) -> Self {
        ScanError::Config(err.to_string())
    }
}
