//! 모델 저장소.
//!
//! 모델 아티팩트는 (타임프레임, 버전) 키로 저장되는 버전된 불변
//! 값입니다. 같은 키에 다시 쓰는 것은 에러이며, 재학습은 항상 새 버전을
//! 만듭니다.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use trscan_core::{ProviderError, Timeframe};

use super::train::ConfidenceModel;

/// 모델 아티팩트 저장소.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// 모델을 저장합니다. 같은 (타임프레임, 버전)이 이미 있으면 에러.
    async fn save_model(&self, model: &ConfidenceModel) -> Result<(), ProviderError>;

    /// 지정 버전의 모델을 로드합니다.
    async fn load_model(
        &self,
        timeframe: Timeframe,
        version: &str,
    ) -> Result<ConfidenceModel, ProviderError>;

    /// 타임프레임의 최신 버전을 반환합니다 (없으면 None).
    async fn latest_version(&self, timeframe: Timeframe)
        -> Result<Option<String>, ProviderError>;
}

/// 테스트/단일 프로세스용 인메모리 모델 저장소.
#[derive(Default)]
pub struct InMemoryModelStore {
    models: RwLock<HashMap<(Timeframe, String), ConfidenceModel>>,
}

impl InMemoryModelStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModelStore for InMemoryModelStore {
    async fn save_model(&self, model: &ConfidenceModel) -> Result<(), ProviderError> {
        let mut models = self
            .models
            .write()
            .map_err(|e| ProviderError::Storage(e.to_string()))?;

        let key = (model.timeframe, model.version.clone());
        if models.contains_key(&key) {
            return Err(ProviderError::Storage(format!(
                "model version already exists: {} {}",
                model.timeframe, model.version
            )));
        }

        models.insert(key, model.clone());
        Ok(())
    }

    async fn load_model(
        &self,
        timeframe: Timeframe,
        version: &str,
    ) -> Result<ConfidenceModel, ProviderError> {
        let models = self
            .models
            .read()
            .map_err(|e| ProviderError::Storage(e.to_string()))?;

        models
            .get(&(timeframe, version.to_string()))
            .cloned()
            .ok_or_else(|| {
                ProviderError::NotFound(format!("model {} {}", timeframe, version))
            })
    }

    async fn latest_version(
        &self,
        timeframe: Timeframe,
    ) -> Result<Option<String>, ProviderError> {
        let models = self
            .models
            .read()
            .map_err(|e| ProviderError::Storage(e.to_string()))?;

        // 버전 문자열은 생성 시각 기반이므로 사전순 최대가 최신
        Ok(models
            .keys()
            .filter(|(tf, _)| *tf == timeframe)
            .map(|(_, v)| v.clone())
            .max())
    }
}
