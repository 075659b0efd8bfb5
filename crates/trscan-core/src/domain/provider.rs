//! 외부 협력자 trait 및 관련 타입.
//!
//! 이 모듈은 코어가 외부 세계와 만나는 네 가지 좁은 인터페이스 중
//! 저장소/데이터 경계 세 가지를 정의합니다:
//!
//! - `BarSource` - 과거 캔들 데이터 소스 (조정 완료된 시계열 보장 책임)
//! - `DatasetStore` - 레이블된 데이터셋 영속화 (append-only)
//! - `PeerRankProvider` - 유니버스 횡단 백분위 순위 (주입 입력)
//!
//! 타임아웃/재시도 정책은 구현체의 소관입니다. 코어의 순수 변환은 이
//! trait 뒤의 I/O를 전혀 알지 못합니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::bar::Bar;
use crate::domain::signal::LabeledSignal;
use crate::types::{Symbol, Timeframe};

/// 협력자 에러 타입.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 데이터 조회 실패 (일시적일 수 있음 - 재시도는 구현체 소관)
    #[error("Data fetch error: {0}")]
    Fetch(String),

    /// 존재하지 않는 심볼 - 재시도 불가
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// 저장소 에러
    #[error("Storage error: {0}")]
    Storage(String),

    /// 요청한 버전/키 없음
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ProviderError {
    /// 재시도할 가치가 있는 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Fetch(_) | ProviderError::Storage(_))
    }
}

/// 과거 캔들 데이터 소스.
///
/// 구현체는 다음을 보장해야 합니다:
/// - 날짜 오름차순, 중복 날짜 없음
/// - 분할/배당 조정이 완료된 연속 시계열
///
/// 조정되지 않은 분할은 하루 20% 이상의 허위 하락으로 나타나는 알려진
/// 장애 유형이며, 이를 감지/보정하는 것은 소스의 전처리 책임입니다.
#[async_trait]
pub trait BarSource: Send + Sync {
    /// 지정 구간의 캔들을 조회합니다.
    async fn fetch_bars(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, ProviderError>;
}

/// 레이블된 데이터셋 저장소.
///
/// 데이터셋은 (타임프레임, 버전) 키로 append-only 저장됩니다.
/// 기존 버전을 덮어쓰지 않습니다.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// 레이블된 신호 배치를 새 버전으로 저장합니다.
    async fn append_dataset(
        &self,
        timeframe: Timeframe,
        version: &str,
        signals: &[LabeledSignal],
    ) -> Result<(), ProviderError>;

    /// 지정 버전의 데이터셋을 조회합니다.
    async fn load_dataset(
        &self,
        timeframe: Timeframe,
        version: &str,
    ) -> Result<Vec<LabeledSignal>, ProviderError>;

    /// 타임프레임의 저장된 버전 목록을 반환합니다 (오름차순).
    async fn list_versions(&self, timeframe: Timeframe) -> Result<Vec<String>, ProviderError>;
}

/// 캔들 하나에 대한 유니버스 횡단 백분위 순위.
///
/// 상대강도(RS)와 Chaikin A/D 누적 순위는 종목 유니버스 전체에 대한
/// 횡단 계산이 필요하므로 코어 밖에서 미리 계산되어 주입됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeerRank {
    /// 캔들 날짜
    pub date: NaiveDate,
    /// 상대강도 백분위 (0~100)
    pub rs_percentile: Decimal,
    /// Chaikin A/D 백분위 (0~100)
    pub chaikin_percentile: Decimal,
}

/// 엘리트 판정 백분위 임계값 (상위 5%).
pub const ELITE_PERCENTILE: u32 = 95;

impl PeerRank {
    /// 두 순위 모두 상위 5%에 드는지 확인합니다.
    pub fn is_elite(&self) -> bool {
        let threshold = Decimal::from(ELITE_PERCENTILE);
        self.rs_percentile >= threshold && self.chaikin_percentile >= threshold
    }
}

/// 유니버스 횡단 순위 제공자.
#[async_trait]
pub trait PeerRankProvider: Send + Sync {
    /// 지정 구간의 캔들별 순위를 조회합니다. 날짜 오름차순으로 반환합니다.
    async fn fetch_ranks(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PeerRank>, ProviderError>;
}

/// 테스트/단일 프로세스용 인메모리 데이터셋 저장소.
#[derive(Default)]
pub struct InMemoryDatasetStore {
    datasets: std::sync::RwLock<
        std::collections::HashMap<(Timeframe, String), Vec<LabeledSignal>>,
    >,
}

impl InMemoryDatasetStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatasetStore for InMemoryDatasetStore {
    async fn append_dataset(
        &self,
        timeframe: Timeframe,
        version: &str,
        signals: &[LabeledSignal],
    ) -> Result<(), ProviderError> {
        let mut datasets = self
            .datasets
            .write()
            .map_err(|e| ProviderError::Storage(e.to_string()))?;

        let key = (timeframe, version.to_string());
        if datasets.contains_key(&key) {
            return Err(ProviderError::Storage(format!(
                "dataset version already exists: {} {}",
                timeframe, version
            )));
        }

        datasets.insert(key, signals.to_vec());
        Ok(())
    }

    async fn load_dataset(
        &self,
        timeframe: Timeframe,
        version: &str,
    ) -> Result<Vec<LabeledSignal>, ProviderError> {
        let datasets = self
            .datasets
            .read()
            .map_err(|e| ProviderError::Storage(e.to_string()))?;

        datasets
            .get(&(timeframe, version.to_string()))
            .cloned()
            .ok_or_else(|| {
                ProviderError::NotFound(format!("dataset {} {}", timeframe, version))
            })
    }

    async fn list_versions(&self, timeframe: Timeframe) -> Result<Vec<String>, ProviderError> {
        let datasets = self
            .datasets
            .read()
            .map_err(|e| ProviderError::Storage(e.to_string()))?;

        let mut versions: Vec<String> = datasets
            .keys()
            .filter(|(tf, _)| *tf == timeframe)
            .map(|(_, v)| v.clone())
            .collect();
        versions.sort();
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{BuySignal, Outcome, QualityFlags, TrStage};
    use rust_decimal_macros::dec;

    fn sample_labeled() -> LabeledSignal {
        let signal = BuySignal {
            symbol: Symbol::new("TEST"),
            timeframe: Timeframe::Daily,
            entry_date: "2023-05-02".parse().unwrap(),
            entry_price: dec!(100),
            stage: TrStage::StrongBuy,
            buy_point: None,
            stop_loss: dec!(90),
            ema_3: dec!(99),
            ema_9: dec!(98),
            ema_20: dec!(96),
            ema_34: dec!(94),
            ppo_value: dec!(1.1),
            ppo_histogram: dec!(0.2),
            pmo_value: dec!(1.8),
            flags: QualityFlags::default(),
        };
        LabeledSignal {
            signal,
            outcome: Outcome::Success,
            bars_to_resolution: Some(4),
            max_gain_pct: dec!(6),
            max_drawdown_pct: dec!(-2),
        }
    }

    #[tokio::test]
    async fn test_dataset_store_append_and_load() {
        let store = InMemoryDatasetStore::new();
        let batch = vec![sample_labeled()];

        store
            .append_dataset(Timeframe::Daily, "v1", &batch)
            .await
            .unwrap();

        let loaded = store.load_dataset(Timeframe::Daily, "v1").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].outcome, Outcome::Success);
    }

    #[tokio::test]
    async fn test_dataset_store_is_append_only() {
        let store = InMemoryDatasetStore::new();
        let batch = vec![sample_labeled()];

        store
            .append_dataset(Timeframe::Daily, "v1", &batch)
            .await
            .unwrap();
        // 같은 버전에 다시 쓰는 것은 거부
        let result = store.append_dataset(Timeframe::Daily, "v1", &batch).await;
        assert!(matches!(result, Err(ProviderError::Storage(_))));
    }

    #[tokio::test]
    async fn test_dataset_store_versions_sorted() {
        let store = InMemoryDatasetStore::new();
        let batch = vec![sample_labeled()];

        store
            .append_dataset(Timeframe::Daily, "v2", &batch)
            .await
            .unwrap();
        store
            .append_dataset(Timeframe::Daily, "v1", &batch)
            .await
            .unwrap();

        let versions = store.list_versions(Timeframe::Daily).await.unwrap();
        assert_eq!(versions, vec!["v1".to_string(), "v2".to_string()]);
        assert!(store
            .list_versions(Timeframe::Weekly)
            .await
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_peer_rank_elite() {
        let rank = PeerRank {
            date: "2024-03-04".parse().unwrap(),
            rs_percentile: dec!(97),
            chaikin_percentile: dec!(95),
        };
        assert!(rank.is_elite());

        let weak_ad = PeerRank {
            chaikin_percentile: dec!(94.9),
            ..rank
        };
        assert!(!weak_ad.is_elite());
    }

    #[test]
    fn test_provider_error_retryable() {
        assert!(ProviderError::Fetch("timeout".to_string()).is_retryable());
        assert!(!ProviderError::UnknownSymbol("ZZZZ".to_string()).is_retryable());
    }
}
