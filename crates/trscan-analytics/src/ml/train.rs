//! 신뢰도 모델 학습.
//!
//! 레이블된 신호 배치에서 타임프레임별 모델 아티팩트를 만듭니다.
//! 아티팩트는 생성 시각 기반 버전이 붙은 불변 값이며, 재학습은 항상 새
//! 버전을 만듭니다. 추론 중에 모델이 바뀌는 일은 없습니다.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use trscan_core::config::TrainingConfig;
use trscan_core::{LabeledSignal, Outcome, Timeframe};

use super::error::{MlError, MlResult};
use super::features::{SignalFeatures, FEATURE_NAMES};
use super::forest::{ForestParams, RandomForest};

/// 학습 설정 (코어 설정 섹션의 별칭).
pub type TrainConfig = TrainingConfig;

/// 학습 결과 메트릭.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// 검증 세트 정확도 (0.0 ~ 1.0)
    pub accuracy: f32,
    /// 학습 샘플 수
    pub training_samples: usize,
    /// 검증 샘플 수
    pub validation_samples: usize,
    /// 전체 데이터셋의 성공 비율
    pub success_rate: f32,
}

/// 학습된 신뢰도 모델 아티팩트.
///
/// 생성 후 절대 변경되지 않습니다. 로드한 쪽은 추론 중 모델이 바뀌지
/// 않는다고 가정해도 됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceModel {
    /// 버전 문자열 (생성 시각 기반)
    pub version: String,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 학습 타임프레임
    pub timeframe: Timeframe,
    /// 목표 수익률 (%)
    pub target_pct: Decimal,
    /// feature 이름 (입력 순서 검증용)
    pub feature_names: Vec<String>,
    /// 학습된 포레스트
    pub forest: RandomForest,
    /// 학습 메트릭
    pub metrics: ModelMetrics,
}

/// 레이블된 신호 배치로 신뢰도 모델을 학습합니다.
///
/// `signals`에서 해당 타임프레임만 사용합니다. feature 추출에 실패한
/// 신호는 경고 로그 후 건너뛰며, 남은 샘플이 최소 수량에 못 미치면
/// `InsufficientData`로 실패합니다.
///
/// 같은 데이터와 같은 시드면 같은 모델이 나옵니다 (버전/시각 제외).
pub fn train_confidence_model(
    signals: &[LabeledSignal],
    timeframe: Timeframe,
    target_pct: Decimal,
    config: &TrainConfig,
) -> MlResult<ConfidenceModel> {
    let mut x: Vec<Vec<f32>> = Vec::new();
    let mut y: Vec<bool> = Vec::new();

    for labeled in signals.iter().filter(|s| s.signal.timeframe == timeframe) {
        match SignalFeatures::try_from_signal(&labeled.signal) {
            Ok(features) => {
                x.push(features.to_array().to_vec());
                y.push(labeled.outcome == Outcome::Success);
            }
            Err(e) => {
                warn!(
                    symbol = %labeled.signal.symbol,
                    entry_date = %labeled.signal.entry_date,
                    error = %e,
                    "feature 추출 실패 - 샘플 제외"
                );
            }
        }
    }

    if x.len() < config.min_training_samples {
        return Err(MlError::InsufficientData {
            required: config.min_training_samples,
            actual: x.len(),
        });
    }

    let success_count = y.iter().filter(|&&s| s).count();
    let success_rate = success_count as f32 / y.len() as f32;

    // 셔플 후 학습/검증 분할
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut order: Vec<usize> = (0..x.len()).collect();
    order.shuffle(&mut rng);

    let val_len = ((x.len() as f64) * config.validation_split).round() as usize;
    let val_len = val_len.clamp(1, x.len() - 1);
    let (val_idx, train_idx) = order.split_at(val_len);

    let train_x: Vec<Vec<f32>> = train_idx.iter().map(|&i| x[i].clone()).collect();
    let train_y: Vec<bool> = train_idx.iter().map(|&i| y[i]).collect();

    let params = ForestParams {
        n_trees: config.n_trees,
        max_depth: config.max_depth,
        min_samples_split: config.min_samples_split,
        min_samples_leaf: config.min_samples_leaf,
    };
    let forest = RandomForest::fit(&train_x, &train_y, &params, &mut rng)?;

    // 검증 정확도
    let mut correct = 0usize;
    for &i in val_idx {
        let proba = forest.predict_proba(&x[i])?;
        let predicted = proba >= 0.5;
        if predicted == y[i] {
            correct += 1;
        }
    }
    let accuracy = correct as f32 / val_idx.len() as f32;

    let created_at = Utc::now();
    let version = format!("{}-{}", timeframe, created_at.format("%Y%m%d%H%M%S"));

    info!(
        timeframe = %timeframe,
        version = %version,
        samples = x.len(),
        accuracy = accuracy,
        success_rate = success_rate,
        "신뢰도 모델 학습 완료"
    );

    Ok(ConfidenceModel {
        version,
        created_at,
        timeframe,
        target_pct,
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        forest,
        metrics: ModelMetrics {
            accuracy,
            training_samples: train_idx.len(),
            validation_samples: val_idx.len(),
            success_rate,
        },
    })
}
