//! 설정 관리.
//!
//! 분석 파이프라인의 조정 가능한 파라미터를 정의하고 로드합니다.
//! 파일(`config/default.toml`)과 환경 변수(`TRSCAN__` 접두사)를 레이어로
//! 겹쳐 로드하며, 모든 섹션에 합리적인 기본값이 있습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 레이블링 설정
    #[serde(default)]
    pub labeling: LabelingConfig,
    /// 패턴 감지 설정
    #[serde(default)]
    pub pattern: PatternConfig,
    /// 모델 학습 설정
    #[serde(default)]
    pub training: TrainingConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 레이블링 설정.
///
/// 손절 비율은 지표 엔진과 레이블링 파이프라인이 같은 값을 쓰도록 여기
/// 한 곳에서만 정의됩니다 (기본 10%).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelingConfig {
    /// 일봉 목표 수익률 (%)
    pub daily_target_pct: Decimal,
    /// 주봉 목표 수익률 (%)
    pub weekly_target_pct: Decimal,
    /// 손절 비율 (%)
    pub stop_pct: Decimal,
    /// 레이블링에 필요한 최소 전방 캔들 수
    pub min_forward_bars: usize,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            daily_target_pct: Decimal::new(5, 0),
            weekly_target_pct: Decimal::new(8, 0),
            stop_pct: Decimal::new(10, 0),
            min_forward_bars: 5,
        }
    }
}

impl LabelingConfig {
    /// 타임프레임의 목표 수익률(%)을 반환합니다.
    pub fn target_pct(&self, timeframe: crate::types::Timeframe) -> Decimal {
        match timeframe {
            crate::types::Timeframe::Daily => self.daily_target_pct,
            crate::types::Timeframe::Weekly => self.weekly_target_pct,
        }
    }
}

/// 패턴 감지 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PatternConfig {
    /// 표시할 최소 신뢰도 (0.0 ~ 1.0)
    pub min_confidence: f64,
    /// 동일 패턴 유형 간 중복 제거 임계값 (인덱스 구간 겹침 비율)
    pub max_overlap: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            max_overlap: 0.5,
        }
    }
}

/// 모델 학습 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainingConfig {
    /// 트리 개수
    pub n_trees: usize,
    /// 트리 최대 깊이
    pub max_depth: usize,
    /// 분할에 필요한 최소 샘플 수
    pub min_samples_split: usize,
    /// 리프에 필요한 최소 샘플 수
    pub min_samples_leaf: usize,
    /// 검증 분할 비율 (0.0 ~ 1.0)
    pub validation_split: f64,
    /// 학습에 필요한 최소 레이블 샘플 수
    pub min_training_samples: usize,
    /// 학습 재현을 위한 RNG 시드
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_trees: 150,
            max_depth: 15,
            min_samples_split: 50,
            min_samples_leaf: 20,
            validation_split: 0.2,
            min_training_samples: 100,
            seed: 42,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("TRSCAN")
                    .separator("__")
                    .try_parsing(true),
            );

        let loaded = builder.build()?;
        loaded.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }

    /// 타임프레임의 목표 수익률을 반환합니다.
    pub fn target_pct(&self, timeframe: crate::types::Timeframe) -> Decimal {
        match timeframe {
            crate::types::Timeframe::Daily => self.labeling.daily_target_pct,
            crate::types::Timeframe::Weekly => self.labeling.weekly_target_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timeframe;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.labeling.daily_target_pct, dec!(5));
        assert_eq!(config.labeling.weekly_target_pct, dec!(8));
        assert_eq!(config.labeling.stop_pct, dec!(10));
        assert_eq!(config.training.n_trees, 150);
    }

    #[test]
    fn test_target_pct_by_timeframe() {
        let config = AppConfig::default();
        assert_eq!(config.target_pct(Timeframe::Daily), dec!(5));
        assert_eq!(config.target_pct(Timeframe::Weekly), dec!(8));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        // 파일이 없어도 섹션별 default로 로드되어야 함
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.labeling.stop_pct, dec!(10));
        assert_eq!(config.pattern.min_confidence, 0.6);
    }
}
