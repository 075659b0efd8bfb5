//! # trscan-analytics
//!
//! TR 스테이지 스캐너의 분석 엔진.
//!
//! 원시 OHLCV 시계열을 받아 네 단계로 가공합니다:
//!
//! ```text
//! Bars (trscan-core)
//!    │
//!    ▼
//! ┌──────────────────┐
//! │ Indicator Engine │ ← EMA/PPO/PMO/RSI/ATR/SuperTrend/Ichimoku/MACD
//! └────────┬─────────┘
//!          │
//!    ┌─────┴──────────────────┐
//!    ▼                        ▼
//! ┌──────────────────┐  ┌──────────────────┐
//! │ Stage Classifier │  │ Pattern Detector │
//! │ (6단계 TR 분류)  │  │ (8가지 기하 패턴)│
//! └────────┬─────────┘  └──────────────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ Labeling Pipeline│ ← 과거 신호 전방 리플레이 → Success/Failure
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ Confidence Model │ ← 랜덤 포레스트 학습/추론 (타임프레임별)
//! └──────────────────┘
//! ```
//!
//! 네 엔진 모두 인메모리 배열에 대한 순수 동기 변환이며, 레이블링 배치만
//! rayon으로 (심볼, 신호) 단위 병렬화됩니다.

pub mod indicators;
pub mod labeling;
pub mod ml;
pub mod pattern;
pub mod stage;

pub use indicators::{IndicatorEngine, IndicatorError, IndicatorFrame, IndicatorResult};
pub use labeling::{
    label_batch, label_signal, scan_and_label, Excluded, LabelConfig, LabelResult, SignalScanner,
};
pub use ml::{
    train_confidence_model, ConfidenceModel, ConfidencePrediction, ConfidenceScorer, MlError,
    SignalFeatures, TrainConfig,
};
pub use pattern::{Direction, PatternConfig, PatternDetector, PatternKind, PatternMatch};
pub use stage::{AlignmentSnapshot, StageClassifier};
