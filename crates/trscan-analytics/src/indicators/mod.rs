//! 기술적 지표 모듈.
//!
//! 스테이지 분류와 feature 추출에 필요한 지표를 제공합니다.
//! 모든 계산기는 캔들 시계열과 1:1 정렬된 `Vec<Option<Decimal>>`을
//! 반환하며, 룩백 구간이 채워지기 전 구간은 `None`입니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표
//! - **SMA / EMA**: 이동평균 (EMA는 첫 period 구간 SMA로 시드)
//! - **MACD**: 12/26/9 이동평균 수렴/확산
//!
//! ## 모멘텀 지표
//! - **RSI(14)**: Wilder 평활 상대강도지수
//! - **PPO(12/26/9)**: 가격 백분율 오실레이터
//! - **PMO(35/20/10)**: 이중 평활 모멘텀 오실레이터
//!
//! ## 변동성/추세 추종
//! - **ATR(14)**: Wilder 평균 실제 범위
//! - **SuperTrend(10, 3.0)**: ATR 밴드 추세 추종
//! - **Ichimoku(9/26/52)**: 일목균형표
//!
//! # 사용 예시
//!
//! ```ignore
//! use trscan_analytics::indicators::IndicatorEngine;
//!
//! let engine = IndicatorEngine::new();
//! let frame = engine.compute_frame(&bars)?;
//! assert_eq!(frame.len(), bars.len());
//! ```

pub mod frame;
pub mod ichimoku;
pub mod momentum;
pub mod supertrend;
pub mod trend;
pub mod volatility;

use thiserror::Error;

pub use frame::{IndicatorEngine, IndicatorFrame};
pub use ichimoku::{IchimokuParams, IchimokuPoint};
pub use momentum::{PmoParams, PmoPoint, PpoParams, PpoPoint, RsiParams};
pub use supertrend::{SuperTrendParams, SuperTrendPoint};
pub use trend::{EmaParams, MacdParams, MacdPoint, SmaParams};
pub use volatility::AtrParams;

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 잘못된 입력 데이터 (비단조 날짜, 음수 가격 등) - 치명적
    #[error("잘못된 입력 데이터: {0}")]
    InvalidData(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;
