//! 차트 패턴 기하 엔진.
//!
//! 종가 시계열에서 극점(피크/밸리)을 추출하고(`extrema`), 극점 배열을
//! 8가지 기하 템플릿과 대조해(`detector`) 신뢰도와 목표가가 붙은
//! `PatternMatch`를 만듭니다. 추세선 적합 통계는 `geometry`에 있습니다.
//!
//! 신뢰도는 대칭 오차, 추세선 적합도, 패턴 깊이/기간의 가중 결합으로
//! [0, 1] 범위에 고정되며, 같은 입력에는 항상 같은 값이 나옵니다.

pub mod detector;
pub mod extrema;
pub mod geometry;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use detector::PatternDetector;
pub use extrema::{find_extrema, Extrema};
pub use geometry::LineFit;

/// 차트 패턴 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Head & Shoulders - 머리어깨형 (하락 반전)
    HeadAndShoulders,
    /// Inverse Head & Shoulders - 역머리어깨형 (상승 반전)
    InverseHeadAndShoulders,
    /// Double Top - 이중 천장 (하락 반전)
    DoubleTop,
    /// Double Bottom - 이중 바닥 (상승 반전)
    DoubleBottom,
    /// Ascending Triangle - 상승 삼각형 (상승 지속)
    AscendingTriangle,
    /// Descending Triangle - 하락 삼각형 (하락 지속)
    DescendingTriangle,
    /// Symmetrical Triangle - 대칭 삼각형 (방향 불확실)
    SymmetricalTriangle,
    /// Cup & Handle - 컵앤핸들 (상승)
    CupAndHandle,
}

impl PatternKind {
    /// 전체 패턴 유형을 반환합니다.
    pub fn all() -> [PatternKind; 8] {
        [
            PatternKind::HeadAndShoulders,
            PatternKind::InverseHeadAndShoulders,
            PatternKind::DoubleTop,
            PatternKind::DoubleBottom,
            PatternKind::AscendingTriangle,
            PatternKind::DescendingTriangle,
            PatternKind::SymmetricalTriangle,
            PatternKind::CupAndHandle,
        ]
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatternKind::HeadAndShoulders => "Head & Shoulders",
            PatternKind::InverseHeadAndShoulders => "Inverse Head & Shoulders",
            PatternKind::DoubleTop => "Double Top",
            PatternKind::DoubleBottom => "Double Bottom",
            PatternKind::AscendingTriangle => "Ascending Triangle",
            PatternKind::DescendingTriangle => "Descending Triangle",
            PatternKind::SymmetricalTriangle => "Symmetrical Triangle",
            PatternKind::CupAndHandle => "Cup & Handle",
        };
        write!(f, "{}", s)
    }
}

/// 패턴의 예상 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// 상승
    Bullish,
    /// 하락
    Bearish,
    /// 방향 불확실
    Neutral,
}

/// 패턴을 정의하는 주요 지점 (극점).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    /// 캔들 인덱스
    pub index: usize,
    /// 해당 지점 가격
    pub price: Decimal,
}

/// 감지된 패턴 매치. 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    /// 패턴 유형
    pub kind: PatternKind,
    /// 패턴 시작 인덱스
    pub start_index: usize,
    /// 패턴 종료 인덱스
    pub end_index: usize,
    /// 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
    /// 측정 이동 목표가 (Neutral 패턴은 None)
    pub target_price: Option<Decimal>,
    /// 예상 방향
    pub direction: Direction,
    /// 패턴을 정의하는 극점들 (인덱스 오름차순)
    pub key_points: Vec<KeyPoint>,
}

impl PatternMatch {
    /// 패턴이 차지하는 인덱스 구간 길이.
    pub fn span(&self) -> usize {
        self.end_index.saturating_sub(self.start_index) + 1
    }

    /// 다른 매치와의 인덱스 구간 겹침 길이.
    pub fn overlap_len(&self, other: &PatternMatch) -> usize {
        let start = self.start_index.max(other.start_index);
        let end = self.end_index.min(other.end_index);
        end.saturating_sub(start) + usize::from(end >= start)
    }
}

/// 패턴 감지 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    /// 표시할 최소 신뢰도 (기본: 0.6)
    pub min_confidence: f64,
    /// 동일 유형 중복 제거 임계값 - 짧은 쪽 구간 대비 겹침 비율 (기본: 0.5)
    pub max_overlap: f64,
    /// 극점 간 최소 간격 하한 (기본: 5)
    pub min_separation: usize,
    /// 시계열 길이 대비 간격 분모 (간격 = max(하한, n / 분모), 기본: 50)
    pub separation_divisor: usize,
    /// 표준편차 대비 프로미넌스 배수 (기본: 0.3)
    pub prominence_std_mult: f64,
    /// 어깨 높이 허용 오차 (기본: 0.05)
    pub shoulder_tolerance: f64,
    /// 이중 천장/바닥 높이 허용 오차 (기본: 0.02)
    pub double_tolerance: f64,
    /// 삼각형 스캔 윈도우 크기 (기본: 30)
    pub triangle_window: usize,
    /// 삼각형 윈도우 이동 간격 (기본: 10)
    pub triangle_step: usize,
    /// 평평한 추세선 허용 범위 - 평균 대비 (기본: 0.03)
    pub flat_tolerance: f64,
    /// 수렴 판정에 필요한 최소 변화율 (기본: 0.03)
    pub converge_pct: f64,
    /// 컵앤핸들 스캔 윈도우 크기 (기본: 50)
    pub cup_window: usize,
    /// 컵앤핸들 윈도우 이동 간격 (기본: 10)
    pub cup_step: usize,
    /// 핸들 최소 되돌림 (기본: 0.03)
    pub handle_min_pullback: f64,
    /// 핸들 최대 되돌림 (기본: 0.12)
    pub handle_max_pullback: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            max_overlap: 0.5,
            min_separation: 5,
            separation_divisor: 50,
            prominence_std_mult: 0.3,
            shoulder_tolerance: 0.05,
            double_tolerance: 0.02,
            triangle_window: 30,
            triangle_step: 10,
            flat_tolerance: 0.03,
            converge_pct: 0.03,
            cup_window: 50,
            cup_step: 10,
            handle_min_pullback: 0.03,
            handle_max_pullback: 0.12,
        }
    }
}

impl PatternConfig {
    /// 애플리케이션 설정의 패턴 섹션을 적용합니다.
    ///
    /// 설정 파일로 조정 가능한 값(최소 신뢰도, 중복 임계값)만 덮어쓰고
    /// 기하 파라미터는 기본값을 유지합니다.
    pub fn from_settings(settings: &trscan_core::config::PatternConfig) -> Self {
        Self {
            min_confidence: settings.min_confidence,
            max_overlap: settings.max_overlap,
            ..Default::default()
        }
    }
}
