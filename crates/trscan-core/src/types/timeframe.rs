//! 분석 타임프레임 정의.
//!
//! 이 시스템은 일봉과 주봉 두 가지 간격만 분석합니다. 타임프레임별로
//! 목표 수익률이 다르고(일봉 5%, 주봉 8%) 모델도 독립적으로 학습됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 캔들 타임프레임.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// 일봉
    Daily,
    /// 주봉
    Weekly,
}

impl Timeframe {
    /// 이 타임프레임의 한 캔들 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        match self {
            Timeframe::Daily => Duration::from_secs(24 * 60 * 60),
            Timeframe::Weekly => Duration::from_secs(7 * 24 * 60 * 60),
        }
    }

    /// 표시용 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
        }
    }

    /// 모든 타임프레임을 반환합니다.
    pub fn all() -> [Timeframe; 2] {
        [Timeframe::Daily, Timeframe::Weekly]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "1d" | "d" => Ok(Timeframe::Daily),
            "weekly" | "1w" | "w" => Ok(Timeframe::Weekly),
            _ => Err(format!("Unknown timeframe: {}", s)),
        }
    }
}
