//! 종목 심볼 정의.
//!
//! 이 모듈은 분석 대상 주식 티커를 나타내는 심볼 타입을 정의합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 주식 티커 심볼.
///
/// 대문자 알파벳과 일부 구분 기호(`.`, `-`)로 구성됩니다.
/// 예: AAPL, MSFT, BRK.B
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// 새 심볼을 생성합니다. 입력은 대문자로 정규화됩니다.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self(ticker.into().trim().to_uppercase())
    }

    /// 티커 문자열을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 유효한 티커 형식인지 확인합니다.
    ///
    /// 빈 문자열이 아니고, 영숫자 또는 `.`/`-` 만 포함해야 합니다.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = Symbol::new(s);
        if symbol.is_valid() {
            Ok(symbol)
        } else {
            Err(format!("Invalid ticker symbol: {:?}", s))
        }
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_normalization() {
        let symbol = Symbol::new(" aapl ");
        assert_eq!(symbol.as_str(), "AAPL");
        assert!(symbol.is_valid());
    }

    #[test]
    fn test_symbol_with_class_suffix() {
        let symbol: Symbol = "brk.b".parse().unwrap();
        assert_eq!(symbol.as_str(), "BRK.B");
    }

    #[test]
    fn test_invalid_symbol() {
        assert!("".parse::<Symbol>().is_err());
        assert!("AA PL".parse::<Symbol>().is_err());
    }
}
