//! OHLCV 캔들 데이터.
//!
//! `Bar`는 외부 데이터 소스에서 받은 불변 일봉/주봉 캔들입니다.
//! 분할/배당 조정은 소스의 책임이며, 여기서는 받은 시계열의 형식적
//! 유효성(단조 증가 날짜, 양수 가격)만 검증합니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ScanError, ScanResult};
use crate::types::{Price, Quantity};

/// OHLCV 캔들 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// 캔들 날짜 (일봉: 해당 일, 주봉: 주 시작일)
    pub date: NaiveDate,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: Quantity,
}

impl Bar {
    /// 새 캔들을 생성합니다.
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 캔들 몸통 크기(절대값)를 반환합니다.
    pub fn body_size(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 음봉(종가 < 시가)인지 확인합니다.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// 이 캔들 단독으로 형식이 유효한지 확인합니다.
    ///
    /// 가격은 모두 양수, 고가 >= 저가, 시가/종가는 [저가, 고가] 범위 안,
    /// 거래량은 음수가 아니어야 합니다.
    pub fn is_well_formed(&self) -> bool {
        self.open > Decimal::ZERO
            && self.high > Decimal::ZERO
            && self.low > Decimal::ZERO
            && self.close > Decimal::ZERO
            && self.high >= self.low
            && self.open <= self.high
            && self.open >= self.low
            && self.close <= self.high
            && self.close >= self.low
            && self.volume >= Decimal::ZERO
    }
}

/// 캔들 시계열의 유효성을 검증합니다.
///
/// 날짜가 엄격하게 증가해야 하며(중복 불가), 각 캔들은 형식이 유효해야
/// 합니다. 위반 시 `ScanError::Data`를 반환하며 호출자는 진행하면 안
/// 됩니다.
pub fn validate_bars(bars: &[Bar]) -> ScanResult<()> {
    for (i, bar) in bars.iter().enumerate() {
        if !bar.is_well_formed() {
            return Err(ScanError::Data(format!(
                "잘못된 캔들 (index {}, date {}): O={} H={} L={} C={}",
                i, bar.date, bar.open, bar.high, bar.low, bar.close
            )));
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(ScanError::Data(format!(
                "날짜가 단조 증가하지 않음 (index {}): {} <= {}",
                i,
                bar.date,
                bars[i - 1].date
            )));
        }
    }
    Ok(())
}
