//! 변동성 지표.
//!
//! - ATR (Average True Range) - Wilder 평활

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// True Range 시계열 계산.
///
/// TR = max(고가-저가, |고가-전일 종가|, |저가-전일 종가|).
/// 첫 캔들은 전일 종가가 없으므로 고가-저가를 사용합니다.
pub fn true_range(high: &[Decimal], low: &[Decimal], close: &[Decimal]) -> Vec<Decimal> {
    let mut result = Vec::with_capacity(high.len());

    for i in 0..high.len() {
        if i == 0 {
            result.push(high[0] - low[0]);
        } else {
            let high_low = high[i] - low[i];
            let high_close = (high[i] - close[i - 1]).abs();
            let low_close = (low[i] - close[i - 1]).abs();
            result.push(high_low.max(high_close).max(low_close));
        }
    }

    result
}

/// ATR (Average True Range) 계산.
///
/// 첫 ATR은 처음 period개 TR의 단순 평균, 이후 Wilder 평활:
/// ATR = (이전 ATR × (period-1) + 현재 TR) / period.
///
/// 처음 period-1개는 None.
pub fn atr(
    high: &[Decimal],
    low: &[Decimal],
    close: &[Decimal],
    params: AtrParams,
) -> IndicatorResult<Vec<Option<Decimal>>> {
    let period = params.period;

    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }

    if high.len() != low.len() || high.len() != close.len() {
        return Err(IndicatorError::InvalidParameter(
            "고가, 저가, 종가 데이터의 길이가 일치하지 않습니다".to_string(),
        ));
    }

    if high.len() < period {
        return Err(IndicatorError::InsufficientData {
            required: period,
            provided: high.len(),
        });
    }

    let tr = true_range(high, low, close);
    let period_decimal = Decimal::from(period);

    let mut result = vec![None; period - 1];

    let mut value: Decimal = tr[..period].iter().sum::<Decimal>() / period_decimal;
    result.push(Some(value));

    for current in tr.iter().skip(period) {
        value = (value * (period_decimal - Decimal::ONE) + *current) / period_decimal;
        result.push(Some(value));
    }

    Ok(result)
}
