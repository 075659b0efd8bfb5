//! SuperTrend 지표.
//!
//! ATR 밴드 기반 추세 추종 지표입니다.
//!
//! 1. 기본 밴드 = (고가 + 저가) / 2 ± (배수 × ATR)
//! 2. 최종 밴드는 추세 중 반대 방향으로 느슨해지지 않게 고정
//! 3. 종가가 최종 밴드를 넘으면 추세 전환
//!
//! 상승 추세에서 SuperTrend 값은 하단 밴드, 하락 추세에서는 상단
//! 밴드입니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::volatility::{atr, AtrParams};
use super::{IndicatorError, IndicatorResult};

/// SuperTrend 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuperTrendParams {
    /// ATR 기간 (기본: 10).
    pub atr_period: usize,
    /// ATR 배수 (기본: 3.0).
    pub multiplier: Decimal,
}

impl Default for SuperTrendParams {
    fn default() -> Self {
        Self {
            atr_period: 10,
            multiplier: dec!(3.0),
        }
    }
}

/// 캔들 하나의 SuperTrend 값.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuperTrendPoint {
    /// SuperTrend 값 (룩백 미충족 구간은 None).
    pub value: Option<Decimal>,
    /// 추세 방향 (true: 상승).
    pub is_uptrend: bool,
    /// 이 캔들에서 하락 → 상승 전환.
    pub flipped_up: bool,
    /// 이 캔들에서 상승 → 하락 전환.
    pub flipped_down: bool,
}

/// SuperTrend 계산.
pub fn supertrend(
    high: &[Decimal],
    low: &[Decimal],
    close: &[Decimal],
    params: SuperTrendParams,
) -> IndicatorResult<Vec<SuperTrendPoint>> {
    if params.multiplier <= Decimal::ZERO {
        return Err(IndicatorError::InvalidParameter(
            "배수는 0보다 커야 합니다".to_string(),
        ));
    }

    let atr_values = atr(high, low, close, AtrParams { period: params.atr_period })?;

    let mut result = Vec::with_capacity(close.len());
    let mut final_upper = Decimal::ZERO;
    let mut final_lower = Decimal::ZERO;
    let mut is_uptrend = true;
    let mut started = false;

    for i in 0..close.len() {
        let Some(atr_value) = atr_values[i] else {
            result.push(SuperTrendPoint {
                value: None,
                is_uptrend: true,
                flipped_up: false,
                flipped_down: false,
            });
            continue;
        };

        let mid = (high[i] + low[i]) / dec!(2);
        let basic_upper = mid + params.multiplier * atr_value;
        let basic_lower = mid - params.multiplier * atr_value;

        if !started {
            final_upper = basic_upper;
            final_lower = basic_lower;
            is_uptrend = close[i] >= mid;
            started = true;
            result.push(SuperTrendPoint {
                value: Some(if is_uptrend { final_lower } else { final_upper }),
                is_uptrend,
                flipped_up: false,
                flipped_down: false,
            });
            continue;
        }

        // 최종 밴드: 추세 중 반대 방향으로 느슨해지지 않음
        let prev_close = close[i - 1];
        final_upper = if basic_upper < final_upper || prev_close > final_upper {
            basic_upper
        } else {
            final_upper
        };
        final_lower = if basic_lower > final_lower || prev_close < final_lower {
            basic_lower
        } else {
            final_lower
        };

        let was_uptrend = is_uptrend;
        if was_uptrend {
            if close[i] < final_lower {
                is_uptrend = false;
            }
        } else if close[i] > final_upper {
            is_uptrend = true;
        }

        result.push(SuperTrendPoint {
            value: Some(if is_uptrend { final_lower } else { final_upper }),
            is_uptrend,
            flipped_up: is_uptrend && !was_uptrend,
            flipped_down: !is_uptrend && was_uptrend,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending_series(n: usize, rising: bool) -> (Vec<Decimal>, Vec<Decimal>, Vec<Decimal>) {
        let step = |i: usize| {
            if rising {
                Decimal::from(100 + i * 2)
            } else {
                Decimal::from(300 - (i * 2) as i64)
            }
        };
        let close: Vec<Decimal> = (0..n).map(step).collect();
        let high: Vec<Decimal> = close.iter().map(|c| c + dec!(2)).collect();
        let low: Vec<Decimal> = close.iter().map(|c| c - dec!(2)).collect();
        (high, low, close)
    }

    #[test]
    fn test_supertrend_uptrend() {
        let (high, low, close) = trending_series(60, true);
        let result = supertrend(&high, &low, &close, SuperTrendParams::default()).unwrap();

        assert_eq!(result.len(), 60);
        assert!(result[8].value.is_none());
        assert!(result[9].value.is_some());

        let last = result.last().unwrap();
        assert!(last.is_uptrend);
        // 상승 추세에서 SuperTrend는 가격 아래
        assert!(last.value.unwrap() < *close.last().unwrap());
    }

    #[test]
    fn test_supertrend_downtrend() {
        let (high, low, close) = trending_series(60, false);
        let result = supertrend(&high, &low, &close, SuperTrendParams::default()).unwrap();

        let last = result.last().unwrap();
        assert!(!last.is_uptrend);
        assert!(last.value.unwrap() > *close.last().unwrap());
    }

    #[test]
    fn test_supertrend_flip_on_reversal() {
        // 상승 후 급락: 어느 시점에 flipped_down이 한 번 발생해야 함
        let mut close: Vec<Decimal> = (0..40).map(|i| Decimal::from(100 + i)).collect();
        close.extend((1..=15).map(|i| Decimal::from(139 - (i * 8) as i64)));
        let high: Vec<Decimal> = close.iter().map(|c| c + dec!(1)).collect();
        let low: Vec<Decimal> = close.iter().map(|c| c - dec!(1)).collect();

        let result = supertrend(&high, &low, &close, SuperTrendParams::default()).unwrap();
        assert!(result.iter().any(|p| p.flipped_down));
    }

    #[test]
    fn test_supertrend_invalid_multiplier() {
        let (high, low, close) = trending_series(20, true);
        let params = SuperTrendParams {
            atr_period: 10,
            multiplier: Decimal::ZERO,
        };
        assert!(supertrend(&high, &low, &close, params).is_err());
    }
}
