//! 추세 지표 (이동평균 계열).
//!
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average) - 첫 period 구간의 SMA로 시드
//! - MACD (Moving Average Convergence Divergence)
//!
//! EMA 시드 규칙은 이 크레이트 전체(PPO/PMO/시그널 라인 포함)에서
//! 동일하게 적용됩니다. 학습 시점과 추론 시점의 계산이 갈라지면 안 되기
//! 때문에 다른 시드 방식을 섞지 않습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// 캔들 하나의 MACD 값.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdPoint {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<Decimal>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<Decimal>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<Decimal>,
}

/// 단순 이동평균 (SMA) 계산.
///
/// 처음 period-1개는 None.
pub fn sma(prices: &[Decimal], params: SmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
    let period = params.period;

    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }

    if prices.len() < period {
        return Err(IndicatorError::InsufficientData {
            required: period,
            provided: prices.len(),
        });
    }

    let mut result = Vec::with_capacity(prices.len());
    let period_decimal = Decimal::from(period);
    let mut window_sum: Decimal = prices[..period - 1].iter().sum();

    for i in 0..prices.len() {
        if i < period - 1 {
            result.push(None);
        } else {
            window_sum += prices[i];
            result.push(Some(window_sum / period_decimal));
            window_sum -= prices[i + 1 - period];
        }
    }

    Ok(result)
}

/// 지수 이동평균 (EMA) 계산.
///
/// EMA = (현재가 × k) + (이전 EMA × (1 - k)), k = 2 / (period + 1)
///
/// 첫 EMA 값은 처음 period개의 SMA입니다. 처음 period-1개는 None.
pub fn ema(prices: &[Decimal], params: EmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
    let period = params.period;

    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }

    if prices.len() < period {
        return Err(IndicatorError::InsufficientData {
            required: period,
            provided: prices.len(),
        });
    }

    let mut result = vec![None; period - 1];
    let multiplier = Decimal::from(2) / Decimal::from(period + 1);

    let initial_sma: Decimal = prices[..period].iter().sum::<Decimal>() / Decimal::from(period);
    result.push(Some(initial_sma));

    let mut prev_ema = initial_sma;
    for price in prices.iter().skip(period) {
        let value = (*price - prev_ema) * multiplier + prev_ema;
        result.push(Some(value));
        prev_ema = value;
    }

    Ok(result)
}

/// 선행 None이 있는 시계열 위의 EMA.
///
/// PPO 시그널처럼 파생 시계열(자체가 룩백으로 앞부분이 비어 있는)의
/// EMA를 계산할 때 사용합니다. Some 값들만 압축해 EMA를 구한 뒤 원래
/// 위치로 되돌립니다. Some 개수가 period 미만이면 전체 None입니다.
pub fn ema_over(series: &[Option<Decimal>], period: usize) -> Vec<Option<Decimal>> {
    let values: Vec<Decimal> = series.iter().flatten().copied().collect();

    let inner = match ema(&values, EmaParams { period }) {
        Ok(v) => v,
        Err(_) => return vec![None; series.len()],
    };

    let mut result = Vec::with_capacity(series.len());
    let mut inner_idx = 0;
    for entry in series {
        if entry.is_some() {
            result.push(inner[inner_idx]);
            inner_idx += 1;
        } else {
            result.push(None);
        }
    }

    result
}

/// MACD 계산.
///
/// MACD 라인 = 단기 EMA - 장기 EMA, 시그널 = MACD 라인의 EMA.
pub fn macd(prices: &[Decimal], params: MacdParams) -> IndicatorResult<Vec<MacdPoint>> {
    let min_required = params.slow_period + params.signal_period;

    if prices.len() < min_required {
        return Err(IndicatorError::InsufficientData {
            required: min_required,
            provided: prices.len(),
        });
    }

    let fast_ema = ema(prices, EmaParams { period: params.fast_period })?;
    let slow_ema = ema(prices, EmaParams { period: params.slow_period })?;

    let macd_line: Vec<Option<Decimal>> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|pair| match pair {
            (Some(fast), Some(slow)) => Some(*fast - *slow),
            _ => None,
        })
        .collect();

    let signal_line = ema_over(&macd_line, params.signal_period);

    let result = macd_line
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| MacdPoint {
            macd: *m,
            signal: *s,
            histogram: match (m, s) {
                (Some(m), Some(s)) => Some(*m - *s),
                _ => None,
            },
        })
        .collect();

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_prices() -> Vec<Decimal> {
        vec![
            dec!(100.0),
            dec!(102.0),
            dec!(101.0),
            dec!(103.0),
            dec!(105.0),
            dec!(104.0),
            dec!(106.0),
            dec!(108.0),
            dec!(107.0),
            dec!(109.0),
        ]
    }

    #[test]
    fn test_sma_basic() {
        let prices = sample_prices();
        let result = sma(&prices, SmaParams { period: 3 }).unwrap();

        assert!(result[0].is_none());
        assert!(result[1].is_none());
        // (100 + 102 + 101) / 3 = 101
        assert_eq!(result[2], Some(dec!(101)));
        // (102 + 101 + 103) / 3 = 102
        assert_eq!(result[3], Some(dec!(102)));
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let prices = sample_prices();
        let result = ema(&prices, EmaParams { period: 3 }).unwrap();

        assert!(result[0].is_none());
        assert!(result[1].is_none());
        // 첫 EMA는 SMA와 같음
        assert_eq!(result[2], Some(dec!(101)));
        // 다음: (103 - 101) * 0.5 + 101 = 102
        assert_eq!(result[3], Some(dec!(102.0)));
    }

    #[test]
    fn test_ema_insufficient_data() {
        let prices = vec![dec!(100), dec!(101)];
        let result = ema(&prices, EmaParams { period: 5 });
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 5, provided: 2 })
        ));
    }

    #[test]
    fn test_ema_zero_period() {
        let prices = sample_prices();
        assert!(matches!(
            ema(&prices, EmaParams { period: 0 }),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_ema_over_preserves_leading_none() {
        let series = vec![None, None, Some(dec!(1)), Some(dec!(2)), Some(dec!(3)), Some(dec!(4))];
        let result = ema_over(&series, 3);

        assert_eq!(result.len(), series.len());
        assert!(result[0].is_none());
        assert!(result[1].is_none());
        // 압축 시계열 [1,2,3,4]의 EMA(3): 처음 2개 None, 그 다음 SMA=2
        assert!(result[2].is_none());
        assert!(result[3].is_none());
        assert_eq!(result[4], Some(dec!(2)));
    }

    #[test]
    fn test_macd_alignment() {
        let prices: Vec<Decimal> = (0..60).map(|i| Decimal::from(100 + i)).collect();
        let result = macd(&prices, MacdParams::default()).unwrap();

        assert_eq!(result.len(), prices.len());
        assert!(result[0].macd.is_none());
        // slow=26이므로 index 25부터 MACD 라인 존재
        assert!(result[25].macd.is_some());
        assert!(result[25].signal.is_none());
        // 시그널은 MACD 9개부터: index 33
        assert!(result[33].signal.is_some());
        assert!(result[40].histogram.is_some());
    }

    #[test]
    fn test_macd_uptrend_positive() {
        let prices: Vec<Decimal> = (0..80).map(|i| Decimal::from(100) + Decimal::from(i) * dec!(2)).collect();
        let result = macd(&prices, MacdParams::default()).unwrap();

        // 꾸준한 상승에서 MACD 라인은 양수
        let last = result.last().unwrap();
        assert!(last.macd.unwrap() > Decimal::ZERO);
    }
}
