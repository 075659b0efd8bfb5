//! 모멘텀 지표.
//!
//! - RSI (Relative Strength Index) - Wilder 평활
//! - PPO (Percentage Price Oscillator) - 12/26/9
//! - PMO (Price Momentum Oscillator) - 35/20 이중 평활, 시그널 10
//!
//! PPO와 PMO는 스테이지 분류의 핵심 입력입니다. PPO는 두 EMA의 괴리를
//! 가격 대비 백분율로, PMO는 일간 변화율을 이중 평활한 모멘텀으로
//! 표현합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::trend::{ema, ema_over, EmaParams};
use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// PPO 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PpoParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for PpoParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// 캔들 하나의 PPO 값.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PpoPoint {
    /// PPO 라인 = (단기 EMA - 장기 EMA) / 장기 EMA × 100
    pub line: Option<Decimal>,
    /// 시그널 라인 (PPO의 EMA)
    pub signal: Option<Decimal>,
    /// 히스토그램 (PPO - 시그널)
    pub histogram: Option<Decimal>,
}

/// PMO 파라미터.
///
/// 평활 상수는 기간마다 한 번만 계산됩니다 (`2/(n+1)`). 캔들마다 다시
/// 유도하지 않습니다.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PmoParams {
    /// 1차 평활 기간 (기본: 35).
    pub smooth1_period: usize,
    /// 2차 평활 기간 (기본: 20).
    pub smooth2_period: usize,
    /// 시그널 라인 기간 (기본: 10).
    pub signal_period: usize,
}

impl Default for PmoParams {
    fn default() -> Self {
        Self {
            smooth1_period: 35,
            smooth2_period: 20,
            signal_period: 10,
        }
    }
}

/// 캔들 하나의 PMO 값.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PmoPoint {
    /// PMO 라인 (ROC의 이중 평활 × 10)
    pub line: Option<Decimal>,
    /// 시그널 라인 (PMO의 EMA)
    pub signal: Option<Decimal>,
}

/// RSI (Relative Strength Index) 계산.
///
/// RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭.
/// Wilder 평활: 첫 평균은 처음 period개 변화의 단순 평균, 이후
/// avg = (이전 avg × (period-1) + 현재값) / period.
///
/// 처음 period개는 None, 값 범위는 0~100.
pub fn rsi(prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
    let period = params.period;

    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }

    if prices.len() < period + 1 {
        return Err(IndicatorError::InsufficientData {
            required: period + 1,
            provided: prices.len(),
        });
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);
    for i in 1..prices.len() {
        let delta = prices[i] - prices[i - 1];
        if delta > Decimal::ZERO {
            gains.push(delta);
            losses.push(Decimal::ZERO);
        } else {
            gains.push(Decimal::ZERO);
            losses.push(delta.abs());
        }
    }

    let period_decimal = Decimal::from(period);
    let mut result = vec![None; period];

    let mut avg_gain: Decimal = gains[..period].iter().sum::<Decimal>() / period_decimal;
    let mut avg_loss: Decimal = losses[..period].iter().sum::<Decimal>() / period_decimal;
    result.push(Some(rsi_from_averages(avg_gain, avg_loss)));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period_decimal - Decimal::ONE) + gains[i]) / period_decimal;
        avg_loss = (avg_loss * (period_decimal - Decimal::ONE) + losses[i]) / period_decimal;
        result.push(Some(rsi_from_averages(avg_gain, avg_loss)));
    }

    Ok(result)
}

fn rsi_from_averages(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss == Decimal::ZERO {
        return dec!(100);
    }
    let rs = avg_gain / avg_loss;
    dec!(100) - (dec!(100) / (Decimal::ONE + rs))
}

/// PPO (Percentage Price Oscillator) 계산.
pub fn ppo(prices: &[Decimal], params: PpoParams) -> IndicatorResult<Vec<PpoPoint>> {
    let min_required = params.slow_period + params.signal_period;

    if prices.len() < min_required {
        return Err(IndicatorError::InsufficientData {
            required: min_required,
            provided: prices.len(),
        });
    }

    let fast_ema = ema(prices, EmaParams { period: params.fast_period })?;
    let slow_ema = ema(prices, EmaParams { period: params.slow_period })?;

    let line: Vec<Option<Decimal>> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|pair| match pair {
            (Some(fast), Some(slow)) if !slow.is_zero() => {
                Some((*fast - *slow) / *slow * dec!(100))
            }
            _ => None,
        })
        .collect();

    let signal = ema_over(&line, params.signal_period);

    let result = line
        .iter()
        .zip(signal.iter())
        .map(|(l, s)| PpoPoint {
            line: *l,
            signal: *s,
            histogram: match (l, s) {
                (Some(l), Some(s)) => Some(*l - *s),
                _ => None,
            },
        })
        .collect();

    Ok(result)
}

/// PMO (Price Momentum Oscillator) 계산.
///
/// ROC% = 종가 전일 대비 변화율 × 100을 35기간 EMA로 평활한 뒤 다시
/// 20기간 EMA로 평활하고 10을 곱합니다. 시그널은 PMO의 10기간 EMA.
pub fn pmo(prices: &[Decimal], params: PmoParams) -> IndicatorResult<Vec<PmoPoint>> {
    let min_required = params.smooth1_period + params.smooth2_period;

    if prices.len() < min_required {
        return Err(IndicatorError::InsufficientData {
            required: min_required,
            provided: prices.len(),
        });
    }

    let mut roc: Vec<Option<Decimal>> = Vec::with_capacity(prices.len());
    roc.push(None);
    for i in 1..prices.len() {
        if prices[i - 1].is_zero() {
            roc.push(None);
        } else {
            roc.push(Some((prices[i] - prices[i - 1]) / prices[i - 1] * dec!(100)));
        }
    }

    let smooth1 = ema_over(&roc, params.smooth1_period);
    let line: Vec<Option<Decimal>> = ema_over(&smooth1, params.smooth2_period)
        .into_iter()
        .map(|v| v.map(|x| x * dec!(10)))
        .collect();
    let signal = ema_over(&line, params.signal_period);

    let result = line
        .iter()
        .zip(signal.iter())
        .map(|(l, s)| PmoPoint { line: *l, signal: *s })
        .collect();

    Ok(result)
}
