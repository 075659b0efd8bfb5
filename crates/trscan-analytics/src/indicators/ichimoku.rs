//! Ichimoku (일목균형표) 지표.
//!
//! 표준 9/26/52 설정:
//! - 전환선(tenkan) = 9기간 (최고가 + 최저가) / 2
//! - 기준선(kijun) = 26기간 (최고가 + 최저가) / 2
//! - 선행스팬 A = (전환선 + 기준선) / 2, 26기간 앞으로 이동
//! - 선행스팬 B = 52기간 (최고가 + 최저가) / 2, 26기간 앞으로 이동
//! - 후행스팬(chikou) = 종가, 26기간 뒤로 이동

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// Ichimoku 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IchimokuParams {
    /// 전환선 기간 (기본: 9).
    pub tenkan_period: usize,
    /// 기준선 기간 (기본: 26).
    pub kijun_period: usize,
    /// 선행스팬 B 기간 (기본: 52).
    pub senkou_b_period: usize,
    /// 스팬 이동 간격 (기본: 26).
    pub displacement: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            tenkan_period: 9,
            kijun_period: 26,
            senkou_b_period: 52,
            displacement: 26,
        }
    }
}

/// 캔들 하나의 Ichimoku 값.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IchimokuPoint {
    /// 전환선
    pub tenkan: Option<Decimal>,
    /// 기준선
    pub kijun: Option<Decimal>,
    /// 선행스팬 A (이 캔들 위치에 그려지는 값)
    pub senkou_a: Option<Decimal>,
    /// 선행스팬 B (이 캔들 위치에 그려지는 값)
    pub senkou_b: Option<Decimal>,
    /// 후행스팬 (이 캔들 위치에 그려지는 26기간 뒤 종가)
    pub chikou: Option<Decimal>,
}

impl IchimokuPoint {
    /// 구름(선행스팬 A/B 사이) 상단을 반환합니다.
    pub fn cloud_top(&self) -> Option<Decimal> {
        match (self.senkou_a, self.senkou_b) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        }
    }

    /// 구름 하단을 반환합니다.
    pub fn cloud_bottom(&self) -> Option<Decimal> {
        match (self.senkou_a, self.senkou_b) {
            (Some(a), Some(b)) => Some(a.min(b)),
            _ => None,
        }
    }
}

/// 기간 내 (최고가 + 최저가) / 2 시계열.
fn midpoint_line(high: &[Decimal], low: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut result = Vec::with_capacity(high.len());

    for i in 0..high.len() {
        if i + 1 < period {
            result.push(None);
        } else {
            let start = i + 1 - period;
            let highest = high[start..=i].iter().max().copied().unwrap_or(Decimal::ZERO);
            let lowest = low[start..=i].iter().min().copied().unwrap_or(Decimal::ZERO);
            result.push(Some((highest + lowest) / dec!(2)));
        }
    }

    result
}

/// Ichimoku 계산.
pub fn ichimoku(
    high: &[Decimal],
    low: &[Decimal],
    close: &[Decimal],
    params: IchimokuParams,
) -> IndicatorResult<Vec<IchimokuPoint>> {
    if high.len() != low.len() || high.len() != close.len() {
        return Err(IndicatorError::InvalidParameter(
            "고가, 저가, 종가 데이터의 길이가 일치하지 않습니다".to_string(),
        ));
    }

    if high.len() < params.senkou_b_period {
        return Err(IndicatorError::InsufficientData {
            required: params.senkou_b_period,
            provided: high.len(),
        });
    }

    let tenkan = midpoint_line(high, low, params.tenkan_period);
    let kijun = midpoint_line(high, low, params.kijun_period);
    let senkou_b_raw = midpoint_line(high, low, params.senkou_b_period);

    let n = high.len();
    let shift = params.displacement;

    let result = (0..n)
        .map(|i| {
            // 선행스팬은 shift 기간 이전에 계산된 값을 현재 위치에 그림
            let (senkou_a, senkou_b) = if i >= shift {
                let src = i - shift;
                let a = match (tenkan[src], kijun[src]) {
                    (Some(t), Some(k)) => Some((t + k) / dec!(2)),
                    _ => None,
                };
                (a, senkou_b_raw[src])
            } else {
                (None, None)
            };

            // 후행스팬은 shift 기간 뒤의 종가를 현재 위치에 그림
            let chikou = if i + shift < n { Some(close[i + shift]) } else { None };

            IchimokuPoint {
                tenkan: tenkan[i],
                kijun: kijun[i],
                senkou_a,
                senkou_b,
                chikou,
            }
        })
        .collect();

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_series(n: usize) -> (Vec<Decimal>, Vec<Decimal>, Vec<Decimal>) {
        let close: Vec<Decimal> = (0..n).map(|i| Decimal::from(100 + (i % 10))).collect();
        let high: Vec<Decimal> = close.iter().map(|c| c + dec!(3)).collect();
        let low: Vec<Decimal> = close.iter().map(|c| c - dec!(3)).collect();
        (high, low, close)
    }

    #[test]
    fn test_ichimoku_alignment() {
        let (high, low, close) = sample_series(120);
        let result = ichimoku(&high, &low, &close, IchimokuParams::default()).unwrap();

        assert_eq!(result.len(), 120);
        assert!(result[7].tenkan.is_none());
        assert!(result[8].tenkan.is_some());
        assert!(result[24].kijun.is_none());
        assert!(result[25].kijun.is_some());
        // 선행스팬 A: 26 이동 + 기준선 26 룩백 → index 51부터
        assert!(result[50].senkou_a.is_none());
        assert!(result[51].senkou_a.is_some());
        // 선행스팬 B: 26 이동 + 52 룩백 → index 77부터
        assert!(result[76].senkou_b.is_none());
        assert!(result[77].senkou_b.is_some());
    }

    #[test]
    fn test_chikou_is_future_close() {
        let (high, low, close) = sample_series(120);
        let result = ichimoku(&high, &low, &close, IchimokuParams::default()).unwrap();

        assert_eq!(result[0].chikou, Some(close[26]));
        // 마지막 26개는 후행스팬 없음
        assert!(result[119].chikou.is_none());
        assert!(result[93].chikou.is_some());
        assert!(result[94].chikou.is_none());
    }

    #[test]
    fn test_cloud_bounds() {
        let (high, low, close) = sample_series(120);
        let result = ichimoku(&high, &low, &close, IchimokuParams::default()).unwrap();

        let point = &result[100];
        let top = point.cloud_top().unwrap();
        let bottom = point.cloud_bottom().unwrap();
        assert!(top >= bottom);
    }
}
