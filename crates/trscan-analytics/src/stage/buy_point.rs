//! 매수 포인트와 손절가.
//!
//! 매수 포인트는 룩백 구간 안에서 가장 최근에 확정된 주요 고점(피봇
//! 고가)입니다. 피봇은 좌우 `pivot` 캔들보다 높은 고가로 정의하며,
//! 우측 `pivot` 캔들이 지나야 확정되므로 미래 참조가 없습니다.
//!
//! 매수 구간은 매수 포인트 ±5%, 손절가는 진입가의 10% 아래입니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 매수 포인트 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BuyPointParams {
    /// 고점 탐색 룩백 (기본: 50).
    pub lookback: usize,
    /// 피봇 확정에 필요한 좌우 캔들 수 (기본: 5).
    pub pivot: usize,
    /// 매수 구간 허용 폭 (%, 기본: 5).
    pub zone_pct: Decimal,
    /// 손절 비율 (%, 기본: 10).
    pub stop_pct: Decimal,
}

impl Default for BuyPointParams {
    fn default() -> Self {
        Self {
            lookback: 50,
            pivot: 5,
            zone_pct: dec!(5),
            stop_pct: dec!(10),
        }
    }
}

/// 캔들별 매수 포인트 시계열.
///
/// 각 캔들에서, 해당 시점까지 확정된 가장 최근 피봇 고가를 반환합니다.
/// 룩백 안에 확정된 피봇이 없으면 None입니다.
pub fn buy_points(highs: &[Decimal], params: BuyPointParams) -> Vec<Option<Decimal>> {
    let n = highs.len();
    let pivot = params.pivot;

    // 피봇 고점: 좌우 pivot 캔들의 고가보다 높음
    let mut is_pivot = vec![false; n];
    for i in pivot..n.saturating_sub(pivot) {
        let left_max = highs[i - pivot..i].iter().max();
        let right_max = highs[i + 1..=i + pivot].iter().max();
        let is_peak = match (left_max, right_max) {
            (Some(l), Some(r)) => highs[i] > *l && highs[i] >= *r,
            _ => false,
        };
        is_pivot[i] = is_peak;
    }

    (0..n)
        .map(|i| {
            // i 시점에 확정된 피봇: p + pivot <= i
            let confirmed_until = i.saturating_sub(pivot);
            let window_start = i.saturating_sub(params.lookback);
            (window_start..=confirmed_until.min(n.saturating_sub(1)))
                .rev()
                .find(|&p| is_pivot[p])
                .map(|p| highs[p])
        })
        .collect()
}

/// 가격이 매수 구간(매수 포인트 ±zone_pct%) 안에 있는지 확인합니다.
pub fn in_buy_zone(price: Decimal, buy_point: Decimal, zone_pct: Decimal) -> bool {
    if buy_point <= Decimal::ZERO {
        return false;
    }
    let band = buy_point * zone_pct / dec!(100);
    price >= buy_point - band && price <= buy_point + band
}

/// 진입가 기준 손절가를 계산합니다.
pub fn stop_loss_price(entry_price: Decimal, stop_pct: Decimal) -> Decimal {
    entry_price * (Decimal::ONE - stop_pct / dec!(100))
}
