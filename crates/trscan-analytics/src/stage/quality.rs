//! 신호 품질 플래그.
//!
//! 세 가지 보조 조건을 불리언 플래그로 평가합니다:
//!
//! - `has_buy_point`: 종가가 매수 구간(매수 포인트 ±5%) 안
//! - `has_uptrend`: 종가가 장기 EMA(50) 위
//! - `has_rs_chaikin`: 상대강도 + Chaikin A/D 백분위 모두 상위 5%
//!   (유니버스 횡단 순위는 외부 제공자 입력)

use rust_decimal::Decimal;
use trscan_core::{PeerRank, QualityFlags};

use super::buy_point::{in_buy_zone, BuyPointParams};
use crate::indicators::IndicatorFrame;

/// idx 캔들의 품질 플래그를 평가합니다.
///
/// `buy_point`는 해당 캔들까지 확정된 매수 포인트, `rank`는 해당 날짜의
/// 유니버스 횡단 순위입니다. 순위 입력이 없으면 엘리트 플래그는
/// false입니다 (추측하지 않음).
pub fn quality_flags(
    frame: &IndicatorFrame,
    idx: usize,
    buy_point: Option<Decimal>,
    rank: Option<&PeerRank>,
    params: &BuyPointParams,
) -> QualityFlags {
    let close = frame.closes[idx];

    let has_buy_point = buy_point
        .map(|bp| in_buy_zone(close, bp, params.zone_pct))
        .unwrap_or(false);

    let has_uptrend = frame.ema_50[idx].map(|ema| close > ema).unwrap_or(false);

    let has_rs_chaikin = rank.map(|r| r.is_elite()).unwrap_or(false);

    QualityFlags {
        has_buy_point,
        has_uptrend,
        has_rs_chaikin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorEngine;
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use trscan_core::Bar;

    fn climbing_bars(n: usize) -> Vec<Bar> {
        let start: NaiveDate = "2020-01-01".parse().unwrap();
        (0..n)
            .map(|i| {
                let close = Decimal::from(100 + i);
                Bar::new(
                    start + Duration::days(i as i64),
                    close,
                    close + dec!(1),
                    close - dec!(1),
                    close,
                    dec!(10000),
                )
            })
            .collect()
    }

    #[test]
    fn test_uptrend_flag_above_ema50() {
        let bars = climbing_bars(100);
        let frame = IndicatorEngine::new().compute_frame(&bars).unwrap();
        let params = BuyPointParams::default();

        // 상승 시계열에서 종가는 EMA 50 위
        let flags = quality_flags(&frame, 90, None, None, &params);
        assert!(flags.has_uptrend);
        assert!(!flags.has_buy_point);
        assert!(!flags.has_rs_chaikin);
    }

    #[test]
    fn test_uptrend_flag_requires_ema50_lookback() {
        let bars = climbing_bars(30);
        let frame = IndicatorEngine::new().compute_frame(&bars).unwrap();
        let params = BuyPointParams::default();

        // EMA 50 미정의 구간에서는 false (추측 금지)
        let flags = quality_flags(&frame, 20, None, None, &params);
        assert!(!flags.has_uptrend);
    }

    #[test]
    fn test_buy_point_flag() {
        let bars = climbing_bars(100);
        let frame = IndicatorEngine::new().compute_frame(&bars).unwrap();
        let params = BuyPointParams::default();

        let close = frame.closes[90];
        let near = quality_flags(&frame, 90, Some(close * dec!(1.02)), None, &params);
        assert!(near.has_buy_point);

        let far = quality_flags(&frame, 90, Some(close * dec!(1.20)), None, &params);
        assert!(!far.has_buy_point);
    }

    #[test]
    fn test_elite_flag_from_rank() {
        let bars = climbing_bars(100);
        let frame = IndicatorEngine::new().compute_frame(&bars).unwrap();
        let params = BuyPointParams::default();

        let elite_rank = PeerRank {
            date: frame.dates[90],
            rs_percentile: dec!(96),
            chaikin_percentile: dec!(98),
        };
        let flags = quality_flags(&frame, 90, None, Some(&elite_rank), &params);
        assert!(flags.has_rs_chaikin);
        assert_eq!(flags.quality_level(), 3);

        let weak_rank = PeerRank {
            rs_percentile: dec!(80),
            ..elite_rank
        };
        let flags = quality_flags(&frame, 90, None, Some(&weak_rank), &params);
        assert!(!flags.has_rs_chaikin);
    }
}
