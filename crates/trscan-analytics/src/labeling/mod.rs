//! 신호 레이블링 파이프라인.
//!
//! 과거 TR 매수 신호마다 이후 캔들을 전방 리플레이하여 결과 레이블을
//! 부여합니다(`walk`). 신호 추출은 `scanner`에 있습니다.
//!
//! 배치 레이블링은 (심볼, 신호) 단위로 완전히 독립이므로 rayon으로
//! 병렬화하며, 개별 항목의 제외/에러는 그 항목만 건너뛰고 배치를
//! 계속합니다. 잘못된 심볼 하나가 데이터셋 빌드 전체를 중단시키는 일은
//! 없습니다.

pub mod scanner;
pub mod walk;

use rayon::prelude::*;
use tracing::debug;

use trscan_core::config::LabelingConfig;
use trscan_core::{Bar, LabeledSignal, PeerRank, Symbol, Timeframe};

use crate::indicators::IndicatorEngine;

pub use scanner::SignalScanner;
pub use walk::{label_signal, Excluded, LabelResult};

/// 레이블링 설정 (코어 설정 섹션의 별칭).
pub type LabelConfig = LabelingConfig;

/// 한 종목의 전체 이력에서 신호 추출과 레이블링을 수행합니다.
///
/// i번째 캔들에서 발생한 신호의 전방 캔들은 같은 이력의 i+1 이후
/// 구간입니다. 제외된 신호(데이터 부족, 손익 없는 미결)는 로그만 남기고
/// 결과에서 빠집니다.
pub fn scan_and_label(
    symbol: &Symbol,
    timeframe: Timeframe,
    bars: &[Bar],
    ranks: Option<&[PeerRank]>,
    config: &LabelConfig,
) -> anyhow::Result<Vec<LabeledSignal>> {
    let frame = IndicatorEngine::new().compute_frame(bars)?;
    let scanner = SignalScanner::with_defaults();
    let signals = scanner.scan(symbol, timeframe, &frame, ranks);

    // 신호 entry_date → 캔들 인덱스 (scan이 프레임 인덱스 기준으로
    // 날짜를 부여하므로 항상 존재)
    let labeled: Vec<LabeledSignal> = signals
        .into_par_iter()
        .filter_map(|signal| {
            let entry_idx = bars.iter().position(|b| b.date == signal.entry_date)?;
            let forward = &bars[entry_idx + 1..];
            match label_signal(&signal, forward, config) {
                LabelResult::Labeled(labeled) => Some(labeled),
                LabelResult::Excluded(reason) => {
                    debug!(
                        symbol = %signal.symbol,
                        entry_date = %signal.entry_date,
                        ?reason,
                        "신호 제외"
                    );
                    None
                }
            }
        })
        .collect();

    Ok(labeled)
}

/// 신호 배치를 병렬로 레이블링합니다.
///
/// 각 항목은 (신호, 해당 신호의 전방 캔들)입니다. 제외 항목은 결과에서
/// 빠지며 배치는 계속됩니다.
pub fn label_batch(
    items: &[(trscan_core::BuySignal, Vec<Bar>)],
    config: &LabelConfig,
) -> Vec<LabeledSignal> {
    items
        .par_iter()
        .filter_map(|(signal, forward)| match label_signal(signal, forward, config) {
            LabelResult::Labeled(labeled) => Some(labeled),
            LabelResult::Excluded(reason) => {
                debug!(
                    symbol = %signal.symbol,
                    entry_date = %signal.entry_date,
                    ?reason,
                    "신호 제외"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use trscan_core::{BuySignal, QualityFlags, TrStage};

    fn make_bars(closes: &[Decimal]) -> Vec<Bar> {
        let start: NaiveDate = "2020-01-01".parse().unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                Bar::new(
                    start + Duration::days(i as i64),
                    *close,
                    *close + dec!(1),
                    *close - dec!(1),
                    *close,
                    dec!(10000),
                )
            })
            .collect()
    }

    fn make_signal(entry_price: Decimal) -> BuySignal {
        BuySignal {
            symbol: Symbol::new("TEST"),
            timeframe: Timeframe::Daily,
            entry_date: "2020-01-01".parse().unwrap(),
            entry_price,
            stage: TrStage::StrongBuy,
            buy_point: None,
            stop_loss: entry_price * dec!(0.9),
            ema_3: entry_price,
            ema_9: entry_price,
            ema_20: entry_price,
            ema_34: entry_price,
            ppo_value: dec!(1.0),
            ppo_histogram: dec!(0.2),
            pmo_value: dec!(1.5),
            flags: QualityFlags::default(),
        }
    }

    #[test]
    fn test_label_batch_skips_excluded_items() {
        let config = LabelConfig::default();

        // 첫 항목: 목표 도달 (Success), 둘째 항목: 전방 데이터 부족 (제외)
        let winner = (
            make_signal(dec!(100)),
            make_bars(&[dec!(101), dec!(103), dec!(106), dec!(104), dec!(105), dec!(102)]),
        );
        let starved = (make_signal(dec!(100)), make_bars(&[dec!(101)]));

        let labeled = label_batch(&[winner, starved], &config);
        assert_eq!(labeled.len(), 1);
        assert!(labeled[0].is_success());
    }

    #[test]
    fn test_label_batch_empty() {
        let labeled = label_batch(&[], &LabelConfig::default());
        assert!(labeled.is_empty());
    }

    #[test]
    fn test_scan_and_label_pipeline() {
        // 가속 상승 이력: 매수 전환 신호가 발생하고, 이후 상승이 계속되므로
        // 목표 도달 Success로 레이블됨
        let start: NaiveDate = "2020-01-01".parse().unwrap();
        let mut close = dec!(100);
        let bars: Vec<Bar> = (0..220)
            .map(|i| {
                close *= Decimal::ONE + dec!(0.0002) * Decimal::from(i);
                Bar::new(
                    start + chrono::Duration::days(i as i64),
                    close,
                    close + dec!(1),
                    close - dec!(1),
                    close,
                    dec!(10000),
                )
            })
            .collect();

        let labeled = scan_and_label(
            &Symbol::new("ACCEL"),
            Timeframe::Daily,
            &bars,
            None,
            &LabelConfig::default(),
        )
        .unwrap();

        assert!(!labeled.is_empty());
        for item in &labeled {
            assert!(item.is_success());
            assert!(item.signal.stage.is_buy());
        }
    }
}
