//! 신호 스캐너.
//!
//! 분류된 이력을 리플레이하며 매수 스테이지로 전환되는 캔들마다
//! `BuySignal`을 만듭니다. 신호에는 진입 시점의 지표 스냅샷과 품질
//! 플래그가 담기므로, 이후 feature 추출이 신호 레코드만으로 재현됩니다.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use trscan_core::{BuySignal, PeerRank, Symbol, Timeframe, TrStage};

use crate::indicators::IndicatorFrame;
use crate::stage::{buy_points, quality_flags, stop_loss_price, BuyPointParams, StageClassifier};

/// 신호 스캐너.
pub struct SignalScanner {
    /// 신호를 발생시키는 스테이지 집합.
    signal_stages: Vec<TrStage>,
    /// 매수 포인트/손절 파라미터.
    buy_point_params: BuyPointParams,
}

impl Default for SignalScanner {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SignalScanner {
    /// 기본 설정(StrongBuy/Buy 전환에서 신호 발생)으로 생성합니다.
    pub fn with_defaults() -> Self {
        Self {
            signal_stages: vec![TrStage::StrongBuy, TrStage::Buy],
            buy_point_params: BuyPointParams::default(),
        }
    }

    /// 신호를 발생시키는 스테이지 집합을 지정합니다.
    pub fn with_signal_stages(mut self, stages: Vec<TrStage>) -> Self {
        self.signal_stages = stages;
        self
    }

    /// 매수 포인트 파라미터를 지정합니다.
    pub fn with_buy_point_params(mut self, params: BuyPointParams) -> Self {
        self.buy_point_params = params;
        self
    }

    fn is_signal_stage(&self, stage: TrStage) -> bool {
        self.signal_stages.contains(&stage)
    }

    /// 이력 전체를 스캔해 매수 신호를 추출합니다.
    ///
    /// 신호는 스테이지가 신호 집합 "밖 → 안"으로 전환되는 캔들에서만
    /// 발생합니다. 신호 집합 안에 머무르는 연속 캔들은 추가 신호를 만들지
    /// 않습니다. `ranks`가 없으면 엘리트 플래그는 항상 false입니다.
    pub fn scan(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        frame: &IndicatorFrame,
        ranks: Option<&[PeerRank]>,
    ) -> Vec<BuySignal> {
        let stages = StageClassifier::new().classify_all(frame);
        let bps = buy_points(&frame.highs, self.buy_point_params);

        let rank_by_date: HashMap<NaiveDate, PeerRank> = ranks
            .unwrap_or(&[])
            .iter()
            .map(|r| (r.date, *r))
            .collect();

        let mut signals = Vec::new();

        for i in 1..frame.len() {
            if !self.is_signal_stage(stages[i]) || self.is_signal_stage(stages[i - 1]) {
                continue;
            }

            // 신호 스테이지는 확정 스테이지이므로 스냅샷 지표가 모두 존재
            let (Some(ema_3), Some(ema_9), Some(ema_20), Some(ema_34)) = (
                frame.ema_3[i],
                frame.ema_9[i],
                frame.ema_20[i],
                frame.ema_34[i],
            ) else {
                continue;
            };
            let (Some(ppo_value), Some(ppo_histogram)) =
                (frame.ppo[i].line, frame.ppo[i].histogram)
            else {
                continue;
            };
            let Some(pmo_value) = frame.pmo[i].line else {
                continue;
            };

            let entry_price = frame.closes[i];
            let flags = quality_flags(
                frame,
                i,
                bps[i],
                rank_by_date.get(&frame.dates[i]),
                &self.buy_point_params,
            );

            signals.push(BuySignal {
                symbol: symbol.clone(),
                timeframe,
                entry_date: frame.dates[i],
                entry_price,
                stage: stages[i],
                buy_point: bps[i],
                stop_loss: stop_loss_price(entry_price, self.buy_point_params.stop_pct),
                ema_3,
                ema_9,
                ema_20,
                ema_34,
                ppo_value,
                ppo_histogram,
                pmo_value,
                flags,
            });
        }

        debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            count = signals.len(),
            "신호 스캔 완료"
        );

        signals
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

    /// 가속 상승으로 Strong Buy에 도달하는 합성 이력.
    fn accelerating_bars(n: usize) -> Vec<Bar> {
        let start: NaiveDate = "2020-01-01".parse().unwrap();
        let mut close = dec!(100);
        (0..n)
            .map(|i| {
                close *= Decimal::ONE + dec!(0.0002) * Decimal::from(i);
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
    fn test_scan_emits_signal_on_transition_only() {
        let bars = accelerating_bars(200);
        let frame = IndicatorEngine::new().compute_frame(&bars).unwrap();
        let scanner = SignalScanner::with_defaults();

        let signals = scanner.scan(&Symbol::new("TEST"), Timeframe::Daily, &frame, None);

        // 가속 상승에서는 매수 스테이지 진입이 드물게만 발생
        assert!(!signals.is_empty());

        // 연속 캔들에서 중복 신호가 없어야 함: 신호 날짜는 모두 다르고,
        // 신호 캔들의 전 캔들은 매수 스테이지가 아님
        let stages = StageClassifier::new().classify_all(&frame);
        for signal in &signals {
            let idx = frame
                .dates
                .iter()
                .position(|d| *d == signal.entry_date)
                .unwrap();
            assert!(stages[idx].is_buy());
            assert!(!stages[idx - 1].is_buy());
        }
    }

    #[test]
    fn test_signal_snapshot_matches_frame() {
        let bars = accelerating_bars(200);
        let frame = IndicatorEngine::new().compute_frame(&bars).unwrap();
        let scanner = SignalScanner::with_defaults();

        let signals = scanner.scan(&Symbol::new("TEST"), Timeframe::Daily, &frame, None);
        let signal = signals.first().expect("at least one signal");

        let idx = frame
            .dates
            .iter()
            .position(|d| *d == signal.entry_date)
            .unwrap();

        assert_eq!(signal.entry_price, frame.closes[idx]);
        assert_eq!(Some(signal.ema_9), frame.ema_9[idx]);
        assert_eq!(Some(signal.ppo_value), frame.ppo[idx].line);
        // 손절가는 진입가의 90%
        assert_eq!(signal.stop_loss, signal.entry_price * dec!(0.9));
    }

    #[test]
    fn test_elite_flag_requires_rank_input() {
        let bars = accelerating_bars(200);
        let frame = IndicatorEngine::new().compute_frame(&bars).unwrap();
        let scanner = SignalScanner::with_defaults();
        let symbol = Symbol::new("TEST");

        // 순위 입력 없음 → 엘리트 플래그 없음
        let signals = scanner.scan(&symbol, Timeframe::Daily, &frame, None);
        assert!(signals.iter().all(|s| !s.flags.has_rs_chaikin));

        // 모든 날짜에 엘리트 순위 제공 → 플래그 설정
        let ranks: Vec<PeerRank> = frame
            .dates
            .iter()
            .map(|d| PeerRank {
                date: *d,
                rs_percentile: dec!(97),
                chaikin_percentile: dec!(96),
            })
            .collect();
        let signals = scanner.scan(&symbol, Timeframe::Daily, &frame, Some(&ranks));
        assert!(signals.iter().all(|s| s.flags.has_rs_chaikin));
        assert!(!signals.is_empty());
    }

    #[test]
    fn test_strong_buy_only_filter() {
        let bars = accelerating_bars(200);
        let frame = IndicatorEngine::new().compute_frame(&bars).unwrap();
        let scanner =
            SignalScanner::with_defaults().with_signal_stages(vec![TrStage::StrongBuy]);

        let signals = scanner.scan(&Symbol::new("TEST"), Timeframe::Daily, &frame, None);
        assert!(signals.iter().all(|s| s.stage == TrStage::StrongBuy));
    }
}
