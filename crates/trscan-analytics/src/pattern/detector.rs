//! 패턴 템플릿 매칭.
//!
//! 추출된 극점 배열을 8가지 기하 템플릿과 대조합니다. 각 감지기는
//! 해당 유형의 최소 윈도우보다 짧은 입력에서 빈 결과를 반환하며, 에러를
//! 내지 않습니다.
//!
//! 신뢰도 상수는 조정 가능한 파라미터이며 회귀 테스트로 고정됩니다.
//! 같은 입력에는 항상 같은 신뢰도가 나와야 합니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use trscan_core::Bar;

use super::extrema::{find_extrema, Extrema};
use super::geometry::fit_line;
use super::{Direction, KeyPoint, PatternConfig, PatternKind, PatternMatch};

/// 머리어깨형 계열 신뢰도: 기준 + 깊이 비율 - 어깨 비대칭, 상한 0.85.
const HNS_BASE: f64 = 0.60;
const HNS_CAP: f64 = 0.85;
/// 이중 천장/바닥 신뢰도: 기준 + 깊이 비율 - 높이 차이, 상한 0.80.
const DOUBLE_BASE: f64 = 0.55;
const DOUBLE_CAP: f64 = 0.80;
/// 삼각형 신뢰도: 기준 + 0.05 × 터치 수 + 0.15 × 추세선 R².
const TRIANGLE_BASE: f64 = 0.45;
const TRIANGLE_CAP: f64 = 0.75;
const SYMMETRICAL_BASE: f64 = 0.40;
const SYMMETRICAL_CAP: f64 = 0.70;
const TOUCH_WEIGHT: f64 = 0.05;
const FIT_WEIGHT: f64 = 0.15;
/// 컵앤핸들 신뢰도: 기준 + 컵 깊이 비율, 상한 0.85.
const CUP_BASE: f64 = 0.60;
const CUP_CAP: f64 = 0.85;

/// 머리가 어깨보다 높아야 하는 최소 비율 (2%).
const HEAD_MARGIN: Decimal = dec!(1.02);

/// 차트 패턴 감지기.
pub struct PatternDetector {
    config: PatternConfig,
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PatternDetector {
    /// 주어진 설정으로 감지기를 생성합니다.
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    /// 기본 설정으로 감지기를 생성합니다.
    pub fn with_defaults() -> Self {
        Self::new(PatternConfig::default())
    }

    /// 설정을 반환합니다.
    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// 캔들 시계열에서 패턴을 감지합니다.
    ///
    /// 신뢰도 내림차순으로 정렬되며, `min_confidence` 미만은 제외됩니다.
    /// 동일 유형 매치 중 구간이 절반 넘게 겹치는 것은 신뢰도가 높은
    /// 쪽만 남습니다. 유형이 다른 매치는 겹쳐도 모두 유지됩니다.
    pub fn detect(&self, bars: &[Bar]) -> Vec<PatternMatch> {
        let closes: Vec<Decimal> = bars.iter().map(|b| b.close).collect();
        self.detect_closes(&closes)
    }

    /// 종가 시계열에서 패턴을 감지합니다.
    pub fn detect_closes(&self, closes: &[Decimal]) -> Vec<PatternMatch> {
        let extrema = find_extrema(closes, &self.config);

        let mut matches = Vec::new();
        matches.extend(self.detect_head_and_shoulders(closes, &extrema));
        matches.extend(self.detect_inverse_head_and_shoulders(closes, &extrema));
        matches.extend(self.detect_double_top(closes, &extrema));
        matches.extend(self.detect_double_bottom(closes, &extrema));
        matches.extend(self.detect_triangles(closes, &extrema));
        matches.extend(self.detect_cup_and_handle(closes));

        let mut result = self.dedup_within_kind(matches);
        result.retain(|m| m.confidence >= self.config.min_confidence);
        result.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.start_index.cmp(&b.start_index))
                .then(a.end_index.cmp(&b.end_index))
        });
        result
    }

    // ==================== 반전 패턴 ====================

    fn detect_head_and_shoulders(
        &self,
        closes: &[Decimal],
        extrema: &Extrema,
    ) -> Vec<PatternMatch> {
        let mut matches = Vec::new();

        for window in extrema.peaks.windows(3) {
            let (left, head, right) = (window[0], window[1], window[2]);
            let (lp, hp, rp) = (closes[left], closes[head], closes[right]);

            // 머리는 양 어깨보다 분명히 높아야 함
            if hp <= lp.max(rp) * HEAD_MARGIN {
                continue;
            }

            // 양 어깨는 비슷한 높이
            let asym = ratio((lp - rp).abs(), lp.max(rp));
            if asym > self.config.shoulder_tolerance {
                continue;
            }

            // 넥라인: 어깨-머리 사이 두 밸리를 연결
            let Some(t1) = lowest_between(&extrema.troughs, closes, left, head) else {
                continue;
            };
            let Some(t2) = lowest_between(&extrema.troughs, closes, head, right) else {
                continue;
            };

            let neckline = (closes[t1] + closes[t2]) / dec!(2);
            let height = hp - neckline;
            if height <= Decimal::ZERO {
                continue;
            }

            let depth = ratio(height, hp);
            matches.push(PatternMatch {
                kind: PatternKind::HeadAndShoulders,
                start_index: left,
                end_index: right,
                confidence: (HNS_BASE + depth - asym).clamp(0.0, HNS_CAP),
                target_price: Some(neckline - height),
                direction: Direction::Bearish,
                key_points: key_points(closes, &[left, t1, head, t2, right]),
            });
        }

        matches
    }

    fn detect_inverse_head_and_shoulders(
        &self,
        closes: &[Decimal],
        extrema: &Extrema,
    ) -> Vec<PatternMatch> {
        let mut matches = Vec::new();

        for window in extrema.troughs.windows(3) {
            let (left, head, right) = (window[0], window[1], window[2]);
            let (lp, hp, rp) = (closes[left], closes[head], closes[right]);

            // 머리는 양 어깨보다 분명히 낮아야 함
            if hp * HEAD_MARGIN >= lp.min(rp) {
                continue;
            }

            let asym = ratio((lp - rp).abs(), lp.min(rp));
            if asym > self.config.shoulder_tolerance {
                continue;
            }

            let Some(p1) = highest_between(&extrema.peaks, closes, left, head) else {
                continue;
            };
            let Some(p2) = highest_between(&extrema.peaks, closes, head, right) else {
                continue;
            };

            let neckline = (closes[p1] + closes[p2]) / dec!(2);
            let height = neckline - hp;
            if height <= Decimal::ZERO {
                continue;
            }

            let depth = ratio(height, neckline);
            matches.push(PatternMatch {
                kind: PatternKind::InverseHeadAndShoulders,
                start_index: left,
                end_index: right,
                confidence: (HNS_BASE + depth - asym).clamp(0.0, HNS_CAP),
                target_price: Some(neckline + height),
                direction: Direction::Bullish,
                key_points: key_points(closes, &[left, p1, head, p2, right]),
            });
        }

        matches
    }

    fn detect_double_top(&self, closes: &[Decimal], extrema: &Extrema) -> Vec<PatternMatch> {
        let mut matches = Vec::new();

        for window in extrema.peaks.windows(2) {
            let (first, second) = (window[0], window[1]);
            let (p1, p2) = (closes[first], closes[second]);

            let diff = ratio((p1 - p2).abs(), p1.max(p2));
            if diff > self.config.double_tolerance {
                continue;
            }

            let Some(trough) = lowest_between(&extrema.troughs, closes, first, second) else {
                continue;
            };

            let avg_peak = (p1 + p2) / dec!(2);
            let height = avg_peak - closes[trough];
            if height <= Decimal::ZERO {
                continue;
            }

            let depth = ratio(height, avg_peak);
            matches.push(PatternMatch {
                kind: PatternKind::DoubleTop,
                start_index: first,
                end_index: second,
                confidence: (DOUBLE_BASE + depth - diff).clamp(0.0, DOUBLE_CAP),
                target_price: Some(closes[trough] - height),
                direction: Direction::Bearish,
                key_points: key_points(closes, &[first, trough, second]),
            });
        }

        matches
    }

    fn detect_double_bottom(&self, closes: &[Decimal], extrema: &Extrema) -> Vec<PatternMatch> {
        let mut matches = Vec::new();

        for window in extrema.troughs.windows(2) {
            let (first, second) = (window[0], window[1]);
            let (t1, t2) = (closes[first], closes[second]);

            let diff = ratio((t1 - t2).abs(), t1.min(t2));
            if diff > self.config.double_tolerance {
                continue;
            }

            // 저항선: 두 바닥 사이의 반등 고점
            let Some(peak) = highest_between(&extrema.peaks, closes, first, second) else {
                continue;
            };

            let avg_trough = (t1 + t2) / dec!(2);
            let resistance = closes[peak];
            let height = resistance - avg_trough;
            if height <= Decimal::ZERO {
                continue;
            }

            let depth = ratio(height, resistance);
            matches.push(PatternMatch {
                kind: PatternKind::DoubleBottom,
                start_index: first,
                end_index: second,
                confidence: (DOUBLE_BASE + depth - diff).clamp(0.0, DOUBLE_CAP),
                target_price: Some(resistance + height),
                direction: Direction::Bullish,
                key_points: key_points(closes, &[first, peak, second]),
            });
        }

        matches
    }

    // ==================== 지속 패턴 ====================

    fn detect_triangles(&self, closes: &[Decimal], extrema: &Extrema) -> Vec<PatternMatch> {
        let mut matches = Vec::new();
        let w = self.config.triangle_window;

        if closes.len() < w {
            return matches;
        }

        let mut start = 0;
        while start + w <= closes.len() {
            let end = start + w - 1;

            let peaks: Vec<(usize, Decimal)> = extrema
                .peaks
                .iter()
                .filter(|&&i| i >= start && i <= end)
                .map(|&i| (i, closes[i]))
                .collect();
            let troughs: Vec<(usize, Decimal)> = extrema
                .troughs
                .iter()
                .filter(|&&i| i >= start && i <= end)
                .map(|&i| (i, closes[i]))
                .collect();

            if peaks.len() >= 2 && troughs.len() >= 2 {
                matches.extend(self.classify_triangle(start, end, &peaks, &troughs));
            }

            start += self.config.triangle_step;
        }

        matches
    }

    fn classify_triangle(
        &self,
        start: usize,
        end: usize,
        peaks: &[(usize, Decimal)],
        troughs: &[(usize, Decimal)],
    ) -> Option<PatternMatch> {
        let peak_prices: Vec<Decimal> = peaks.iter().map(|(_, p)| *p).collect();
        let trough_prices: Vec<Decimal> = troughs.iter().map(|(_, p)| *p).collect();

        let peak_mean = mean(&peak_prices);
        let trough_mean = mean(&trough_prices);

        let peak_flat = flatness(&peak_prices, peak_mean) <= self.config.flat_tolerance;
        let trough_flat = flatness(&trough_prices, trough_mean) <= self.config.flat_tolerance;

        let last_peak = peak_prices[peak_prices.len() - 1];
        let last_trough = trough_prices[trough_prices.len() - 1];
        let troughs_rising = last_trough > trough_prices[0];
        let peaks_falling = last_peak < peak_prices[0];

        let touches = peaks.len() + troughs.len();
        let converge = Decimal::from_f64_retain(self.config.converge_pct).unwrap_or(dec!(0.03));

        // 상승 삼각형: 평평한 저항 + 상승하는 지지
        if peak_flat && troughs_rising {
            let support_fit = fit_line(troughs)?;
            let height = peak_mean - trough_prices[0];
            if height > Decimal::ZERO {
                let confidence = (TRIANGLE_BASE
                    + TOUCH_WEIGHT * touches as f64
                    + FIT_WEIGHT * support_fit.r2)
                    .clamp(0.0, TRIANGLE_CAP);
                return Some(triangle_match(
                    PatternKind::AscendingTriangle,
                    start,
                    end,
                    confidence,
                    Some(peak_mean + height),
                    Direction::Bullish,
                    peaks,
                    troughs,
                ));
            }
        }

        // 하락 삼각형: 평평한 지지 + 하락하는 저항
        if trough_flat && peaks_falling {
            let resistance_fit = fit_line(peaks)?;
            let height = peak_prices[0] - trough_mean;
            if height > Decimal::ZERO {
                let confidence = (TRIANGLE_BASE
                    + TOUCH_WEIGHT * touches as f64
                    + FIT_WEIGHT * resistance_fit.r2)
                    .clamp(0.0, TRIANGLE_CAP);
                return Some(triangle_match(
                    PatternKind::DescendingTriangle,
                    start,
                    end,
                    confidence,
                    Some(trough_mean - height),
                    Direction::Bearish,
                    peaks,
                    troughs,
                ));
            }
        }

        // 대칭 삼각형: 고점 하락 + 저점 상승이 모두 수렴 임계값 이상
        let peaks_converging = last_peak <= peak_prices[0] * (Decimal::ONE - converge);
        let troughs_converging = last_trough >= trough_prices[0] * (Decimal::ONE + converge);

        if peaks_converging && troughs_converging {
            let resistance_fit = fit_line(peaks)?;
            let support_fit = fit_line(troughs)?;
            let avg_r2 = (resistance_fit.r2 + support_fit.r2) / 2.0;
            let confidence = (SYMMETRICAL_BASE + TOUCH_WEIGHT * touches as f64 + FIT_WEIGHT * avg_r2)
                .clamp(0.0, SYMMETRICAL_CAP);
            // 방향 불확실: 목표가 없음
            return Some(triangle_match(
                PatternKind::SymmetricalTriangle,
                start,
                end,
                confidence,
                None,
                Direction::Neutral,
                peaks,
                troughs,
            ));
        }

        None
    }

    fn detect_cup_and_handle(&self, closes: &[Decimal]) -> Vec<PatternMatch> {
        let mut matches = Vec::new();
        let w = self.config.cup_window;

        if closes.len() < w {
            return matches;
        }

        let handle_len = w / 5;
        let cup_len = w - handle_len;
        let rim_ratio = dec!(0.95);

        let mut start = 0;
        while start + w <= closes.len() {
            let window = &closes[start..start + w];
            let cup = &window[..cup_len];
            let cup_start = cup[0];

            // 컵 바닥: 충분히 깊어야 함
            let (low_rel, cup_low) = argmin(cup);
            if cup_low >= cup_start * rim_ratio {
                start += self.config.cup_step;
                continue;
            }

            // 오른쪽 림: 시작가 근처까지 회복
            let (recovery_off, recovery) = argmax(&cup[low_rel..]);
            let recovery_rel = low_rel + recovery_off;
            if recovery < cup_start * rim_ratio || recovery_rel + handle_len >= w {
                start += self.config.cup_step;
                continue;
            }

            // 핸들: 얕고 짧은 되돌림
            let handle = &window[recovery_rel..recovery_rel + handle_len];
            let (_, handle_low) = argmin(handle);
            let pullback = ratio(recovery - handle_low, recovery);
            if pullback < self.config.handle_min_pullback
                || pullback > self.config.handle_max_pullback
            {
                start += self.config.cup_step;
                continue;
            }

            let depth = ratio(cup_start - cup_low, cup_start);
            matches.push(PatternMatch {
                kind: PatternKind::CupAndHandle,
                start_index: start,
                end_index: start + recovery_rel + handle_len - 1,
                confidence: (CUP_BASE + depth).clamp(0.0, CUP_CAP),
                target_price: Some(cup_start + (cup_start - cup_low)),
                direction: Direction::Bullish,
                key_points: vec![
                    KeyPoint { index: start, price: cup_start },
                    KeyPoint { index: start + low_rel, price: cup_low },
                    KeyPoint { index: start + recovery_rel, price: recovery },
                ],
            });

            start += self.config.cup_step;
        }

        matches
    }

    // ==================== 중복 제거 ====================

    /// 동일 유형 매치 중 구간이 `max_overlap`을 넘게 겹치면 신뢰도가
    /// 높은 쪽만 남깁니다. 유형 간에는 중복 제거하지 않습니다.
    fn dedup_within_kind(&self, matches: Vec<PatternMatch>) -> Vec<PatternMatch> {
        let mut by_kind: HashMap<PatternKind, Vec<PatternMatch>> = HashMap::new();
        for m in matches {
            by_kind.entry(m.kind).or_default().push(m);
        }

        let mut result = Vec::new();
        for (_, mut group) in by_kind {
            group.sort_by(|a, b| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.start_index.cmp(&b.start_index))
            });

            let mut kept: Vec<PatternMatch> = Vec::new();
            for candidate in group.drain(..) {
                let conflicts = kept.iter().any(|k| {
                    let overlap = candidate.overlap_len(k);
                    let shorter = candidate.span().min(k.span());
                    overlap as f64 / shorter as f64 > self.config.max_overlap
                });
                if !conflicts {
                    kept.push(candidate);
                }
            }
            result.extend(kept);
        }

        result
    }
}

// ==================== 내부 헬퍼 ====================

fn ratio(numerator: Decimal, denominator: Decimal) -> f64 {
    if denominator.is_zero() {
        return 0.0;
    }
    (numerator / denominator).to_f64().unwrap_or(0.0)
}

fn mean(values: &[Decimal]) -> Decimal {
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

fn flatness(values: &[Decimal], mean_value: Decimal) -> f64 {
    let max = values.iter().max().copied().unwrap_or(Decimal::ZERO);
    let min = values.iter().min().copied().unwrap_or(Decimal::ZERO);
    ratio(max - min, mean_value)
}

fn argmin(values: &[Decimal]) -> (usize, Decimal) {
    let mut idx = 0;
    for (i, v) in values.iter().enumerate() {
        if *v < values[idx] {
            idx = i;
        }
    }
    (idx, values[idx])
}

fn argmax(values: &[Decimal]) -> (usize, Decimal) {
    let mut idx = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[idx] {
            idx = i;
        }
    }
    (idx, values[idx])
}

/// 구간 (a, b) 사이의 극점 중 가장 낮은 것.
fn lowest_between(troughs: &[usize], closes: &[Decimal], a: usize, b: usize) -> Option<usize> {
    troughs
        .iter()
        .filter(|&&t| t > a && t < b)
        .min_by_key(|&&t| closes[t])
        .copied()
}

/// 구간 (a, b) 사이의 극점 중 가장 높은 것.
fn highest_between(peaks: &[usize], closes: &[Decimal], a: usize, b: usize) -> Option<usize> {
    peaks
        .iter()
        .filter(|&&p| p > a && p < b)
        .max_by_key(|&&p| closes[p])
        .copied()
}

fn key_points(closes: &[Decimal], indices: &[usize]) -> Vec<KeyPoint> {
    indices
        .iter()
        .map(|&i| KeyPoint { index: i, price: closes[i] })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn triangle_match(
    kind: PatternKind,
    start: usize,
    end: usize,
    confidence: f64,
    target_price: Option<Decimal>,
    direction: Direction,
    peaks: &[(usize, Decimal)],
    troughs: &[(usize, Decimal)],
) -> PatternMatch {
    let mut points: Vec<KeyPoint> = peaks
        .iter()
        .chain(troughs.iter())
        .map(|&(index, price)| KeyPoint { index, price })
        .collect();
    points.sort_by_key(|p| p.index);

    PatternMatch {
        kind,
        start_index: start,
        end_index: end,
        confidence,
        target_price,
        direction,
        key_points: points,
    }
}
