//! 극점 추출.
//!
//! 프로미넌스 + 최소 간격 필터를 가진 피크 탐색기입니다. 모든 패턴
//! 감지의 기반이 됩니다.
//!
//! - 간격: max(min_separation, 길이 / separation_divisor)
//! - 프로미넌스: 종가 표준편차 × prominence_std_mult
//!
//! 밸리는 부호를 뒤집은 시계열의 피크로 찾습니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::PatternConfig;

/// 추출된 극점 인덱스 묶음.
#[derive(Debug, Clone, Default)]
pub struct Extrema {
    /// 피크(국소 고점) 인덱스, 오름차순
    pub peaks: Vec<usize>,
    /// 밸리(국소 저점) 인덱스, 오름차순
    pub troughs: Vec<usize>,
}

/// 종가 시계열에서 피크와 밸리를 추출합니다.
pub fn find_extrema(closes: &[Decimal], config: &PatternConfig) -> Extrema {
    let values: Vec<f64> = closes
        .iter()
        .map(|c| c.to_f64().unwrap_or(0.0))
        .collect();

    if values.len() < 3 {
        return Extrema::default();
    }

    let distance = config
        .min_separation
        .max(values.len() / config.separation_divisor);
    let prominence = population_std(&values) * config.prominence_std_mult;

    let peaks = find_peaks(&values, distance, prominence);
    let negated: Vec<f64> = values.iter().map(|v| -v).collect();
    let troughs = find_peaks(&negated, distance, prominence);

    Extrema { peaks, troughs }
}

/// 모집단 표준편차.
fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// 간격과 프로미넌스 조건을 만족하는 피크 인덱스를 찾습니다.
fn find_peaks(values: &[f64], distance: usize, min_prominence: f64) -> Vec<usize> {
    let candidates: Vec<usize> = (1..values.len() - 1)
        .filter(|&i| values[i] > values[i - 1] && values[i] >= values[i + 1])
        .filter(|&i| prominence(values, i) >= min_prominence)
        .collect();

    // 간격 필터: 높은 피크부터 탐욕적으로 선택
    let mut by_height = candidates.clone();
    by_height.sort_by(|&a, &b| {
        values[b]
            .partial_cmp(&values[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut selected: Vec<usize> = Vec::new();
    for idx in by_height {
        if selected
            .iter()
            .all(|&kept| idx.abs_diff(kept) >= distance)
        {
            selected.push(idx);
        }
    }

    selected.sort_unstable();
    selected
}

/// 피크 프로미넌스.
///
/// 피크에서 좌우로 더 높은 지점을 만날 때까지 내려가면서 본 최저점 중
/// 높은 쪽과의 차이입니다.
fn prominence(values: &[f64], peak: usize) -> f64 {
    let height = values[peak];

    let mut left_min = height;
    let mut i = peak;
    while i > 0 {
        i -= 1;
        if values[i] > height {
            break;
        }
        left_min = left_min.min(values[i]);
    }

    let mut right_min = height;
    let mut j = peak;
    while j + 1 < values.len() {
        j += 1;
        if values[j] > height {
            break;
        }
        right_min = right_min.min(values[j]);
    }

    height - left_min.max(right_min)
}
