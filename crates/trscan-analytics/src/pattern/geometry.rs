//! 추세선 적합.
//!
//! 극점 집합에 대한 최소제곱 직선 적합과 적합 품질(R²)을 제공합니다.
//! 적합 통계는 신뢰도 계산에만 쓰이므로 f64로 계산합니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// 직선 적합 결과.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// 기울기 (가격/캔들)
    pub slope: f64,
    /// y 절편
    pub intercept: f64,
    /// 결정계수 (0.0 ~ 1.0)
    pub r2: f64,
}

impl LineFit {
    /// 평균 가격 대비 캔들당 상대 기울기.
    pub fn normalized_slope(&self, mean_price: f64) -> f64 {
        if mean_price.abs() < f64::EPSILON {
            return 0.0;
        }
        self.slope / mean_price
    }
}

/// (인덱스, 가격) 점들에 대한 최소제곱 직선 적합.
///
/// 점이 2개 미만이면 None. 가격 분산이 0이면(완전히 평평) R² = 1.
pub fn fit_line(points: &[(usize, Decimal)]) -> Option<LineFit> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let xs: Vec<f64> = points.iter().map(|(i, _)| *i as f64).collect();
    let ys: Vec<f64> = points
        .iter()
        .map(|(_, p)| p.to_f64().unwrap_or(0.0))
        .collect();

    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let ss_xy: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let ss_xx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();

    if ss_xx < f64::EPSILON {
        return None; // 같은 인덱스의 점들
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();

    let r2 = if ss_tot < f64::EPSILON {
        1.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    Some(LineFit { slope, intercept, r2 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_perfect_line() {
        let points: Vec<(usize, Decimal)> = (0..5).map(|i| (i, Decimal::from(100 + 2 * i))).collect();
        let fit = fit_line(&points).unwrap();

        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 100.0).abs() < 1e-9);
        assert!((fit.r2 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_line_r2_is_one() {
        let points = vec![(0, dec!(100)), (10, dec!(100)), (20, dec!(100))];
        let fit = fit_line(&points).unwrap();

        assert!(fit.slope.abs() < 1e-9);
        assert!((fit.r2 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_noisy_line_r2_below_one() {
        let points = vec![
            (0, dec!(100)),
            (5, dec!(108)),
            (10, dec!(104)),
            (15, dec!(116)),
            (20, dec!(112)),
        ];
        let fit = fit_line(&points).unwrap();

        assert!(fit.slope > 0.0);
        assert!(fit.r2 < 1.0);
        assert!(fit.r2 > 0.5);
    }

    #[test]
    fn test_too_few_points() {
        assert!(fit_line(&[(0, dec!(100))]).is_none());
        assert!(fit_line(&[]).is_none());
    }

    #[test]
    fn test_normalized_slope() {
        let points: Vec<(usize, Decimal)> = (0..5).map(|i| (i, Decimal::from(100 + i))).collect();
        let fit = fit_line(&points).unwrap();
        assert!((fit.normalized_slope(100.0) - 0.01).abs() < 1e-6);
    }
}
