//! Statistics Calculator Module
//! Handles statistical computations including descriptive stats, correlation,
//! least-squares fits and Welch t-tests.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Significance threshold for t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Descriptive statistics of one sample.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
    pub p95: f64,
    pub p05: f64,
}

impl Default for DescriptiveStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            variance: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            q1: f64::NAN,
            q3: f64::NAN,
            p95: f64::NAN,
            p05: f64::NAN,
        }
    }
}

/// Outcome of a two-sample Welch t-test.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TTestResult {
    pub t_statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
    pub is_significant: bool,
}

/// Stateless statistical helpers.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> DescriptiveStats {
        let n = values.len();
        if n == 0 {
            return DescriptiveStats::default();
        }

        let sorted = Self::sorted(values);

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        DescriptiveStats {
            count: n,
            mean,
            median: Self::percentile(&sorted, 50.0),
            std: variance.sqrt(),
            variance,
            min: sorted[0],
            max: sorted[n - 1],
            q1: Self::percentile(&sorted, 25.0),
            q3: Self::percentile(&sorted, 75.0),
            p95: Self::percentile(&sorted, 95.0),
            p05: Self::percentile(&sorted, 5.0),
        }
    }

    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    pub fn median(values: &[f64]) -> f64 {
        Self::percentile(&Self::sorted(values), 50.0)
    }

    fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Perform Welch's t-test (independent samples, unequal variance).
    ///
    /// Returns `None` when either sample has fewer than two values. Two
    /// constant samples give a NaN statistic and p-value.
    pub fn welch_ttest(sample_a: &[f64], sample_b: &[f64]) -> Option<TTestResult> {
        let n1 = sample_a.len() as f64;
        let n2 = sample_b.len() as f64;

        if n1 < 2.0 || n2 < 2.0 {
            return None;
        }

        let mean1 = sample_a.iter().sum::<f64>() / n1;
        let mean2 = sample_b.iter().sum::<f64>() / n2;

        let var1 = sample_a.iter().map(|x| (x - mean1).powi(2)).sum::<f64>() / (n1 - 1.0);
        let var2 = sample_b.iter().map(|x| (x - mean2).powi(2)).sum::<f64>() / (n2 - 1.0);

        let se = (var1 / n1 + var2 / n2).sqrt();
        if se == 0.0 {
            return Some(TTestResult {
                t_statistic: f64::NAN,
                p_value: f64::NAN,
                degrees_of_freedom: f64::NAN,
                is_significant: false,
            });
        }

        let t = (mean1 - mean2) / se;

        // Welch-Satterthwaite degrees of freedom
        let df_num = (var1 / n1 + var2 / n2).powi(2);
        let df_denom = (var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0);
        let df = df_num / df_denom;

        // Two-tailed p-value using t-distribution
        let p_value = match StudentsT::new(0.0, 1.0, df) {
            Ok(dist) => 2.0 * dist.sf(t.abs()),
            Err(_) => f64::NAN,
        };

        Some(TTestResult {
            t_statistic: t,
            p_value,
            degrees_of_freedom: df,
            is_significant: p_value <= SIGNIFICANCE_THRESHOLD,
        })
    }

    /// Pearson correlation of paired samples. NaN for fewer than two pairs or
    /// a constant input.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return f64::NAN;
        }

        let mean_x = Self::mean(&xs[..n]);
        let mean_y = Self::mean(&ys[..n]);

        let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for (x, y) in xs.iter().zip(ys.iter()) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return f64::NAN;
        }
        (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
    }

    /// Degree-1 least-squares fit, returned as `(slope, intercept)`.
    pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return None;
        }

        let mean_x = Self::mean(&xs[..n]);
        let mean_y = Self::mean(&ys[..n]);

        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (x, y) in xs.iter().zip(ys.iter()) {
            sxy += (x - mean_x) * (y - mean_y);
            sxx += (x - mean_x).powi(2);
        }

        if sxx == 0.0 {
            return None;
        }
        let slope = sxy / sxx;
        Some((slope, mean_y - slope * mean_x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_descriptive_stats() {
        let stats = StatsCalculator::compute_descriptive_stats(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert!(close(stats.mean, 2.5, 1e-12));
        assert!(close(stats.median, 2.5, 1e-12));
        assert!(close(stats.variance, 5.0 / 3.0, 1e-12));
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert!(close(stats.q1, 1.75, 1e-12));
        assert!(close(stats.q3, 3.25, 1e-12));
    }

    #[test]
    fn test_descriptive_stats_empty() {
        let stats = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(StatsCalculator::median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(StatsCalculator::median(&[60.0, 80.0]), 70.0);
        assert!(StatsCalculator::median(&[]).is_nan());
    }

    #[test]
    fn test_welch_ttest_matches_reference() {
        // scipy.stats.ttest_ind(a, b, equal_var=False)
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];
        let result = StatsCalculator::welch_ttest(&a, &b).expect("enough data");
        assert!(close(result.t_statistic, -1.8973665961010275, 1e-9));
        assert!(close(result.degrees_of_freedom, 5.882352941176471, 1e-9));
        assert!(close(result.p_value, 0.10753119180376525, 1e-6));
        assert!(!result.is_significant);
    }

    #[test]
    fn test_welch_ttest_requires_two_values_per_group() {
        assert!(StatsCalculator::welch_ttest(&[1.0], &[1.0, 2.0]).is_none());
        assert!(StatsCalculator::welch_ttest(&[], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_welch_ttest_constant_samples() {
        let result = StatsCalculator::welch_ttest(&[1.0, 1.0], &[1.0, 1.0]).unwrap();
        assert!(result.t_statistic.is_nan());
        assert!(!result.is_significant);
    }

    #[test]
    fn test_pearson() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!(close(StatsCalculator::pearson(&xs, &[2.0, 4.0, 6.0, 8.0]), 1.0, 1e-12));
        assert!(close(StatsCalculator::pearson(&xs, &[8.0, 6.0, 4.0, 2.0]), -1.0, 1e-12));
        assert!(StatsCalculator::pearson(&xs, &[1.0, 1.0, 1.0, 1.0]).is_nan());
        assert!(StatsCalculator::pearson(&[1.0], &[1.0]).is_nan());
    }

    #[test]
    fn test_linear_fit() {
        let (slope, intercept) =
            StatsCalculator::linear_fit(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        assert!(close(slope, 2.0, 1e-12));
        assert!(close(intercept, 1.0, 1e-12));
        assert!(StatsCalculator::linear_fit(&[1.0, 1.0], &[0.0, 5.0]).is_none());
    }
}
