//! Descriptive statistics over latency samples
//!
//! Quantiles use linear interpolation between closest ranks: for a sorted
//! sample of size `n`, percentile `p` sits at position `p/100 * (n - 1)` and
//! is interpolated between its two neighbours (the NumPy default, "type 7").
//! The same definition backs the distribution summary and the IQR fence, so
//! the quartiles a report shows are exactly the ones used to flag outliers.

use serde::Serialize;

/// Minimum sample size for which outliers are flagged
pub const MIN_OUTLIER_SAMPLES: usize = 4;

/// Distribution summary for a latency sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); 0 for fewer than two values
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub p90: f64,
    pub p95: f64,
    pub max: f64,
}

impl DistributionStats {
    /// Summarize `values`; `None` for an empty sample
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let sorted = sorted_copy(values);
        let mean = mean(values)?;

        Some(DistributionStats {
            count: values.len(),
            mean,
            std_dev: sample_std_dev(values, mean),
            min: sorted[0],
            q1: percentile(&sorted, 25.0),
            median: percentile(&sorted, 50.0),
            q3: percentile(&sorted, 75.0),
            p90: percentile(&sorted, 90.0),
            p95: percentile(&sorted, 95.0),
            max: sorted[sorted.len() - 1],
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Calculate percentile from sorted data
pub fn percentile(sorted_data: &[f64], percentile: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }
    if sorted_data.len() == 1 {
        return sorted_data[0];
    }

    let index = (percentile / 100.0) * (sorted_data.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted_data[lower]
    } else {
        let weight = index - lower as f64;
        sorted_data[lower] * (1.0 - weight) + sorted_data[upper] * weight
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(percentile(&sorted_copy(values), 50.0))
    }
}

fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Tukey fence `[Q1 - k*IQR, Q3 + k*IQR]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fence {
    pub lower: f64,
    pub upper: f64,
}

impl Fence {
    /// Fence over the full sample; `None` below [`MIN_OUTLIER_SAMPLES`] values
    pub fn from_values(values: &[f64], multiplier: f64) -> Option<Self> {
        if values.len() < MIN_OUTLIER_SAMPLES {
            return None;
        }
        let sorted = sorted_copy(values);
        let q1 = percentile(&sorted, 25.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;

        Some(Fence {
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Indices (ascending) of values strictly outside the IQR fence
pub fn iqr_outliers(values: &[f64], multiplier: f64) -> Vec<usize> {
    let Some(fence) = Fence::from_values(values, multiplier) else {
        return Vec::new();
    };

    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| !fence.contains(v))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [10.0, 11.0, 12.0, 13.0, 1000.0];
        assert_eq!(percentile(&sorted, 25.0), 11.0);
        assert_eq!(percentile(&sorted, 50.0), 12.0);
        assert_eq!(percentile(&sorted, 75.0), 13.0);

        let even = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&even, 50.0), 2.5);
        assert_eq!(percentile(&even, 25.0), 1.75);
    }

    #[test]
    fn test_percentile_edge_cases() {
        assert_eq!(percentile(&[], 50.0), 0.0);
        assert_eq!(percentile(&[7.0], 99.0), 7.0);
        assert_eq!(percentile(&[1.0, 9.0], 0.0), 1.0);
        assert_eq!(percentile(&[1.0, 9.0], 100.0), 9.0);
    }

    #[test]
    fn test_mean_and_median() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(median(&[6.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_distribution_stats() {
        let stats = DistributionStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.median, 4.5);
        assert_eq!(stats.q1, 4.0);
        assert_eq!(stats.q3, 5.5);
        assert_eq!(stats.iqr(), 1.5);
        // sum of squares 32 over n-1 = 7
        assert!((stats.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_distribution_single_value() {
        let stats = DistributionStats::from_values(&[42.0]).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.q1, 42.0);
        assert_eq!(stats.p95, 42.0);
        assert!(DistributionStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_iqr_outliers_flags_extreme_value() {
        let values = [10.0, 12.0, 11.0, 13.0, 1000.0];
        assert_eq!(iqr_outliers(&values, 1.5), vec![4]);
    }

    #[test]
    fn test_iqr_outliers_low_side() {
        let values = [100.0, 101.0, 102.0, 103.0, 104.0, 1.0];
        assert_eq!(iqr_outliers(&values, 1.5), vec![5]);
    }

    #[test]
    fn test_iqr_outliers_fence_boundary_not_flagged() {
        // q1 = 2, q3 = 4, iqr = 2, upper fence = 7
        let values = [1.0, 2.0, 3.0, 4.0, 7.0];
        let fence = Fence::from_values(&values, 1.5).unwrap();
        assert_eq!(fence.upper, 7.0);
        assert!(iqr_outliers(&values, 1.5).is_empty());
    }

    #[test]
    fn test_iqr_outliers_small_samples() {
        assert!(iqr_outliers(&[], 1.5).is_empty());
        assert!(iqr_outliers(&[1.0, 1000.0, 5.0], 1.5).is_empty());
    }

    #[test]
    fn test_iqr_outliers_constant_sample() {
        assert!(iqr_outliers(&[5.0; 10], 1.5).is_empty());
    }

    #[test]
    fn test_iqr_multiplier_widens_fence() {
        let values = [10.0, 11.0, 12.0, 13.0, 20.0];
        // q1 = 11, q3 = 13, iqr = 2
        assert_eq!(iqr_outliers(&values, 1.5), vec![4]);
        assert!(iqr_outliers(&values, 4.0).is_empty());
    }
}
