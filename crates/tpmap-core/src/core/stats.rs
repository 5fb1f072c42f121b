use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

/// Returns the median of the finite values in `values`, or `None` if there are none.
///
/// The median is taken as the element at index `n / 2` of the ascending sorted values, so
/// for even counts the upper of the two middle elements is returned rather than their mean.
pub fn median_of_finite<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_unstable_by(f64::total_cmp);
    Some(finite[finite.len() / 2])
}

/// Picks the value at `floor((n - 1) * fraction)` from an ascending sorted slice.
pub fn select_percentile(sorted: &[f64], fraction: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&fraction) {
        return None;
    }
    let index = ((sorted.len() - 1) as f64 * fraction).floor() as usize;
    sorted.get(index).copied()
}

/// Mergeable running mean and variance (Welford's update with Chan's parallel merge).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn merge(mut self, other: Self) -> Self {
        if other.count == 0 {
            return self;
        }
        if self.count == 0 {
            return other;
        }
        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        self.mean += delta * other.count as f64 / total as f64;
        self.m2 += other.m2 + delta * delta * (self.count as f64 * other.count as f64) / total as f64;
        self.count = total;
        self
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean of the pushed values, NaN when empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 { f64::NAN } else { self.mean }
    }

    /// Bias-corrected sample variance, NaN for fewer than two values.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            f64::NAN
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// A normal distribution used to turn bootstrap scores into p-values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalDistribution {
    pub mean: f64,
    pub std_dev: f64,
}

impl NormalDistribution {
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    fn distribution(&self) -> Option<Normal> {
        Normal::new(self.mean, self.std_dev).ok()
    }

    /// Cumulative distribution function.
    ///
    /// A zero-width distribution degenerates to a step at the mean.
    pub fn cdf(&self, x: f64) -> f64 {
        match self.distribution() {
            Some(normal) => normal.cdf(x),
            None if x < self.mean => 0.0,
            None => 1.0,
        }
    }

    /// Upper-tail probability `1 - cdf(x)`, computed without cancellation.
    pub fn sf(&self, x: f64) -> f64 {
        match self.distribution() {
            Some(normal) => normal.sf(x),
            None if x < self.mean => 1.0,
            None => 0.0,
        }
    }

    /// Two-tailed p-value of `x`.
    ///
    /// Values below the mean use the lower tail, all others the upper tail. For a zero-width
    /// distribution a value equal to the mean has p = 1 and anything else p = 0.
    pub fn two_tailed_p_value(&self, x: f64) -> f64 {
        if !x.is_finite() || !self.mean.is_finite() || !self.std_dev.is_finite() {
            return f64::NAN;
        }
        if self.std_dev <= 0.0 {
            return if x == self.mean { 1.0 } else { 0.0 };
        }
        let p = if x < self.mean {
            2.0 * self.cdf(x)
        } else {
            2.0 * self.sf(x)
        };
        p.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn median_of_odd_count_is_middle_element() {
        assert_eq!(median_of_finite([3.0, 1.0, 2.0]), Some(2.0));
    }

    #[test]
    fn median_of_even_count_is_upper_middle_element() {
        assert_eq!(median_of_finite([4.0, 1.0, 3.0, 2.0]), Some(3.0));
    }

    #[test]
    fn median_ignores_non_finite_values() {
        assert_eq!(
            median_of_finite([f64::NAN, 5.0, f64::INFINITY, 1.0, 3.0]),
            Some(3.0)
        );
    }

    #[test]
    fn median_of_only_missing_values_is_none() {
        assert_eq!(median_of_finite([f64::NAN, f64::NAN]), None);
        assert_eq!(median_of_finite(std::iter::empty()), None);
    }

    #[test]
    fn select_percentile_uses_floor_of_scaled_last_index() {
        let sorted = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        assert_eq!(select_percentile(&sorted, 0.2), Some(0.2));
        assert_eq!(select_percentile(&sorted, 0.1), Some(0.1));
        assert_eq!(select_percentile(&sorted, 0.8), Some(0.5));
        assert_eq!(select_percentile(&sorted, 1.0), Some(0.6));
        assert_eq!(select_percentile(&sorted, 0.0), Some(0.1));
    }

    #[test]
    fn select_percentile_rejects_empty_input_and_invalid_fraction() {
        assert_eq!(select_percentile(&[], 0.5), None);
        assert_eq!(select_percentile(&[1.0], 1.5), None);
        assert_eq!(select_percentile(&[1.0], f64::NAN), None);
    }

    #[test]
    fn running_stats_matches_direct_computation() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mut stats = RunningStats::new();
        values.iter().for_each(|&v| stats.push(v));

        assert_eq!(stats.count(), 8);
        assert!(f64_approx_equal(stats.mean(), 5.0));
        assert!(f64_approx_equal(stats.variance(), 32.0 / 7.0));
    }

    #[test]
    fn merged_running_stats_equal_sequential_accumulation() {
        let values: Vec<f64> = (0..50).map(|i| (i as f64 * 0.37).sin()).collect();
        let mut sequential = RunningStats::new();
        values.iter().for_each(|&v| sequential.push(v));

        let (left, right) = values.split_at(17);
        let mut a = RunningStats::new();
        left.iter().for_each(|&v| a.push(v));
        let mut b = RunningStats::new();
        right.iter().for_each(|&v| b.push(v));
        let merged = a.merge(b);

        assert_eq!(merged.count(), sequential.count());
        assert!(f64_approx_equal(merged.mean(), sequential.mean()));
        assert!(f64_approx_equal(merged.variance(), sequential.variance()));
    }

    #[test]
    fn empty_running_stats_report_missing_moments() {
        let stats = RunningStats::new();
        assert!(stats.mean().is_nan());
        assert!(stats.variance().is_nan());
        assert_eq!(stats.merge(RunningStats::new()).count(), 0);
    }

    #[test]
    fn standard_normal_cdf_matches_reference_values() {
        let normal = NormalDistribution::new(0.0, 1.0);
        assert!(f64_approx_equal(normal.cdf(0.0), 0.5));
        assert!((normal.cdf(1.96) - 0.975002).abs() < 1e-5);
        assert!((normal.cdf(-1.0) - 0.158655).abs() < 1e-5);
    }

    #[test]
    fn p_value_at_the_mean_is_one() {
        let normal = NormalDistribution::new(0.3, 0.1);
        assert!(f64_approx_equal(normal.two_tailed_p_value(0.3), 1.0));
    }

    #[test]
    fn p_value_is_symmetric_around_the_mean() {
        let normal = NormalDistribution::new(0.0, 0.2);
        let below = normal.two_tailed_p_value(-0.3);
        let above = normal.two_tailed_p_value(0.3);
        assert!(f64_approx_equal(below, above));
        assert!((below - 0.133614).abs() < 1e-4);
    }

    #[test]
    fn far_tail_p_values_keep_their_precision() {
        let normal = NormalDistribution::new(0.0, 1.0);
        let expected = 1.523_970_604_832_105_4e-23;
        let below = normal.two_tailed_p_value(-10.0);
        let above = normal.two_tailed_p_value(10.0);

        assert!(((below - expected) / expected).abs() < 1e-6, "p was {}", below);
        assert!(((above - expected) / expected).abs() < 1e-6, "p was {}", above);
    }

    #[test]
    fn extreme_scores_keep_a_positive_p_value() {
        let normal = NormalDistribution::new(0.0, 0.02);
        let p = normal.two_tailed_p_value(-0.3);
        assert!(p > 0.0 && p < 1e-49, "p was {}", p);
    }

    #[test]
    fn upper_tail_complements_cdf() {
        let normal = NormalDistribution::new(1.0, 0.5);
        assert!(f64_approx_equal(normal.sf(1.7), 1.0 - normal.cdf(1.7)));
        assert_eq!(NormalDistribution::new(0.0, 0.0).sf(-1.0), 1.0);
    }

    #[test]
    fn degenerate_distribution_gives_step_p_values() {
        let normal = NormalDistribution::new(0.0, 0.0);
        assert_eq!(normal.two_tailed_p_value(0.0), 1.0);
        assert_eq!(normal.two_tailed_p_value(0.25), 0.0);
        assert_eq!(normal.two_tailed_p_value(-0.25), 0.0);
    }

    #[test]
    fn missing_score_has_missing_p_value() {
        let normal = NormalDistribution::new(0.0, 1.0);
        assert!(normal.two_tailed_p_value(f64::NAN).is_nan());
    }
}
