//! Bootstrap confidence interval on the difference of window means.
//!
//! Each iteration draws a same-size sample with replacement from each group
//! independently and records `mean(intervention*) - mean(baseline*)`. The
//! interval is read off the sorted distribution at the `(1 - level) / 2` and
//! `(1 + level) / 2` percentiles.
//!
//! # Example
//!
//! ```
//! use n1_analysis::bootstrap::BootstrapResampler;
//! use n1_core::BootstrapSettings;
//!
//! let resampler = BootstrapResampler::new(BootstrapSettings::new(500, 0.95).with_seed(7));
//! let ci = resampler
//!     .mean_difference_ci(&[10.0, 11.0, 9.0, 10.5], &[15.0, 14.0, 16.0, 15.5])
//!     .unwrap();
//! assert!(ci.lower > 0.0 && ci.lower <= ci.upper);
//! ```

use n1_core::BootstrapSettings;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::descriptive::mean;
use crate::types::BootstrapCi;

/// Bootstrap resampler for the two-group mean difference.
#[derive(Debug, Clone)]
pub struct BootstrapResampler {
    config: BootstrapSettings,
}

impl BootstrapResampler {
    /// Creates a new resampler with the given configuration.
    #[must_use]
    pub fn new(config: BootstrapSettings) -> Self {
        Self { config }
    }

    /// Returns a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &BootstrapSettings {
        &self.config
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Mean of a resample of `values` drawn with replacement.
    fn resampled_mean(values: &[f64], rng: &mut ChaCha8Rng) -> f64 {
        let n = values.len();
        let total: f64 = (0..n).map(|_| values[rng.gen_range(0..n)]).sum();
        total / n as f64
    }

    /// Sorted bootstrap distribution of `mean(intervention) - mean(baseline)`.
    ///
    /// Empty when either group is empty.
    #[must_use]
    pub fn mean_difference_distribution(&self, baseline: &[f64], intervention: &[f64]) -> Vec<f64> {
        if baseline.is_empty() || intervention.is_empty() {
            return Vec::new();
        }

        let mut rng = self.rng();
        let mut distribution: Vec<f64> = Vec::with_capacity(self.config.resamples);
        for _ in 0..self.config.resamples {
            let b = Self::resampled_mean(baseline, &mut rng);
            let i = Self::resampled_mean(intervention, &mut rng);
            distribution.push(i - b);
        }

        distribution.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        distribution
    }

    /// Percentile interval on the mean difference.
    ///
    /// Returns `None` if either group is empty or no resamples are configured.
    #[must_use]
    pub fn mean_difference_ci(
        &self,
        baseline: &[f64],
        intervention: &[f64],
    ) -> Option<BootstrapCi> {
        let distribution = self.mean_difference_distribution(baseline, intervention);
        if distribution.is_empty() {
            return None;
        }

        let (lower, upper) = percentile_ci(&distribution, self.config.confidence_level);
        tracing::debug!(
            resamples = distribution.len(),
            point_estimate = mean(intervention) - mean(baseline),
            lower,
            upper,
            "bootstrap interval"
        );
        Some(BootstrapCi { lower, upper })
    }
}

/// Linearly interpolated percentile of a sorted slice, `q` in `[0, 100]`.
#[must_use]
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (q / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Extracts percentile confidence interval from a sorted distribution.
///
/// # Arguments
/// * `distribution` - Sorted vector of bootstrap statistics
/// * `confidence_level` - Desired confidence level (e.g., 0.95)
///
/// # Returns
/// Tuple of (lower_bound, upper_bound)
#[must_use]
pub fn percentile_ci(distribution: &[f64], confidence_level: f64) -> (f64, f64) {
    let alpha = 1.0 - confidence_level;
    let lower = percentile(distribution, 100.0 * alpha / 2.0);
    let upper = percentile(distribution, 100.0 * (1.0 - alpha / 2.0));
    (lower, upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Uniform noise around `mean` with standard deviation `std`.
    fn noisy_sample(mean: f64, std: f64, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let half_width = std * 3.0_f64.sqrt();
        (0..n).map(|_| mean + rng.gen_range(-half_width..half_width)).collect()
    }

    fn seeded(resamples: usize) -> BootstrapResampler {
        BootstrapResampler::new(BootstrapSettings::new(resamples, 0.95).with_seed(42))
    }

    // ============================================================
    // Percentiles
    // ============================================================

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];

        assert!((percentile(&sorted, 0.0) - 1.0).abs() < f64::EPSILON);
        assert!((percentile(&sorted, 50.0) - 3.0).abs() < f64::EPSILON);
        assert!((percentile(&sorted, 100.0) - 5.0).abs() < f64::EPSILON);
        assert!((percentile(&sorted, 2.5) - 1.1).abs() < 1e-12);
        assert!((percentile(&sorted, 97.5) - 4.9).abs() < 1e-12);
    }

    #[test]
    fn percentile_ci_single_element() {
        let (lower, upper) = percentile_ci(&[3.0], 0.95);
        assert!((lower - 3.0).abs() < f64::EPSILON);
        assert!((upper - 3.0).abs() < f64::EPSILON);
    }

    // ============================================================
    // Resampling
    // ============================================================

    #[test]
    fn separated_groups_give_positive_interval() {
        let g1 = noisy_sample(10.0, 1.0, 100, 1);
        let g2 = noisy_sample(15.0, 1.0, 100, 2);

        let ci = seeded(100).mean_difference_ci(&g1, &g2).unwrap();

        assert!(ci.lower > 0.0, "lower was {}", ci.lower);
        assert!(ci.upper > ci.lower);
        assert!(ci.lower > 4.0 && ci.upper < 6.0, "ci was {ci:?}");
    }

    #[test]
    fn same_seed_is_reproducible() {
        let g1 = noisy_sample(10.0, 2.0, 30, 3);
        let g2 = noisy_sample(11.0, 2.0, 30, 4);

        let first = seeded(200).mean_difference_ci(&g1, &g2);
        let second = seeded(200).mean_difference_ci(&g1, &g2);

        assert_eq!(first, second);
    }

    #[test]
    fn distribution_has_configured_size() {
        let distribution = seeded(250).mean_difference_distribution(&[1.0, 2.0], &[3.0, 4.0]);

        assert_eq!(distribution.len(), 250);
        assert!(distribution.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn empty_group_has_no_interval() {
        assert!(seeded(100).mean_difference_ci(&[], &[1.0, 2.0]).is_none());
        assert!(seeded(100).mean_difference_ci(&[1.0, 2.0], &[]).is_none());
    }

    #[test]
    fn zero_resamples_has_no_interval() {
        let resampler = BootstrapResampler::new(BootstrapSettings::new(0, 0.95).with_seed(1));
        assert!(resampler.mean_difference_ci(&[1.0], &[2.0]).is_none());
    }

    #[test]
    fn constant_groups_give_degenerate_interval() {
        let ci = seeded(100).mean_difference_ci(&[50.0; 7], &[55.0; 7]).unwrap();

        assert!((ci.lower - 5.0).abs() < 1e-12);
        assert!((ci.upper - 5.0).abs() < 1e-12);
    }

    #[test]
    fn interval_converges_as_resamples_grow() {
        let g1 = noisy_sample(50.0, 2.0, 14, 5);
        let g2 = noisy_sample(55.0, 2.0, 14, 6);

        let coarse = seeded(4_000).mean_difference_ci(&g1, &g2).unwrap();
        let fine = seeded(16_000).mean_difference_ci(&g1, &g2).unwrap();

        assert!((coarse.lower - fine.lower).abs() < 0.25, "{coarse:?} vs {fine:?}");
        assert!((coarse.upper - fine.upper).abs() < 0.25, "{coarse:?} vs {fine:?}");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn lower_never_exceeds_upper(gap in -20.0_f64..20.0, seed in 0_u64..1_000) {
            let g1 = noisy_sample(0.0, 1.0, 12, seed);
            let g2: Vec<f64> = noisy_sample(0.0, 1.0, 12, seed + 1)
                .into_iter()
                .map(|v| v + gap)
                .collect();

            let ci = seeded(100).mean_difference_ci(&g1, &g2).unwrap();
            prop_assert!(ci.lower <= ci.upper);
        }

        #[test]
        fn large_gaps_exclude_zero_small_gaps_do_not(seed in 0_u64..1_000) {
            let g1 = noisy_sample(0.0, 1.0, 20, seed);
            let shifted = |gap: f64| -> Vec<f64> { g1.iter().map(|v| v + gap).collect() };

            let wide_gap = seeded(400).mean_difference_ci(&g1, &shifted(10.0)).unwrap();
            let no_gap = seeded(400).mean_difference_ci(&g1, &shifted(0.0)).unwrap();

            prop_assert!(wide_gap.excludes_zero());
            prop_assert!(!no_gap.excludes_zero());

            // A shift moves the interval without changing its width.
            let width = |ci: &BootstrapCi| ci.upper - ci.lower;
            prop_assert!((width(&wide_gap) - width(&no_gap)).abs() < 1e-9);
            prop_assert!((wide_gap.lower - no_gap.lower - 10.0).abs() < 1e-9);
        }
    }
}
