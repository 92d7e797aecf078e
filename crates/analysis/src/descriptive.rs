//! Count, mean and sample standard deviation of a window.

use serde::{Deserialize, Serialize};

/// Summary statistics of one group of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Descriptive {
    pub count: usize,
    pub mean: f64,
    /// Unbiased (n - 1) standard deviation, `0.0` below two values.
    pub std: f64,
    /// Every value is identical.
    pub constant: bool,
}

impl Descriptive {
    /// Summarises `values`. Returns `None` for an empty slice.
    ///
    /// A constant group reports its value as the mean and exactly zero
    /// spread, so equality checks between constant groups are exact.
    #[must_use]
    pub fn of(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        let count = values.len();

        if is_constant(values) {
            return Some(Self {
                count,
                // adding 0.0 maps -0.0 to 0.0
                mean: first + 0.0,
                std: 0.0,
                constant: true,
            });
        }

        Some(Self {
            count,
            mean: mean(values),
            std: sample_std(values),
            constant: false,
        })
    }

    #[must_use]
    pub fn variance(&self) -> f64 {
        self.std * self.std
    }
}

/// Arithmetic mean; NaN for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance. `0.0` when fewer than two values.
#[must_use]
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Unbiased sample standard deviation. `0.0` when fewer than two values.
#[must_use]
pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// True if every value equals the first. Vacuously true when empty.
/// `0.0` and `-0.0` count as equal.
#[must_use]
pub fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std_match_hand_computation() {
        let d = Descriptive::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();

        assert_eq!(d.count, 8);
        assert!((d.mean - 5.0).abs() < 1e-12);
        // population std is 2, sample std is sqrt(32/7)
        assert!((d.std - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12, "std was {}", d.std);
        assert!(!d.constant);
    }

    #[test]
    fn single_value_has_zero_std() {
        let d = Descriptive::of(&[42.0]).unwrap();

        assert_eq!(d.count, 1);
        assert!((d.std - 0.0).abs() < f64::EPSILON);
        assert!(!d.std.is_nan());
    }

    #[test]
    fn constant_group_is_exact() {
        let d = Descriptive::of(&[0.1, 0.1, 0.1]).unwrap();

        assert!(d.constant);
        assert_eq!(d.mean.to_bits(), 0.1_f64.to_bits());
        assert_eq!(d.std.to_bits(), 0.0_f64.to_bits());
    }

    #[test]
    fn signed_zeros_are_one_constant_value() {
        let d = Descriptive::of(&[-0.0, 0.0, -0.0]).unwrap();

        assert!(d.constant);
        assert_eq!(d.mean.to_bits(), 0.0_f64.to_bits(), "mean was {}", d.mean);
        assert!(is_constant(&[0.0, -0.0]));
    }

    #[test]
    fn empty_group_has_no_summary() {
        assert!(Descriptive::of(&[]).is_none());
    }

    #[test]
    fn sample_variance_below_two_values_is_zero() {
        assert!((sample_variance(&[3.0]) - 0.0).abs() < f64::EPSILON);
        assert!((sample_variance(&[1.0, 3.0]) - 2.0).abs() < 1e-12);
    }
}
