//! Cohen's d with a pooled standard deviation.

/// Pooled standard deviation of two groups.
///
/// `sqrt(((n1-1)·s1² + (n2-1)·s2²) / (n1+n2-2))`, or `0.0` when
/// `n1 + n2 <= 2`.
#[must_use]
pub fn pooled_std(n1: usize, std1: f64, n2: usize, std2: f64) -> f64 {
    if n1 + n2 <= 2 {
        return 0.0;
    }
    let dof = (n1 + n2 - 2) as f64;
    let weighted = (n1.saturating_sub(1)) as f64 * std1.powi(2)
        + (n2.saturating_sub(1)) as f64 * std2.powi(2);
    (weighted / dof).sqrt()
}

/// Standardised mean difference.
///
/// Zero spread gives `0.0` rather than an infinite or undefined value;
/// the validity checker reports the zero-variance case separately.
#[must_use]
pub fn cohens_d(mean_difference: f64, pooled_std: f64) -> f64 {
    if pooled_std == 0.0 {
        return 0.0;
    }
    mean_difference / pooled_std
}
