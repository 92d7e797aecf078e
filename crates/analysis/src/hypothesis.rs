//! Two-sample hypothesis tests between the intervention and baseline windows.
//!
//! Provides:
//! - Welch's t-test (unequal variances, Welch–Satterthwaite degrees of freedom)
//! - Mann-Whitney U test (two-sided, exact for small untied samples)
//!
//! [`run_hypothesis_tests`] wraps both so that a failure in one test becomes
//! a warning and never stops the other.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::descriptive::{is_constant, mean, sample_variance};
use crate::error::TestFailure;
use crate::types::TestResult;

/// Largest size of the smaller group for which the exact U distribution is used.
pub const MANN_WHITNEY_EXACT_MAX: usize = 8;

/// Both tests plus any warnings raised while running them.
#[derive(Debug, Clone, PartialEq)]
pub struct HypothesisOutcome {
    pub t_test: TestResult,
    pub mann_whitney_u: TestResult,
    pub warnings: Vec<String>,
}

/// Runs Welch's t-test and the Mann-Whitney U test with `intervention` as the
/// first group.
///
/// When both groups are constant the t-test is not attempted: equal values
/// give `statistic = 0, p = 1`; different values leave both fields undefined
/// and add a warning, since the test is mathematically undefined there.
#[must_use]
pub fn run_hypothesis_tests(baseline: &[f64], intervention: &[f64]) -> HypothesisOutcome {
    let mut warnings = Vec::new();

    let both_constant = !baseline.is_empty()
        && !intervention.is_empty()
        && is_constant(baseline)
        && is_constant(intervention);

    let t_test = if both_constant {
        if baseline[0] == intervention[0] {
            TestResult::new(0.0, 1.0)
        } else {
            warnings.push(
                "T-test undefined: both windows have zero variance with different means"
                    .to_string(),
            );
            TestResult::undefined()
        }
    } else {
        match welch_t_test(intervention, baseline) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("t-test failed: {}", e);
                warnings.push(format!("T-test failed: {e}"));
                TestResult::undefined()
            }
        }
    };

    let mann_whitney_u = match mann_whitney_u(intervention, baseline) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Mann-Whitney U test failed: {}", e);
            warnings.push(format!("Mann-Whitney U test failed: {e}"));
            TestResult::undefined()
        }
    };

    HypothesisOutcome {
        t_test,
        mann_whitney_u,
        warnings,
    }
}

/// Welch's two-sample t-test, two-sided.
///
/// The statistic is positive when `first` has the larger mean.
///
/// # Errors
/// Returns [`TestFailure`] if either group has fewer than two values, if the
/// standard error is zero, or if the t distribution cannot be built.
pub fn welch_t_test(first: &[f64], second: &[f64]) -> Result<TestResult, TestFailure> {
    let smallest = first.len().min(second.len());
    if smallest < 2 {
        return Err(TestFailure::TooFewObservations {
            required: 2,
            got: smallest,
        });
    }

    let n1 = first.len() as f64;
    let n2 = second.len() as f64;
    let v1 = sample_variance(first) / n1;
    let v2 = sample_variance(second) / n2;

    let std_error = (v1 + v2).sqrt();
    let t_stat = (mean(first) - mean(second)) / std_error;
    if !t_stat.is_finite() {
        return Err(TestFailure::NonFinite("t statistic"));
    }

    let df = (v1 + v2).powi(2) / (v1.powi(2) / (n1 - 1.0) + v2.powi(2) / (n2 - 1.0));
    if !df.is_finite() {
        return Err(TestFailure::NonFinite("degrees of freedom"));
    }

    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| TestFailure::Distribution(e.to_string()))?;
    let p_value = (2.0 * dist.cdf(-t_stat.abs())).clamp(0.0, 1.0);

    tracing::debug!(t_stat, df, p_value, "welch t-test");
    Ok(TestResult::new(t_stat, p_value))
}

/// Mann-Whitney U test, two-sided.
///
/// Reports U for `first`. Uses the exact null distribution when there are no
/// ties and either group has at most [`MANN_WHITNEY_EXACT_MAX`] values,
/// otherwise the normal approximation with tie and continuity corrections.
///
/// # Errors
/// Returns [`TestFailure::TooFewObservations`] if either group is empty.
pub fn mann_whitney_u(first: &[f64], second: &[f64]) -> Result<TestResult, TestFailure> {
    let smallest = first.len().min(second.len());
    if smallest == 0 {
        return Err(TestFailure::TooFewObservations {
            required: 1,
            got: 0,
        });
    }

    let n1 = first.len();
    let n2 = second.len();
    let combined: Vec<f64> = first.iter().chain(second.iter()).copied().collect();
    let ranks = calculate_ranks(&combined);

    let rank_sum: f64 = ranks[..n1].iter().sum();
    let u1 = rank_sum - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u_max = u1.max(u2);

    let tie_term = tie_correction(&combined);
    let exact = n1.min(n2) <= MANN_WHITNEY_EXACT_MAX && tie_term == 0.0;
    let p_value = if exact {
        (2.0 * exact_u_sf(u_max, n1, n2)).min(1.0)
    } else {
        asymptotic_p_value(u_max, n1, n2, tie_term)?
    };

    tracing::debug!(u1, p_value, "mann-whitney u");
    Ok(TestResult::new(u1, p_value))
}

/// Normal approximation of the two-sided p-value.
fn asymptotic_p_value(
    u_max: f64,
    n1: usize,
    n2: usize,
    tie_term: f64,
) -> Result<f64, TestFailure> {
    let n = (n1 + n2) as f64;
    let product = (n1 * n2) as f64;
    let mu = product / 2.0;
    let variance = product / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));

    if variance <= 0.0 {
        // Every value identical: no evidence of a shift.
        return Ok(1.0);
    }

    let z = (u_max - mu - 0.5) / variance.sqrt();
    let normal = Normal::new(0.0, 1.0).map_err(|e| TestFailure::Distribution(e.to_string()))?;
    Ok((2.0 * normal.cdf(-z)).clamp(0.0, 1.0))
}

/// Sum of `t³ - t` over groups of tied values.
fn tie_correction(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut total = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && (sorted[j] - sorted[i]).abs() < f64::EPSILON {
            j += 1;
        }
        let t = (j - i) as f64;
        total += t * t * t - t;
        i = j;
    }
    total
}

/// `P(U >= u)` under the null for untied samples of sizes `n1` and `n2`.
fn exact_u_sf(u: f64, n1: usize, n2: usize) -> f64 {
    let (small, large) = (n1.min(n2), n1.max(n2));
    let max_u = small * large;

    // counts[i][k]: orderings of i small-group values among the large-group
    // values added so far whose U statistic equals k.
    let mut counts = vec![vec![0.0_f64; max_u + 1]; small + 1];
    for row in &mut counts {
        row[0] = 1.0;
    }
    for j in 1..=large {
        for i in 1..=small {
            for k in (j..=i * j).rev() {
                counts[i][k] += counts[i - 1][k - j];
            }
        }
    }

    let dist = &counts[small];
    let total: f64 = dist.iter().sum();
    let threshold = u.ceil() as usize;
    let tail: f64 = dist.iter().skip(threshold).sum();
    tail / total
}

/// Calculates ranks for a slice of values, handling ties with average rank.
///
/// # Arguments
/// * `values` - Slice of values to rank
///
/// # Returns
/// Vector of ranks (1-based, with ties averaged)
pub fn calculate_ranks(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return vec![];
    }

    let n = values.len();
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();

    // Sort by value, keeping original indices
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; n];

    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && (indexed[j].1 - indexed[i].1).abs() < f64::EPSILON {
            j += 1;
        }

        // Positions i..j share ranks (i+1)..=j
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for item in &indexed[i..j] {
            ranks[item.0] = avg_rank;
        }

        i = j;
    }

    ranks
}
