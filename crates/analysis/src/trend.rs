//! Ordinary least-squares trend within a window.
//!
//! Regresses value on elapsed days since the window start and tests the
//! slope against zero with a two-sided t-test on `n - 2` degrees of freedom.

use chrono::{NaiveDate, NaiveTime};
use n1_core::Sample;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::descriptive::is_constant;
use crate::types::TrendResult;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Estimates the linear trend of `samples` measured from `origin`.
///
/// Returns `None` with fewer than two distinct time points. A window whose
/// values are all identical is exactly flat: slope `0` and p-value `1`.
/// With exactly two points the slope is known but its p-value is not.
/// Values too large for the least-squares sums give no trend.
#[must_use]
pub fn calculate_trend(samples: &[Sample], origin: NaiveDate) -> Option<TrendResult> {
    let origin = origin.and_time(NaiveTime::MIN);
    let (xs, ys): (Vec<f64>, Vec<f64>) = samples
        .iter()
        .filter_map(|s| {
            let value = s.present_value()?;
            let elapsed = (s.at - origin).num_seconds() as f64 / SECONDS_PER_DAY;
            Some((elapsed, value))
        })
        .unzip();

    if is_constant(&xs) {
        tracing::debug!(points = xs.len(), "trend undefined: fewer than 2 time points");
        return None;
    }

    if is_constant(&ys) {
        return Some(TrendResult {
            slope: 0.0,
            p_value: Some(1.0),
        });
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    let slope = sxy / sxx;
    if !slope.is_finite() {
        tracing::debug!("trend undefined: non-finite slope");
        return None;
    }
    let p_value = slope_p_value(slope, sxx, syy - slope * sxy, xs.len());

    Some(TrendResult { slope, p_value })
}

/// Two-sided p-value of an OLS slope given the residual sum of squares.
fn slope_p_value(slope: f64, sxx: f64, ssr: f64, n: usize) -> Option<f64> {
    if n < 3 {
        return None;
    }
    if !ssr.is_finite() {
        tracing::debug!(ssr, "trend p-value unavailable: non-finite residuals");
        return None;
    }
    let df = (n - 2) as f64;
    let std_error = (ssr.max(0.0) / df / sxx).sqrt();
    if !std_error.is_finite() {
        return None;
    }

    if std_error <= f64::EPSILON * slope.abs() {
        // Perfect fit of a non-flat line.
        return Some(0.0);
    }

    let t_stat = slope / std_error;
    if !t_stat.is_finite() {
        return None;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => Some((2.0 * dist.cdf(-t_stat.abs())).clamp(0.0, 1.0)),
        Err(e) => {
            tracing::debug!("trend p-value unavailable: {}", e);
            None
        }
    }
}
