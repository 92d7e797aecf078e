//! Cell formatting shared by the renderers.
//!
//! Means, standard deviations, effect sizes and interval bounds use two
//! decimals; p-values and slopes use four. Anything absent is `N/A`.

use n1_analysis::{BootstrapCi, TrendResult};

pub const NOT_AVAILABLE: &str = "N/A";

/// `value` with `decimals` places, or `N/A` when absent or non-finite.
#[must_use]
pub fn fixed(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[must_use]
pub fn stat(value: Option<f64>) -> String {
    fixed(value, 2)
}

#[must_use]
pub fn p_value(value: Option<f64>) -> String {
    fixed(value, 4)
}

/// `slope (p=...)`, or `N/A` without a trend.
#[must_use]
pub fn trend(trend: Option<&TrendResult>) -> String {
    match trend {
        Some(t) => format!("{} (p={})", fixed(Some(t.slope), 4), p_value(t.p_value)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `[lower, upper]`, or `N/A` when not computed.
#[must_use]
pub fn interval(ci: Option<&BootstrapCi>) -> String {
    match ci {
        Some(ci) => format!("[{}, {}]", stat(Some(ci.lower)), stat(Some(ci.upper))),
        None => NOT_AVAILABLE.to_string(),
    }
}
