//! Errors raised to the caller.
//!
//! Numerical edge cases never surface here: insufficient data is a result
//! shape and failed tests become warnings. These variants cover caller
//! mistakes only.

use n1_core::{ConfigError, SeriesError};
use thiserror::Error;

/// Errors that abort an engine call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The series violates its single-metric invariant.
    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),

    /// Threshold settings outside their accepted ranges.
    #[error("invalid settings: {0}")]
    Settings(#[from] ConfigError),

    /// Window sizes must be at least one day and stay within the calendar.
    #[error("invalid window: baseline_days={baseline_days}, intervention_days={intervention_days}")]
    InvalidWindow {
        /// Requested baseline length.
        baseline_days: u32,
        /// Requested intervention length.
        intervention_days: u32,
    },

    /// Bootstrap confidence level outside (0, 1).
    #[error("invalid bootstrap confidence level: {0}")]
    InvalidConfidence(f64),

    /// A multi-metric entry whose series is tagged with another metric name.
    #[error("series for '{key}' is tagged as '{tagged}'")]
    MislabeledSeries {
        /// Map key the series was supplied under.
        key: String,
        /// Metric name carried by the series.
        tagged: String,
    },
}

/// Reasons a single hypothesis test could not be computed.
///
/// These are caught by the test runner and turned into warnings.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TestFailure {
    /// A group is too small for the test.
    #[error("need at least {required} observations per group, got {got}")]
    TooFewObservations {
        /// Minimum group size.
        required: usize,
        /// Smallest group size supplied.
        got: usize,
    },

    /// Statistic or degrees of freedom came out non-finite.
    #[error("non-finite {0}")]
    NonFinite(&'static str),

    /// The reference distribution could not be constructed.
    #[error("distribution error: {0}")]
    Distribution(String),
}
