//! Result shapes produced by the engine.
//!
//! Field names are part of the reporting contract and serialize exactly as
//! `baseline_window`, `intervention_window`, `analysis.t_test.p_value` and so
//! on. Optional fields serialize as `null`, which renderers show as `N/A`.

use chrono::NaiveDate;
use n1_core::Sample;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Linear trend of value against elapsed days within a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Change in value per day.
    pub slope: f64,
    /// Two-sided p-value of the slope; `None` when there are too few points
    /// to estimate it.
    pub p_value: Option<f64>,
}

/// One side of the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// First day included.
    pub start: NaiveDate,
    /// First day excluded.
    pub end: NaiveDate,
    /// Present samples inside the window, sorted by time.
    #[serde(skip)]
    pub samples: Vec<Sample>,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); `0.0` when fewer than two points.
    pub std: f64,
    /// `None` when no trend can be estimated.
    pub trend: Option<TrendResult>,
}

impl Window {
    /// Values of the window's samples.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().filter_map(Sample::present_value).collect()
    }
}

/// Outcome of a hypothesis test. `None` means undefined, never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
}

impl TestResult {
    #[must_use]
    pub fn new(statistic: f64, p_value: f64) -> Self {
        Self {
            statistic: Some(statistic),
            p_value: Some(p_value),
        }
    }

    /// Both fields absent.
    #[must_use]
    pub fn undefined() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.statistic.is_some() && self.p_value.is_some()
    }

    /// Returns true if the p-value is defined and below `alpha`.
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value.is_some_and(|p| p < alpha)
    }
}

/// Percentile bootstrap interval on the mean difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapCi {
    pub lower: f64,
    pub upper: f64,
}

impl BootstrapCi {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Returns true if zero lies outside the interval.
    #[must_use]
    pub fn excludes_zero(&self) -> bool {
        self.lower > 0.0 || self.upper < 0.0
    }
}

/// Inferential statistics comparing the two windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Intervention mean minus baseline mean.
    pub mean_difference: f64,
    /// Pooled-standard-deviation effect size; `0.0` when the pooled
    /// standard deviation is zero.
    pub cohens_d: f64,
    pub t_test: TestResult,
    pub mann_whitney_u: TestResult,
    pub bootstrap_ci: Option<BootstrapCi>,
}

/// Result of a single-metric analysis: either too little data, or a full
/// comparison. The two shapes never mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    InsufficientData {
        error: String,
        baseline_count: usize,
        intervention_count: usize,
    },
    Complete {
        baseline_window: Window,
        intervention_window: Window,
        analysis: Analysis,
        warnings: Vec<String>,
    },
}

impl AnalysisResult {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Analysis block, if the comparison ran.
    #[must_use]
    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            Self::Complete { analysis, .. } => Some(analysis),
            Self::InsufficientData { .. } => None,
        }
    }

    /// Validity and computation warnings; empty for the error shape.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        match self {
            Self::Complete { warnings, .. } => warnings,
            Self::InsufficientData { .. } => &[],
        }
    }
}

/// Per-metric entry of a multi-metric run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricReport {
    Analyzed(AnalysisResult),
    /// The metric's analysis raised; siblings are unaffected.
    Failed { error: String },
}

impl MetricReport {
    #[must_use]
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Analyzed(result) => Some(result),
            Self::Failed { .. } => None,
        }
    }
}

/// Results for several metrics analysed against the same windows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiMetricResult {
    pub results: BTreeMap<String, MetricReport>,
    /// Warnings about the comparison as a whole, such as test multiplicity.
    pub global_warnings: Vec<String>,
}
