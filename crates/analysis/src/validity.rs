//! Non-fatal checks on whether a comparison is trustworthy.
//!
//! The only hard stop is [`ValidityChecker::gate`]; everything else produces
//! warning strings that travel with the result.

use n1_core::{AnalysisSettings, Sample};

use crate::descriptive::Descriptive;
use crate::window::{calendar_span_days, WindowSelection};

/// Error message of the insufficient-data result shape.
#[must_use]
pub fn insufficient_data_message(min_data_points: u32) -> String {
    format!("Insufficient data points (minimum {min_data_points} required)")
}

/// Counts that failed the minimum-data gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsufficientData {
    pub error: String,
    pub baseline_count: usize,
    pub intervention_count: usize,
}

/// Applies the configured thresholds to a window selection.
#[derive(Debug, Clone, Copy)]
pub struct ValidityChecker {
    settings: AnalysisSettings,
}

impl ValidityChecker {
    #[must_use]
    pub fn new(settings: AnalysisSettings) -> Self {
        Self { settings }
    }

    /// Hard gate: both windows need at least `min_data_points` samples.
    ///
    /// # Errors
    /// Returns the counts and message when either window is short.
    pub fn gate(&self, selection: &WindowSelection) -> Result<(), InsufficientData> {
        let minimum = self.settings.min_data_points as usize;
        let baseline_count = selection.baseline.len();
        let intervention_count = selection.intervention.len();

        if baseline_count < minimum || intervention_count < minimum {
            return Err(InsufficientData {
                error: insufficient_data_message(self.settings.min_data_points),
                baseline_count,
                intervention_count,
            });
        }
        Ok(())
    }

    /// Warnings about window spans, power and variance.
    #[must_use]
    pub fn warnings(
        &self,
        selection: &WindowSelection,
        baseline: &Descriptive,
        intervention: &Descriptive,
    ) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(w) = span_warning(
            "baseline",
            &selection.baseline,
            self.settings.min_baseline_days,
        ) {
            warnings.push(w);
        }
        if let Some(w) = span_warning(
            "intervention",
            &selection.intervention,
            self.settings.min_intervention_days,
        ) {
            warnings.push(w);
        }

        if selection.intervention_days < selection.baseline_days {
            warnings.push(format!(
                "Reduced statistical power: intervention window ({} days) \
                 is shorter than baseline window ({} days)",
                selection.intervention_days, selection.baseline_days
            ));
        }

        if baseline.constant && intervention.constant {
            warnings.push(
                "Zero variance in both baseline and intervention windows; \
                 effect size and t-test are degenerate"
                    .to_string(),
            );
        }

        warnings
    }
}

/// Warning when a non-empty window spans fewer calendar days than `minimum`.
fn span_warning(label: &str, samples: &[Sample], minimum: u32) -> Option<String> {
    let span = calendar_span_days(samples)?;
    (span < i64::from(minimum)).then(|| {
        format!("Insufficient {label} duration: {span} days (recommended >= {minimum})")
    })
}

/// Global warning when more metrics are compared than `max_safe_metrics`.
#[must_use]
pub fn multiple_comparison_warning(metric_count: usize, max_safe_metrics: u32) -> Option<String> {
    (metric_count > max_safe_metrics as usize).then(|| {
        format!(
            "Comparing {metric_count} metrics simultaneously (more than {max_safe_metrics}) \
             inflates the false discovery risk; \
             consider a multiple-comparison correction (e.g. Bonferroni)"
        )
    })
}
