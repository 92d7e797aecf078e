//! Runs the single-metric pipeline over several metrics.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use n1_core::MetricSeries;

use crate::engine::AnalysisEngine;
use crate::error::EngineError;
use crate::types::{MetricReport, MultiMetricResult};
use crate::validity::multiple_comparison_warning;

impl AnalysisEngine {
    /// Analyses every series in `series`, keyed by metric name.
    ///
    /// A failure in one metric is recorded under its key and the remaining
    /// metrics still run. Comparing more than `max_safe_metrics` metrics adds
    /// one global warning.
    #[must_use]
    pub fn analyze_many(
        &self,
        series: &BTreeMap<String, MetricSeries>,
        start_date: NaiveDate,
        baseline_days: u32,
        intervention_days: u32,
    ) -> MultiMetricResult {
        let results: BTreeMap<String, MetricReport> = series
            .iter()
            .map(|(name, s)| {
                let outcome =
                    self.analyze_one(name, s, start_date, baseline_days, intervention_days);
                let report = match outcome {
                    Ok(report) => report,
                    Err(e) => {
                        tracing::error!(metric = %name, "analysis failed: {}", e);
                        MetricReport::Failed { error: e.to_string() }
                    }
                };
                (name.clone(), report)
            })
            .collect();

        let global_warnings: Vec<String> =
            multiple_comparison_warning(series.len(), self.settings().max_safe_metrics)
                .into_iter()
                .inspect(|w| tracing::warn!("{}", w))
                .collect();

        MultiMetricResult {
            results,
            global_warnings,
        }
    }

    fn analyze_one(
        &self,
        name: &str,
        series: &MetricSeries,
        start_date: NaiveDate,
        baseline_days: u32,
        intervention_days: u32,
    ) -> Result<MetricReport, EngineError> {
        if series.metric != name {
            return Err(EngineError::MislabeledSeries {
                key: name.to_string(),
                tagged: series.metric.clone(),
            });
        }
        self.analyze(series, start_date, baseline_days, intervention_days)
            .map(MetricReport::Analyzed)
    }
}
