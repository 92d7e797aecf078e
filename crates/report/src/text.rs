#![allow(clippy::format_push_string)]

use n1_analysis::{AnalysisResult, MetricReport, MultiMetricResult, Window};

use crate::format::{interval, p_value, stat, trend};

pub(crate) const RULE: &str =
    "═══════════════════════════════════════════════════════════════\n";
pub(crate) const THIN_RULE: &str =
    "───────────────────────────────────────────────────────────────\n";

/// Plain-text report for terminals and logs.
pub struct TextReport;

impl TextReport {
    /// Renders one metric's result under `title`.
    #[must_use]
    pub fn render(title: &str, metric: &str, result: &AnalysisResult) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str(&format!("  {title}\n"));
        output.push_str(&format!("  Metric: {metric}\n"));
        output.push_str(RULE);
        output.push('\n');

        Self::push_result(&mut output, result);
        output
    }

    /// Renders every metric of a multi-metric comparison, global warnings first.
    #[must_use]
    pub fn render_multi(title: &str, result: &MultiMetricResult) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str(&format!("  {title}\n"));
        output.push_str(&format!("  Metrics compared: {}\n", result.results.len()));
        output.push_str(RULE);

        if !result.global_warnings.is_empty() {
            output.push('\n');
            output.push_str("Global Warnings\n");
            output.push_str(THIN_RULE);
            for warning in &result.global_warnings {
                output.push_str(&format!("! {warning}\n"));
            }
        }

        for (metric, report) in &result.results {
            output.push('\n');
            output.push_str(&format!("### {metric}\n"));
            output.push('\n');
            match report {
                MetricReport::Analyzed(analysis) => Self::push_result(&mut output, analysis),
                MetricReport::Failed { error } => {
                    output.push_str(&format!("Analysis failed: {error}\n"));
                }
            }
        }

        output
    }

    fn push_result(output: &mut String, result: &AnalysisResult) {
        match result {
            AnalysisResult::InsufficientData {
                error,
                baseline_count,
                intervention_count,
            } => {
                output.push_str(&format!("Error: {error}\n"));
                output.push_str(&format!("Baseline points:       {baseline_count}\n"));
                output.push_str(&format!("Intervention points:   {intervention_count}\n"));
            }
            AnalysisResult::Complete {
                baseline_window,
                intervention_window,
                analysis,
                warnings,
            } => {
                output.push_str("Windows\n");
                output.push_str(THIN_RULE);
                Self::push_window(output, "Baseline", baseline_window);
                Self::push_window(output, "Intervention", intervention_window);
                output.push('\n');

                output.push_str("Effect\n");
                output.push_str(THIN_RULE);
                output.push_str(&format!(
                    "Mean Difference:       {}\n",
                    stat(Some(analysis.mean_difference))
                ));
                output.push_str(&format!(
                    "Cohen's d:             {}\n",
                    stat(Some(analysis.cohens_d))
                ));
                output.push_str(&format!(
                    "Bootstrap CI:          {}\n",
                    interval(analysis.bootstrap_ci.as_ref())
                ));
                output.push('\n');

                output.push_str("Statistical Tests\n");
                output.push_str(THIN_RULE);
                output.push_str(&format!(
                    "Welch's t-test:        t = {}, p = {}\n",
                    stat(analysis.t_test.statistic),
                    p_value(analysis.t_test.p_value)
                ));
                output.push_str(&format!(
                    "Mann-Whitney U:        U = {}, p = {}\n",
                    stat(analysis.mann_whitney_u.statistic),
                    p_value(analysis.mann_whitney_u.p_value)
                ));

                if !warnings.is_empty() {
                    output.push('\n');
                    output.push_str("Warnings\n");
                    output.push_str(THIN_RULE);
                    for warning in warnings {
                        output.push_str(&format!("! {warning}\n"));
                    }
                }
            }
        }
    }

    fn push_window(output: &mut String, label: &str, window: &Window) {
        output.push_str(&format!(
            "{:<14} {} to {} (exclusive)  n={}  mean={}  std={}  trend={}\n",
            label,
            window.start,
            window.end,
            window.count,
            stat(Some(window.mean)),
            stat(Some(window.std)),
            trend(window.trend.as_ref())
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use n1_analysis::{Analysis, TestResult, TrendResult};
    use std::collections::BTreeMap;

    fn window(start: u32, end: u32, mean: f64) -> Window {
        Window {
            start: NaiveDate::from_ymd_opt(2023, 9, start).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 9, end).unwrap(),
            samples: vec![],
            count: 7,
            mean,
            std: 0.0,
            trend: Some(TrendResult {
                slope: 0.0,
                p_value: Some(1.0),
            }),
        }
    }

    fn constant_unequal() -> AnalysisResult {
        AnalysisResult::Complete {
            baseline_window: window(1, 8, 50.0),
            intervention_window: window(8, 15, 55.0),
            analysis: Analysis {
                mean_difference: 5.0,
                cohens_d: 0.0,
                t_test: TestResult::undefined(),
                mann_whitney_u: TestResult::new(49.0, 0.0006),
                bootstrap_ci: None,
            },
            warnings: vec!["Zero variance in both windows".to_string()],
        }
    }

    #[test]
    fn undefined_statistics_render_as_not_available() {
        let text = TextReport::render("Magnesium", "sleep", &constant_unequal());

        assert!(text.contains("t = N/A, p = N/A"), "report was:\n{text}");
        assert!(text.contains("U = 49.00, p = 0.0006"));
        assert!(text.contains("Bootstrap CI:          N/A"));
        assert!(text.contains("Cohen's d:             0.00"));
        assert!(text.contains("! Zero variance in both windows"));
        assert!(text.contains("2023-09-01 to 2023-09-08"));
    }

    #[test]
    fn error_shape_renders_counts() {
        let result = AnalysisResult::InsufficientData {
            error: "Insufficient data points (minimum 3 required)".to_string(),
            baseline_count: 2,
            intervention_count: 0,
        };

        let text = TextReport::render("Magnesium", "sleep", &result);

        assert!(text.contains("Error: Insufficient data points (minimum 3 required)"));
        assert!(text.contains("Baseline points:       2"));
        assert!(text.contains("Intervention points:   0"));
        assert!(!text.contains("Statistical Tests"));
    }

    #[test]
    fn multi_report_lists_global_warnings_and_failures() {
        let mut results = BTreeMap::new();
        results.insert("mood".to_string(), MetricReport::Analyzed(constant_unequal()));
        results.insert(
            "energy".to_string(),
            MetricReport::Failed {
                error: "series for 'energy' is tagged as 'focus'".to_string(),
            },
        );
        let multi = MultiMetricResult {
            results,
            global_warnings: vec!["Comparing 4 metrics simultaneously".to_string()],
        };

        let text = TextReport::render_multi("Magnesium", &multi);

        assert!(text.contains("Metrics compared: 2"));
        assert!(text.contains("! Comparing 4 metrics simultaneously"));
        assert!(text.contains("Analysis failed: series for 'energy'"));
        let energy = text.find("### energy").unwrap();
        let mood = text.find("### mood").unwrap();
        assert!(energy < mood, "metrics should be listed by name");
    }
}
