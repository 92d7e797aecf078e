#![allow(clippy::format_push_string)]

use anyhow::{Context, Result};
use n1_analysis::{AnalysisResult, Window};
use std::fs;
use std::path::Path;

use crate::format::{interval, p_value, stat, trend};

const STYLE: &str = "\
body { font-family: sans-serif; margin: 20px; }
h1, h2, h3 { color: #333; }
.section { margin-bottom: 20px; padding: 15px; border: 1px solid #ddd; border-radius: 5px; }
.warning { color: #d9534f; font-weight: bold; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f2f2f2; }
";

/// Escapes text for use in HTML element content and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Standalone HTML page for one intervention and metric.
pub struct HtmlReport;

impl HtmlReport {
    #[must_use]
    pub fn render(intervention: &str, metric: &str, result: &AnalysisResult) -> String {
        let intervention = escape(intervention);
        let metric = escape(metric);

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>Analysis Report: {intervention}</title>\n"));
        html.push_str(&format!("<style>\n{STYLE}</style>\n"));
        html.push_str("</head>\n<body>\n");
        html.push_str("<h1>Analysis Report</h1>\n");
        html.push_str(&format!("<h2>Intervention: {intervention}</h2>\n"));
        html.push_str(&format!("<h3>Metric: {metric}</h3>\n"));

        match result {
            AnalysisResult::InsufficientData {
                error,
                baseline_count,
                intervention_count,
            } => {
                html.push_str("<div class=\"section\">\n<h3>Insufficient Data</h3>\n");
                html.push_str(&format!("<p class=\"warning\">{}</p>\n", escape(error)));
                html.push_str(&format!("<p><b>Baseline points:</b> {baseline_count}</p>\n"));
                html.push_str(&format!(
                    "<p><b>Intervention points:</b> {intervention_count}</p>\n"
                ));
                html.push_str("</div>\n");
            }
            AnalysisResult::Complete {
                baseline_window,
                intervention_window,
                analysis,
                warnings,
            } => {
                html.push_str("<div class=\"section\">\n<h3>Overview</h3>\n");
                html.push_str(&format!(
                    "<p><b>Mean Difference:</b> {}</p>\n",
                    stat(Some(analysis.mean_difference))
                ));
                html.push_str(&format!(
                    "<p><b>Cohen's d:</b> {}</p>\n",
                    stat(Some(analysis.cohens_d))
                ));
                html.push_str(&format!(
                    "<p><b>Bootstrap CI:</b> {}</p>\n",
                    interval(analysis.bootstrap_ci.as_ref())
                ));
                html.push_str("</div>\n");

                html.push_str("<div class=\"section\">\n<h3>Statistical Tests</h3>\n<table>\n");
                html.push_str("<tr><th>Test</th><th>Statistic</th><th>p-value</th></tr>\n");
                html.push_str(&format!(
                    "<tr><td>Welch's t-test</td><td>{}</td><td>{}</td></tr>\n",
                    stat(analysis.t_test.statistic),
                    p_value(analysis.t_test.p_value)
                ));
                html.push_str(&format!(
                    "<tr><td>Mann-Whitney U</td><td>{}</td><td>{}</td></tr>\n",
                    stat(analysis.mann_whitney_u.statistic),
                    p_value(analysis.mann_whitney_u.p_value)
                ));
                html.push_str("</table>\n</div>\n");

                html.push_str("<div class=\"section\">\n<h3>Windows</h3>\n<table>\n");
                html.push_str(
                    "<tr><th>Period</th><th>Dates</th><th>Count</th><th>Mean</th>\
                     <th>Std Dev</th><th>Trend (Slope, p)</th></tr>\n",
                );
                html.push_str(&window_row("Baseline", baseline_window));
                html.push_str(&window_row("Intervention", intervention_window));
                html.push_str("</table>\n</div>\n");

                if !warnings.is_empty() {
                    html.push_str("<div class=\"section\">\n<h3>Warnings</h3>\n<ul>\n");
                    for warning in warnings {
                        html.push_str(&format!("<li class=\"warning\">{}</li>\n", escape(warning)));
                    }
                    html.push_str("</ul>\n</div>\n");
                }
            }
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    /// Renders and writes the page to `path`.
    ///
    /// # Errors
    /// Returns error if the file cannot be written
    pub fn write(
        path: impl AsRef<Path>,
        intervention: &str,
        metric: &str,
        result: &AnalysisResult,
    ) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, Self::render(intervention, metric, result))
            .with_context(|| format!("Failed to write HTML report: {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote HTML report");
        Ok(())
    }
}

fn window_row(label: &str, window: &Window) -> String {
    format!(
        "<tr><td>{label}</td><td>{} to {}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        window.start,
        window.end,
        window.count,
        stat(Some(window.mean)),
        stat(Some(window.std)),
        trend(window.trend.as_ref())
    )
}
