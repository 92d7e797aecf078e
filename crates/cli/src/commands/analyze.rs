//! Single-metric analysis command.

use anyhow::{bail, Result};
use clap::Args;

use n1_core::Observation;
use n1_report::{to_json, HtmlReport, TextReport};

use super::options::{OutputFormat, WindowArgs};

/// Arguments for the analyze command.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Metric to analyse
    #[arg(long)]
    pub metric: String,

    #[command(flatten)]
    pub window: WindowArgs,
}

/// Runs the analyze command.
pub fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let format = args.window.output_format()?;
    let anchor = args.window.anchor()?;
    let engine = args.window.engine()?;

    let observations: Vec<Observation> = args
        .window
        .observations()?
        .into_iter()
        .filter(|o| o.metric == args.metric)
        .collect();
    if observations.is_empty() {
        bail!(
            "No entries for metric '{}' in {}",
            args.metric,
            args.window.data.display()
        );
    }

    tracing::info!(
        metric = %args.metric,
        start = %anchor.start_date,
        baseline_days = args.window.baseline_days,
        intervention_days = args.window.intervention_days,
        "analysing"
    );
    let result = engine.analyze_observations(
        &observations,
        anchor.start_date,
        args.window.baseline_days,
        args.window.intervention_days,
    )?;

    let report = match format {
        OutputFormat::Text => TextReport::render(&anchor.label, &args.metric, &result),
        OutputFormat::Json => to_json(&result)?,
        OutputFormat::Html => HtmlReport::render(&anchor.label, &args.metric, &result),
    };
    args.window.emit(&report)
}
