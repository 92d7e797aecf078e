//! Multi-metric comparison command.

use anyhow::{bail, Result};
use clap::Args;
use std::collections::BTreeMap;

use n1_core::group_observations;
use n1_report::{to_json, TextReport};

use super::options::{OutputFormat, WindowArgs};

/// Arguments for the compare command.
#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Metrics to compare; repeat the flag for several (default: all)
    #[arg(long = "metric")]
    pub metrics: Vec<String>,

    #[command(flatten)]
    pub window: WindowArgs,
}

/// Runs the compare command.
pub fn run_compare(args: CompareArgs) -> Result<()> {
    let format = args.window.output_format()?;
    if format == OutputFormat::Html {
        bail!("HTML reports cover a single metric; use `n1 analyze --format html`");
    }
    let anchor = args.window.anchor()?;
    let engine = args.window.engine()?;

    let mut grouped = group_observations(&args.window.observations()?);
    if !args.metrics.is_empty() {
        let missing: Vec<&str> = args
            .metrics
            .iter()
            .filter(|m| !grouped.contains_key(m.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            bail!("No entries for metric(s): {}", missing.join(", "));
        }
        grouped = grouped
            .into_iter()
            .filter(|(name, _)| args.metrics.contains(name))
            .collect::<BTreeMap<_, _>>();
    }
    if grouped.is_empty() {
        bail!("No metric entries in {}", args.window.data.display());
    }

    tracing::info!(metrics = grouped.len(), start = %anchor.start_date, "comparing");
    let result = engine.analyze_many(
        &grouped,
        anchor.start_date,
        args.window.baseline_days,
        args.window.intervention_days,
    );

    let report = match format {
        OutputFormat::Json => to_json(&result)?,
        _ => TextReport::render_multi(&anchor.label, &result),
    };
    args.window.emit(&report)
}
