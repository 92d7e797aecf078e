//! Period summary command.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;

use n1_data::{parse_date, CsvStorage, Event, Intervention, MetricEntry, PeriodSummary};
use n1_report::{to_json, SummaryReport};

use super::options::OutputFormat;

/// Arguments for the summary command.
#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    /// Metrics CSV file (date,metric_name,value)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Interventions CSV file (name,start_date,...)
    #[arg(long)]
    pub interventions: Option<PathBuf>,

    /// Events CSV file (timestamp,event_name,...)
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// First day of the period (YYYY-MM-DD), default a week before --to
    #[arg(long, conflicts_with = "intervention")]
    pub from: Option<String>,

    /// Last day of the period (YYYY-MM-DD), default today
    #[arg(long, conflicts_with = "intervention")]
    pub to: Option<String>,

    /// Summarise the named intervention's period instead of a date range
    #[arg(long, requires = "interventions")]
    pub intervention: Option<String>,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Runs the summary command.
pub fn run_summary(args: SummaryArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    if format == OutputFormat::Html {
        bail!("Summaries are available as text or json");
    }
    let today = chrono::Local::now().date_naive();

    let interventions: Vec<Intervention> = match &args.interventions {
        Some(path) => CsvStorage::read_interventions(path)?,
        None => Vec::new(),
    };
    let metrics: Vec<MetricEntry> = match &args.data {
        Some(path) => CsvStorage::read_metrics(path)?,
        None => Vec::new(),
    };
    let events: Vec<Event> = match &args.events {
        Some(path) => CsvStorage::read_events(path)?,
        None => Vec::new(),
    };

    let (from, to) = period(&args, &interventions, today)?;
    let summary = PeriodSummary::collect(from, to, &interventions, &metrics, &events)?;

    let report = match format {
        OutputFormat::Json => to_json(&summary)?,
        _ => SummaryReport::render(args.intervention.as_deref(), &summary, today),
    };
    println!("{report}");
    Ok(())
}

/// The named intervention's start to its end (or today), else `--from..=--to`.
fn period(
    args: &SummaryArgs,
    interventions: &[Intervention],
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    if let Some(name) = &args.intervention {
        let found = interventions
            .iter()
            .find(|i| i.name == name.trim())
            .ok_or_else(|| anyhow!("Intervention '{}' not found", name))?;
        return Ok((found.start_date, found.end_date.unwrap_or(today)));
    }

    let to = match &args.to {
        Some(raw) => parse_date(raw).context("Invalid --to")?,
        None => today,
    };
    let from = match &args.from {
        Some(raw) => parse_date(raw).context("Invalid --from")?,
        None => to - chrono::Days::new(7),
    };
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, d).unwrap()
    }

    fn args() -> SummaryArgs {
        SummaryArgs {
            data: None,
            interventions: None,
            events: None,
            from: None,
            to: None,
            intervention: None,
            format: "text".to_string(),
        }
    }

    #[test]
    fn defaults_to_the_last_week() {
        assert_eq!(period(&args(), &[], day(15)).unwrap(), (day(8), day(15)));
    }

    #[test]
    fn explicit_range() {
        let mut a = args();
        a.from = Some("2023-10-02".to_string());
        a.to = Some("2023-10-04".to_string());

        assert_eq!(period(&a, &[], day(15)).unwrap(), (day(2), day(4)));
    }

    #[test]
    fn intervention_sets_the_range() {
        let mut magnesium = Intervention::new("Magnesium", day(1));
        magnesium.end_date = Some(day(10));
        let fasting = Intervention::new("Fasting", day(5));
        let known = [magnesium, fasting];
        let mut a = args();

        a.intervention = Some("Magnesium".to_string());
        assert_eq!(period(&a, &known, day(15)).unwrap(), (day(1), day(10)));

        a.intervention = Some("Fasting".to_string());
        assert_eq!(period(&a, &known, day(15)).unwrap(), (day(5), day(15)));

        a.intervention = Some("Yoga".to_string());
        assert!(period(&a, &known, day(15)).is_err());
    }
}
