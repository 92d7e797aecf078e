//! Options shared by the analysis commands.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;

use n1_analysis::AnalysisEngine;
use n1_core::{BootstrapSettings, Observation, SettingsStore, DEFAULT_SETTINGS_PATH};
use n1_data::{parse_date, CsvStorage};

/// Data source, anchor date and window options.
#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    /// Metrics CSV file (date,metric_name,value)
    #[arg(long)]
    pub data: PathBuf,

    /// Intervention start date (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["interventions", "intervention"])]
    pub start: Option<String>,

    /// Interventions CSV file (name,start_date,...)
    #[arg(long, requires = "intervention")]
    pub interventions: Option<PathBuf>,

    /// Name of the intervention whose start date anchors the windows
    #[arg(long, requires = "interventions")]
    pub intervention: Option<String>,

    /// Days before the start date in the baseline window
    #[arg(long, default_value = "14")]
    pub baseline_days: u32,

    /// Days from the start date in the intervention window
    #[arg(long, default_value = "14")]
    pub intervention_days: u32,

    /// Settings document (thresholds)
    #[arg(long, env = "N1_SETTINGS", default_value = DEFAULT_SETTINGS_PATH)]
    pub settings: PathBuf,

    /// Bootstrap resample count
    #[arg(long, default_value = "1000")]
    pub resamples: usize,

    /// Bootstrap confidence level
    #[arg(long, default_value = "0.95")]
    pub confidence: f64,

    /// Seed for reproducible bootstrap intervals
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format: text, json, html (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    /// Parses an output format from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "html" | "htm" => Ok(OutputFormat::Html),
            _ => Err(anyhow!(
                "Unknown format: '{}'. Valid formats: text, json, html",
                s
            )),
        }
    }
}

/// The anchor date and the label reports use for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub start_date: NaiveDate,
    pub label: String,
}

impl WindowArgs {
    /// Resolves `--start`, or the named intervention's start date.
    pub fn anchor(&self) -> Result<Anchor> {
        if let Some(start) = &self.start {
            let start_date = parse_date(start).context("Invalid --start")?;
            return Ok(Anchor {
                start_date,
                label: format!("Change on {start_date}"),
            });
        }

        let (Some(path), Some(name)) = (&self.interventions, &self.intervention) else {
            bail!("Either --start or --interventions with --intervention is required");
        };

        let interventions = CsvStorage::read_interventions(path)?;
        let found = interventions
            .iter()
            .find(|i| i.name == name.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = interventions.iter().map(|i| i.name.as_str()).collect();
                anyhow!(
                    "Intervention '{}' not found in {} (known: {})",
                    name,
                    path.display(),
                    known.join(", ")
                )
            })?;

        Ok(Anchor {
            start_date: found.start_date,
            label: found.name.clone(),
        })
    }

    /// Engine configured from the settings document and bootstrap flags.
    pub fn engine(&self) -> Result<AnalysisEngine> {
        let settings = SettingsStore::new(&self.settings).load();
        let mut bootstrap = BootstrapSettings::new(self.resamples, self.confidence);
        if let Some(seed) = self.seed {
            bootstrap = bootstrap.with_seed(seed);
        }
        tracing::debug!(?settings, ?bootstrap, "engine configuration");
        Ok(AnalysisEngine::new(settings, bootstrap)?)
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::parse(&self.format)
    }

    /// All rows of the metrics file as observations.
    pub fn observations(&self) -> Result<Vec<Observation>> {
        let entries = CsvStorage::read_metrics(&self.data)?;
        Ok(entries.iter().map(|e| e.to_observation()).collect())
    }

    /// Writes `report` to `--output`, or prints it.
    pub fn emit(&self, report: &str) -> Result<()> {
        match &self.output {
            Some(path) => {
                std::fs::write(path, report)
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
                tracing::info!(path = %path.display(), "report written");
            }
            None => println!("{report}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(dir: &TempDir) -> WindowArgs {
        WindowArgs {
            data: dir.path().join("metrics.csv"),
            start: None,
            interventions: None,
            intervention: None,
            baseline_days: 14,
            intervention_days: 14,
            settings: dir.path().join("settings.json"),
            resamples: 100,
            confidence: 0.95,
            seed: Some(1),
            format: "text".to_string(),
            output: None,
        }
    }

    #[test]
    fn parses_output_formats() {
        assert_eq!(OutputFormat::parse("TEXT").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("htm").unwrap(), OutputFormat::Html);
        assert!(OutputFormat::parse("pdf").is_err());
    }

    #[test]
    fn start_flag_sets_anchor() {
        let dir = TempDir::new().unwrap();
        let mut a = args(&dir);
        a.start = Some("2023-10-01".to_string());

        let anchor = a.anchor().unwrap();
        assert_eq!(anchor.start_date, NaiveDate::from_ymd_opt(2023, 10, 1).unwrap());
    }

    #[test]
    fn intervention_name_sets_anchor() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("interventions.csv");
        let rows = "name,start_date\nMagnesium,2023-10-01\nFasting,2023-11-05\n";
        std::fs::write(&path, rows).unwrap();
        let mut a = args(&dir);
        a.interventions = Some(path);
        a.intervention = Some("Fasting".to_string());

        let anchor = a.anchor().unwrap();
        assert_eq!(anchor.start_date, NaiveDate::from_ymd_opt(2023, 11, 5).unwrap());
        assert_eq!(anchor.label, "Fasting");

        a.intervention = Some("Yoga".to_string());
        let err = a.anchor().unwrap_err();
        assert!(err.to_string().contains("known: Magnesium, Fasting"), "error was {err}");
    }

    #[test]
    fn missing_anchor_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(args(&dir).anchor().is_err());
    }

    #[test]
    fn engine_reads_settings_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("settings.json"), r#"{"min_data_points": 5}"#).unwrap();

        let engine = args(&dir).engine().unwrap();
        assert_eq!(engine.settings().min_data_points, 5);
        assert_eq!(engine.bootstrap().seed, Some(1));
    }
}
