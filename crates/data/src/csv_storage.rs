use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::{Reader, ReaderBuilder, StringRecord, Trim, Writer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::models::{Event, ImportSummary, Intervention, MetricEntry};

const METRIC_COLUMNS: [&str; 3] = ["date", "metric_name", "value"];
const INTERVENTION_COLUMNS: [&str; 2] = ["name", "start_date"];
const EVENT_COLUMNS: [&str; 2] = ["timestamp", "event_name"];

#[derive(Debug, Deserialize)]
struct MetricRow {
    date: String,
    metric_name: String,
    value: Option<f64>,
}

#[derive(Debug, Serialize)]
struct MetricRowOut<'a> {
    date: String,
    metric_name: &'a str,
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct InterventionRow {
    name: String,
    start_date: String,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    dosage: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct InterventionRowOut<'a> {
    name: &'a str,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    dosage: Option<&'a str>,
    notes: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EventRow {
    timestamp: String,
    event_name: String,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct EventRowOut<'a> {
    timestamp: String,
    event_name: &'a str,
    severity: Option<u8>,
    notes: Option<&'a str>,
}

pub struct CsvStorage;

impl CsvStorage {
    /// Reads metric entries from a CSV file.
    ///
    /// Format: date,metric_name,value (extra columns are ignored)
    ///
    /// # Errors
    /// Returns error if the file cannot be opened, a required column is
    /// missing, or a date or value cell cannot be parsed
    pub fn read_metrics(path: impl AsRef<Path>) -> Result<Vec<MetricEntry>> {
        let path = path.as_ref();
        let mut reader = open_reader(path)?;
        require_columns(reader.headers()?, &METRIC_COLUMNS, path)?;

        let mut entries = Vec::new();
        for (line, row) in reader.deserialize::<MetricRow>().enumerate() {
            let row = row
                .with_context(|| format!("Invalid metric row {} in {}", line + 1, path.display()))?;
            let date = parse_datetime(&row.date)
                .with_context(|| format!("Invalid date in metric row {}", line + 1))?;
            entries.push(MetricEntry::new(
                date,
                row.metric_name.trim(),
                row.value.filter(|v| v.is_finite()),
            ));
        }

        let summary = ImportSummary::from_entries(&entries);
        tracing::info!(
            path = %path.display(),
            imported = summary.imported,
            skipped = summary.skipped,
            "imported metric entries"
        );
        Ok(entries)
    }

    /// Writes metric entries sorted by date, then metric name.
    ///
    /// Format: date,metric_name,value
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_metrics(path: impl AsRef<Path>, entries: &[MetricEntry]) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        let mut sorted: Vec<&MetricEntry> = entries.iter().collect();
        sorted.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.metric_name.cmp(&b.metric_name))
        });

        for entry in sorted {
            writer.serialize(MetricRowOut {
                date: format_datetime(entry.date),
                metric_name: &entry.metric_name,
                value: entry.value,
            })?;
        }

        writer.flush()?;
        tracing::info!(path = %path.display(), rows = entries.len(), "exported metric entries");
        Ok(())
    }

    /// Reads interventions from a CSV file.
    ///
    /// Format: name,start_date[,end_date][,dosage][,notes]
    ///
    /// # Errors
    /// Returns error if the file cannot be opened, `name` or `start_date` is
    /// missing, or a date cannot be parsed
    pub fn read_interventions(path: impl AsRef<Path>) -> Result<Vec<Intervention>> {
        let path = path.as_ref();
        let mut reader = open_reader(path)?;
        require_columns(reader.headers()?, &INTERVENTION_COLUMNS, path)?;

        let mut interventions = Vec::new();
        for (line, row) in reader.deserialize::<InterventionRow>().enumerate() {
            let row = row.with_context(|| {
                format!("Invalid intervention row {} in {}", line + 1, path.display())
            })?;
            let start_date = parse_date(&row.start_date)
                .with_context(|| format!("Invalid start_date in intervention row {}", line + 1))?;
            let end_date = non_empty(row.end_date)
                .map(|d| parse_date(&d))
                .transpose()
                .with_context(|| format!("Invalid end_date in intervention row {}", line + 1))?;

            interventions.push(Intervention {
                name: row.name.trim().to_string(),
                start_date,
                end_date,
                dosage: non_empty(row.dosage),
                notes: non_empty(row.notes),
            });
        }

        tracing::info!(
            path = %path.display(),
            count = interventions.len(),
            "imported interventions"
        );
        Ok(interventions)
    }

    /// Writes interventions sorted by start date.
    ///
    /// Format: name,start_date,end_date,dosage,notes
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_interventions(
        path: impl AsRef<Path>,
        interventions: &[Intervention],
    ) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        let mut sorted: Vec<&Intervention> = interventions.iter().collect();
        sorted.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.name.cmp(&b.name))
        });

        for intervention in sorted {
            writer.serialize(InterventionRowOut {
                name: &intervention.name,
                start_date: intervention.start_date,
                end_date: intervention.end_date,
                dosage: intervention.dosage.as_deref(),
                notes: intervention.notes.as_deref(),
            })?;
        }

        writer.flush()?;
        tracing::info!(
            path = %path.display(),
            rows = interventions.len(),
            "exported interventions"
        );
        Ok(())
    }

    /// Reads events from a CSV file.
    ///
    /// Format: timestamp,event_name[,severity][,notes]
    ///
    /// # Errors
    /// Returns error if the file cannot be opened, a required column is
    /// missing, a timestamp cannot be parsed, or a severity is not a whole
    /// number from 1 to 5
    pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<Event>> {
        let path = path.as_ref();
        let mut reader = open_reader(path)?;
        require_columns(reader.headers()?, &EVENT_COLUMNS, path)?;

        let mut events = Vec::new();
        for (line, row) in reader.deserialize::<EventRow>().enumerate() {
            let row = row
                .with_context(|| format!("Invalid event row {} in {}", line + 1, path.display()))?;
            let timestamp = parse_datetime(&row.timestamp)
                .with_context(|| format!("Invalid timestamp in event row {}", line + 1))?;

            let mut event = Event::new(timestamp, row.event_name.trim());
            if let Some(raw) = non_empty(row.severity) {
                let severity = parse_severity(&raw)
                    .with_context(|| format!("Invalid severity in event row {}", line + 1))?;
                event = event
                    .with_severity(severity)
                    .with_context(|| format!("Invalid severity in event row {}", line + 1))?;
            }
            event.notes = non_empty(row.notes);
            events.push(event);
        }

        tracing::info!(path = %path.display(), count = events.len(), "imported events");
        Ok(events)
    }

    /// Writes events sorted by timestamp.
    ///
    /// Format: timestamp,event_name,severity,notes
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_events(path: impl AsRef<Path>, events: &[Event]) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        let mut sorted: Vec<&Event> = events.iter().collect();
        sorted.sort_by_key(|e| e.timestamp);

        for event in sorted {
            writer.serialize(EventRowOut {
                timestamp: format_datetime(event.timestamp),
                event_name: &event.event_name,
                severity: event.severity,
                notes: event.notes.as_deref(),
            })?;
        }

        writer.flush()?;
        tracing::info!(path = %path.display(), rows = events.len(), "exported events");
        Ok(())
    }
}

/// Whole-number severity; spreadsheets often export `3` as `3.0`.
fn parse_severity(raw: &str) -> Result<u8> {
    let value: f64 = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a number"))?;
    if value.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&value) {
        bail!("'{raw}' is not a whole number from 1 to 5");
    }
    Ok(value as u8)
}

fn open_reader(path: &Path) -> Result<Reader<File>> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))
}

fn require_columns(headers: &StringRecord, required: &[&str], path: &Path) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        bail!(
            "CSV {} must contain columns: {} (missing: {})",
            path.display(),
            required.join(", "),
            missing.join(", ")
        );
    }
    Ok(())
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parses `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or
/// RFC 3339. Offsets are dropped after conversion to UTC.
///
/// # Errors
/// Returns error if none of the formats match
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(at);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.naive_utc())
        .with_context(|| format!("Unrecognised date '{raw}'"))
}

/// Calendar date of any format accepted by [`parse_datetime`].
///
/// # Errors
/// Returns error if none of the formats match
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    parse_datetime(raw).map(|at| at.date())
}

/// Midnight writes as a plain date.
fn format_datetime(at: NaiveDateTime) -> String {
    if at.time() == NaiveTime::MIN {
        at.format("%Y-%m-%d").to_string()
    } else {
        at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
