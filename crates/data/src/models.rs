//! Records exchanged with CSV files.

use chrono::{NaiveDate, NaiveDateTime};
use n1_core::Observation;
use serde::{Deserialize, Serialize};

/// One measurement of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    /// When the measurement was taken. Date-only inputs land at midnight.
    pub date: NaiveDateTime,
    pub metric_name: String,
    /// `None` for an empty cell.
    pub value: Option<f64>,
}

impl MetricEntry {
    pub fn new(date: NaiveDateTime, metric_name: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            date,
            metric_name: metric_name.into(),
            value,
        }
    }

    /// The row as an engine observation.
    #[must_use]
    pub fn to_observation(&self) -> Observation {
        Observation::new(self.metric_name.clone(), self.date, self.value)
    }
}

/// A change whose effect is being tested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervention {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub dosage: Option<String>,
    pub notes: Option<String>,
}

impl Intervention {
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date,
            end_date: None,
            dosage: None,
            notes: None,
        }
    }

    /// Whether the intervention overlaps `from..=to`. Open-ended ones run
    /// indefinitely.
    #[must_use]
    pub fn is_active_between(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start_date <= to && self.end_date.map_or(true, |end| end >= from)
    }

    /// Days from start to end, counting both; `None` while ongoing.
    #[must_use]
    pub fn duration_days(&self) -> Option<i64> {
        self.end_date
            .map(|end| (end - self.start_date).num_days() + 1)
    }
}

/// Lowest and highest event severity.
pub const SEVERITY_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Something that happened, such as a headache or a late meal, logged
/// alongside the metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: NaiveDateTime,
    pub event_name: String,
    /// 1 (mild) to 5 (severe), when rated.
    pub severity: Option<u8>,
    pub notes: Option<String>,
}

impl Event {
    pub fn new(timestamp: NaiveDateTime, event_name: impl Into<String>) -> Self {
        Self {
            timestamp,
            event_name: event_name.into(),
            severity: None,
            notes: None,
        }
    }

    /// Sets the severity.
    ///
    /// # Errors
    /// Returns error if `severity` is outside 1..=5
    pub fn with_severity(mut self, severity: u8) -> anyhow::Result<Self> {
        if !SEVERITY_RANGE.contains(&severity) {
            anyhow::bail!(
                "Severity {} out of range ({}-{})",
                severity,
                SEVERITY_RANGE.start(),
                SEVERITY_RANGE.end()
            );
        }
        self.severity = Some(severity);
        Ok(self)
    }
}

/// Row counts from a metrics import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Rows carrying a value.
    pub imported: usize,
    /// Rows read with an empty value; kept as absent and ignored by the engine.
    pub skipped: usize,
}

impl ImportSummary {
    #[must_use]
    pub fn from_entries(entries: &[MetricEntry]) -> Self {
        let skipped = entries.iter().filter(|e| e.value.is_none()).count();
        Self {
            imported: entries.len() - skipped,
            skipped,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.imported + self.skipped
    }
}
