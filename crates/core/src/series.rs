//! Metric time series.
//!
//! Storage hands the engine `(timestamp, value)` pairs for one metric.
//! Values may be absent; absent or non-finite values are dropped before any
//! computation and never imputed.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors raised when assembling a [`MetricSeries`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeriesError {
    /// Rows tagged with more than one metric identity.
    #[error("series mixes metric identities: {}", found.join(", "))]
    MixedMetrics {
        /// Distinct metric names found, sorted.
        found: Vec<String>,
    },

    /// No rows at all, so the metric identity is unknown.
    #[error("series has no observations")]
    Empty,
}

/// A single measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the value was recorded. Daily metrics use midnight.
    pub at: NaiveDateTime,
    /// Recorded value, `None` when missing.
    pub value: Option<f64>,
}

impl Sample {
    #[must_use]
    pub fn new(at: NaiveDateTime, value: Option<f64>) -> Self {
        Self { at, value }
    }

    /// Builds a sample recorded at midnight of `date`.
    #[must_use]
    pub fn daily(date: NaiveDate, value: f64) -> Self {
        Self::new(date.and_time(chrono::NaiveTime::MIN), Some(value))
    }

    /// Returns the value if it is present and finite.
    #[must_use]
    pub fn present_value(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }

    /// Calendar day of the sample.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.at.date()
    }
}

/// A storage row tagged with its metric identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub metric: String,
    pub at: NaiveDateTime,
    pub value: Option<f64>,
}

impl Observation {
    #[must_use]
    pub fn new(metric: impl Into<String>, at: NaiveDateTime, value: Option<f64>) -> Self {
        Self {
            metric: metric.into(),
            at,
            value,
        }
    }

    #[must_use]
    pub fn sample(&self) -> Sample {
        Sample::new(self.at, self.value)
    }
}

/// Samples for exactly one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub metric: String,
    pub samples: Vec<Sample>,
}

impl MetricSeries {
    pub fn new(metric: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            metric: metric.into(),
            samples,
        }
    }

    /// Builds a series from tagged rows, refusing rows from several metrics.
    ///
    /// # Errors
    /// Returns [`SeriesError::MixedMetrics`] when more than one metric name is
    /// present and [`SeriesError::Empty`] when there are no rows.
    pub fn from_observations(observations: &[Observation]) -> Result<Self, SeriesError> {
        let names: BTreeSet<&str> = observations.iter().map(|o| o.metric.as_str()).collect();

        match names.len() {
            0 => Err(SeriesError::Empty),
            1 => {
                let metric = observations[0].metric.clone();
                let samples = observations.iter().map(Observation::sample).collect();
                Ok(Self { metric, samples })
            }
            _ => Err(SeriesError::MixedMetrics {
                found: names.into_iter().map(str::to_string).collect(),
            }),
        }
    }

    /// Samples with a present value, sorted by timestamp.
    #[must_use]
    pub fn present_samples(&self) -> Vec<Sample> {
        let mut present: Vec<Sample> = self
            .samples
            .iter()
            .filter(|s| s.present_value().is_some())
            .copied()
            .collect();
        present.sort_by_key(|s| s.at);
        present
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Splits tagged rows into one series per metric name.
#[must_use]
pub fn group_observations(observations: &[Observation]) -> BTreeMap<String, MetricSeries> {
    let mut grouped: BTreeMap<String, MetricSeries> = BTreeMap::new();
    for observation in observations {
        grouped
            .entry(observation.metric.clone())
            .or_insert_with(|| MetricSeries::new(observation.metric.clone(), Vec::new()))
            .samples
            .push(observation.sample());
    }
    grouped
}
