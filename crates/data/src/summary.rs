//! Everything recorded over a date range.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Event, Intervention, MetricEntry};

/// Interventions active in `from..=to` plus the metrics and events logged
/// in it, each sorted by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub interventions: Vec<Intervention>,
    pub metrics: Vec<MetricEntry>,
    pub events: Vec<Event>,
}

impl PeriodSummary {
    /// Collects the records that fall in `from..=to`.
    ///
    /// # Errors
    /// Returns error if `from` is after `to`
    pub fn collect(
        from: NaiveDate,
        to: NaiveDate,
        interventions: &[Intervention],
        metrics: &[MetricEntry],
        events: &[Event],
    ) -> Result<Self> {
        if from > to {
            bail!("Start date {from} is after end date {to}");
        }
        let in_range = |date: NaiveDate| from <= date && date <= to;

        let mut interventions: Vec<Intervention> = interventions
            .iter()
            .filter(|i| i.is_active_between(from, to))
            .cloned()
            .collect();
        interventions.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut metrics: Vec<MetricEntry> = metrics
            .iter()
            .filter(|m| in_range(m.date.date()))
            .cloned()
            .collect();
        metrics.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.metric_name.cmp(&b.metric_name))
        });

        let mut events: Vec<Event> = events
            .iter()
            .filter(|e| in_range(e.timestamp.date()))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.timestamp);

        tracing::debug!(
            %from,
            %to,
            interventions = interventions.len(),
            metrics = metrics.len(),
            events = events.len(),
            "collected period summary"
        );
        Ok(Self {
            from,
            to,
            interventions,
            metrics,
            events,
        })
    }

    /// Nothing was recorded in the period.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interventions.is_empty() && self.metrics.is_empty() && self.events.is_empty()
    }
}
