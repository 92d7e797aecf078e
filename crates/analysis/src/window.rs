//! Baseline / intervention window selection.
//!
//! Both windows are half-open: baseline covers
//! `[start - baseline_days, start)` and intervention covers
//! `[start, start + intervention_days)`, so they never overlap.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use n1_core::{MetricSeries, Sample};

use crate::error::EngineError;

/// The two slices of a series around an anchor date.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSelection {
    pub baseline_start: NaiveDate,
    /// Intervention start; also the exclusive end of the baseline.
    pub start_date: NaiveDate,
    pub intervention_end: NaiveDate,
    pub baseline_days: u32,
    pub intervention_days: u32,
    /// Present baseline samples, sorted by time.
    pub baseline: Vec<Sample>,
    /// Present intervention samples, sorted by time.
    pub intervention: Vec<Sample>,
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Splits `series` into baseline and intervention windows around `start_date`.
///
/// Missing values are dropped before filtering and the input may be unsorted.
///
/// # Errors
/// Returns [`EngineError::InvalidWindow`] when either length is zero or the
/// window leaves the representable calendar.
pub fn select_windows(
    series: &MetricSeries,
    start_date: NaiveDate,
    baseline_days: u32,
    intervention_days: u32,
) -> Result<WindowSelection, EngineError> {
    let invalid = || EngineError::InvalidWindow {
        baseline_days,
        intervention_days,
    };
    if baseline_days == 0 || intervention_days == 0 {
        return Err(invalid());
    }

    let baseline_start = start_date
        .checked_sub_days(Days::new(u64::from(baseline_days)))
        .ok_or_else(invalid)?;
    let intervention_end = start_date
        .checked_add_days(Days::new(u64::from(intervention_days)))
        .ok_or_else(invalid)?;

    let (b_from, split, i_to) = (
        midnight(baseline_start),
        midnight(start_date),
        midnight(intervention_end),
    );

    let present = series.present_samples();
    let baseline: Vec<Sample> = present
        .iter()
        .filter(|s| s.at >= b_from && s.at < split)
        .copied()
        .collect();
    let intervention: Vec<Sample> = present
        .iter()
        .filter(|s| s.at >= split && s.at < i_to)
        .copied()
        .collect();

    tracing::debug!(
        metric = %series.metric,
        %baseline_start,
        %start_date,
        %intervention_end,
        baseline = baseline.len(),
        intervention = intervention.len(),
        "selected windows"
    );

    Ok(WindowSelection {
        baseline_start,
        start_date,
        intervention_end,
        baseline_days,
        intervention_days,
        baseline,
        intervention,
    })
}

/// Calendar span of a window in days, counting both the first and last day.
///
/// Uses calendar-day boundaries, so two samples on the same day span one day
/// regardless of their times. `None` for an empty window.
#[must_use]
pub fn calendar_span_days(samples: &[Sample]) -> Option<i64> {
    let first = samples.iter().map(Sample::date).min()?;
    let last = samples.iter().map(Sample::date).max()?;
    Some((last - first).num_days() + 1)
}
