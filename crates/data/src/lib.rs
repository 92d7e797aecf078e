//! File storage for metric observations, interventions and events.
//!
//! This crate provides:
//! - Record types for metric entries, interventions and events
//! - CSV import and export
//! - Period summaries over stored records

pub mod csv_storage;
pub mod models;
pub mod summary;

pub use csv_storage::{parse_date, parse_datetime, CsvStorage};
pub use models::{Event, ImportSummary, Intervention, MetricEntry, SEVERITY_RANGE};
pub use summary::PeriodSummary;
