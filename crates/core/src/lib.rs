//! Core types and settings shared by the analysis engine, storage adapters
//! and report renderers.

pub mod config;
pub mod config_loader;
pub mod series;

pub use config::{
    AnalysisSettings, BootstrapSettings, ConfigError, DEFAULT_MAX_SAFE_METRICS,
    DEFAULT_MIN_BASELINE_DAYS, DEFAULT_MIN_DATA_POINTS, DEFAULT_MIN_INTERVENTION_DAYS,
    SETTINGS_KEYS,
};
pub use config_loader::{SettingsStore, DEFAULT_SETTINGS_PATH, ENV_PREFIX};
pub use series::{group_observations, MetricSeries, Observation, Sample, SeriesError};
