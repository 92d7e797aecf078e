//! Analysis settings.
//!
//! The four validity thresholds are plain values handed to the engine at
//! construction time. They are persisted as a flat JSON document by
//! [`crate::config_loader::SettingsStore`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MIN_BASELINE_DAYS: u32 = 7;
pub const DEFAULT_MIN_INTERVENTION_DAYS: u32 = 7;
pub const DEFAULT_MIN_DATA_POINTS: u32 = 3;
pub const DEFAULT_MAX_SAFE_METRICS: u32 = 3;

/// Names of the persisted settings keys, in document order.
pub const SETTINGS_KEYS: [&str; 4] = [
    "min_baseline_days",
    "min_intervention_days",
    "min_data_points",
    "max_safe_metrics",
];

/// Inclusive ranges accepted for each key.
const SETTINGS_RANGES: [(&str, u32, u32); 4] = [
    ("min_baseline_days", 1, 90),
    ("min_intervention_days", 1, 90),
    ("min_data_points", 2, 20),
    ("max_safe_metrics", 1, 20),
];

/// Errors raised when building or editing settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A key that is not one of [`SETTINGS_KEYS`].
    #[error("unknown setting: '{0}'")]
    UnknownKey(String),

    /// A value outside the accepted range for its key.
    #[error("setting '{key}' = {value} is out of range ({min}..={max})")]
    OutOfRange {
        /// Offending key.
        key: &'static str,
        /// Supplied value.
        value: u32,
        /// Inclusive lower bound.
        min: u32,
        /// Inclusive upper bound.
        max: u32,
    },
}

/// Thresholds used by the validity checker and the multi-metric coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Baseline calendar span below which a duration warning is emitted.
    pub min_baseline_days: u32,
    /// Intervention calendar span below which a duration warning is emitted.
    pub min_intervention_days: u32,
    /// Hard gate: fewer points than this in either window aborts the analysis.
    pub min_data_points: u32,
    /// Number of simultaneously compared metrics above which a
    /// multiple-comparison warning is emitted.
    pub max_safe_metrics: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            min_baseline_days: DEFAULT_MIN_BASELINE_DAYS,
            min_intervention_days: DEFAULT_MIN_INTERVENTION_DAYS,
            min_data_points: DEFAULT_MIN_DATA_POINTS,
            max_safe_metrics: DEFAULT_MAX_SAFE_METRICS,
        }
    }
}

impl AnalysisSettings {
    /// Accepted inclusive range for a key.
    fn range_for(key: &str) -> Option<(&'static str, u32, u32)> {
        SETTINGS_RANGES.iter().copied().find(|(name, _, _)| *name == key)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<u32> {
        match key {
            "min_baseline_days" => Some(self.min_baseline_days),
            "min_intervention_days" => Some(self.min_intervention_days),
            "min_data_points" => Some(self.min_data_points),
            "max_safe_metrics" => Some(self.max_safe_metrics),
            _ => None,
        }
    }

    /// Overrides a single named setting.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownKey`] for a key outside [`SETTINGS_KEYS`]
    /// and [`ConfigError::OutOfRange`] when the value is not accepted.
    pub fn set(&mut self, key: &str, value: u32) -> Result<(), ConfigError> {
        let Some((name, min, max)) = Self::range_for(key) else {
            tracing::warn!("Attempted to set an unknown setting: '{}'", key);
            return Err(ConfigError::UnknownKey(key.to_string()));
        };
        if !(min..=max).contains(&value) {
            return Err(ConfigError::OutOfRange {
                key: name,
                value,
                min,
                max,
            });
        }

        match name {
            "min_baseline_days" => self.min_baseline_days = value,
            "min_intervention_days" => self.min_intervention_days = value,
            "min_data_points" => self.min_data_points = value,
            _ => self.max_safe_metrics = value,
        }
        Ok(())
    }

    /// Checks every key against its accepted range.
    ///
    /// # Errors
    /// Returns the first [`ConfigError::OutOfRange`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, min, max) in SETTINGS_RANGES {
            let value = self.get(name).unwrap_or_default();
            if !(min..=max).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    key: name,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Resampling parameters for the bootstrap confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSettings {
    /// Number of bootstrap resamples. Directly bounds worst-case latency.
    pub resamples: usize,
    /// Confidence level of the percentile interval (0.95 gives 2.5/97.5).
    pub confidence_level: f64,
    /// Seed for reproducible intervals; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            resamples: 1000,
            confidence_level: 0.95,
            seed: None,
        }
    }
}

impl BootstrapSettings {
    /// Creates settings with the given resample count and confidence level.
    #[must_use]
    pub fn new(resamples: usize, confidence_level: f64) -> Self {
        Self {
            resamples,
            confidence_level,
            seed: None,
        }
    }

    /// Sets a seed for reproducible resampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
