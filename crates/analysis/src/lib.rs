//! Analysis engine for N-of-1 self-experiments.
//!
//! Compares a metric's baseline window with the window after an
//! intervention started: descriptive statistics, within-window trends,
//! Cohen's d, Welch's t-test, Mann-Whitney U, a bootstrap interval on the
//! mean difference and validity warnings.
//!
//! # Example
//!
//! ```
//! use chrono::{Days, NaiveDate};
//! use n1_analysis::AnalysisEngine;
//! use n1_core::{AnalysisSettings, BootstrapSettings, MetricSeries, Sample};
//!
//! let start = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
//! let samples = (0..28_u64)
//!     .map(|d| {
//!         let level = if d < 14 { 50.0 } else { 55.0 };
//!         let value = level + (d % 3) as f64;
//!         Sample::daily(start - Days::new(14) + Days::new(d), value)
//!     })
//!     .collect();
//! let series = MetricSeries::new("sleep_quality", samples);
//!
//! let engine = AnalysisEngine::new(
//!     AnalysisSettings::default(),
//!     BootstrapSettings::default().with_seed(1),
//! )
//! .unwrap();
//! let result = engine.analyze(&series, start, 14, 14).unwrap();
//! assert!(result.is_complete());
//! ```

pub mod bootstrap;
pub mod descriptive;
pub mod effect;
pub mod engine;
pub mod error;
pub mod hypothesis;
pub mod multi;
pub mod trend;
pub mod types;
pub mod validity;
pub mod window;

pub use bootstrap::BootstrapResampler;
pub use descriptive::Descriptive;
pub use engine::AnalysisEngine;
pub use error::{EngineError, TestFailure};
pub use hypothesis::{mann_whitney_u, run_hypothesis_tests, welch_t_test, HypothesisOutcome};
pub use trend::calculate_trend;
pub use types::{
    Analysis, AnalysisResult, BootstrapCi, MetricReport, MultiMetricResult, TestResult,
    TrendResult, Window,
};
pub use validity::ValidityChecker;
pub use window::{select_windows, WindowSelection};
