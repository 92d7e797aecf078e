//! CLI commands for the N-of-1 analysis engine.

pub mod analyze;
pub mod compare;
pub mod options;
pub mod settings;
pub mod summary;

pub use analyze::{run_analyze, AnalyzeArgs};
pub use compare::{run_compare, CompareArgs};
pub use settings::{run_settings, SettingsArgs};
pub use summary::{run_summary, SummaryArgs};
