//! Renderers for analysis results and period summaries.
//!
//! Results are rendered as plain text, as a standalone HTML page, or as
//! pretty-printed JSON with the engine's field names.

pub mod format;
pub mod html;
pub mod summary;
pub mod text;

use anyhow::Result;
use serde::Serialize;

pub use html::HtmlReport;
pub use summary::SummaryReport;
pub use text::TextReport;

/// Pretty JSON of any result shape. Absent values serialize as `null`.
///
/// # Errors
/// Returns error if serialization fails
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
