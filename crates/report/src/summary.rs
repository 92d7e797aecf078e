#![allow(clippy::format_push_string)]

use chrono::NaiveDate;
use n1_data::{Intervention, PeriodSummary};

use crate::format::{fixed, NOT_AVAILABLE};
use crate::text::{RULE, THIN_RULE};

/// Plain-text listing of a [`PeriodSummary`].
pub struct SummaryReport;

impl SummaryReport {
    /// Renders the summary. `today` decides whether an intervention has ended.
    #[must_use]
    pub fn render(title: Option<&str>, summary: &PeriodSummary, today: NaiveDate) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        match title {
            Some(name) => output.push_str(&format!("  Summary for Intervention: {name}\n")),
            None => output.push_str(&format!(
                "  Summary for {} to {}\n",
                summary.from, summary.to
            )),
        }
        output.push_str(RULE);

        output.push('\n');
        output.push_str("Interventions in Period\n");
        output.push_str(THIN_RULE);
        if summary.interventions.is_empty() {
            output.push_str("No active interventions in this period.\n");
        }
        for intervention in &summary.interventions {
            output.push_str(&format!(
                "- {} (Started: {}, Status: {})\n",
                intervention.name,
                intervention.start_date,
                status(intervention, today)
            ));
        }

        output.push('\n');
        output.push_str("Logged Metrics\n");
        output.push_str(THIN_RULE);
        if summary.metrics.is_empty() {
            output.push_str("No metrics logged in this period.\n");
        }
        for entry in &summary.metrics {
            output.push_str(&format!(
                "- {}: {} = {}\n",
                entry.date.format("%Y-%m-%d %H:%M"),
                entry.metric_name,
                fixed(entry.value, 2)
            ));
        }

        output.push('\n');
        output.push_str("Logged Events\n");
        output.push_str(THIN_RULE);
        if summary.events.is_empty() {
            output.push_str("No events logged in this period.\n");
        }
        for event in &summary.events {
            let severity = event
                .severity
                .map_or_else(|| NOT_AVAILABLE.to_string(), |s| s.to_string());
            output.push_str(&format!(
                "- {}: {} (Severity: {})\n",
                event.timestamp.format("%Y-%m-%d %H:%M"),
                event.event_name,
                severity
            ));
        }

        output
    }
}

fn status(intervention: &Intervention, today: NaiveDate) -> String {
    match intervention.end_date {
        Some(end) if end <= today => format!("Ended {end}"),
        _ => "Ongoing".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use n1_data::{Event, MetricEntry};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, d).unwrap()
    }

    fn summary() -> PeriodSummary {
        let mut magnesium = Intervention::new("Magnesium", day(1));
        magnesium.end_date = Some(day(9));
        let mut fasting = Intervention::new("Fasting", day(5));
        fasting.end_date = Some(day(30));

        let metrics = vec![
            MetricEntry::new(day(8).and_hms_opt(7, 0, 0).unwrap(), "sleep", Some(7.25)),
            MetricEntry::new(day(8).and_hms_opt(21, 0, 0).unwrap(), "mood", None),
        ];
        let events = vec![Event::new(day(9).and_hms_opt(14, 30, 0).unwrap(), "headache")
            .with_severity(2)
            .unwrap()];

        PeriodSummary::collect(day(8), day(10), &[magnesium, fasting], &metrics, &events).unwrap()
    }

    #[test]
    fn lists_every_section() {
        let text = SummaryReport::render(None, &summary(), day(15));

        assert!(text.contains("Summary for 2023-10-08 to 2023-10-10"), "report was:\n{text}");
        assert!(text.contains("- Magnesium (Started: 2023-10-01, Status: Ended 2023-10-09)"));
        assert!(text.contains("- Fasting (Started: 2023-10-05, Status: Ongoing)"));
        assert!(text.contains("- 2023-10-08 07:00: sleep = 7.25"));
        assert!(text.contains("- 2023-10-08 21:00: mood = N/A"));
        assert!(text.contains("- 2023-10-09 14:30: headache (Severity: 2)"));
    }

    #[test]
    fn empty_sections_say_so() {
        let empty = PeriodSummary::collect(day(1), day(2), &[], &[], &[]).unwrap();

        let text = SummaryReport::render(Some("Magnesium"), &empty, day(15));

        assert!(text.contains("Summary for Intervention: Magnesium"));
        assert!(text.contains("No active interventions in this period."));
        assert!(text.contains("No metrics logged in this period."));
        assert!(text.contains("No events logged in this period."));
    }
}
