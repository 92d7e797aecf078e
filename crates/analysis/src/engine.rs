//! Single-metric analysis pipeline.
//!
//! window selection -> gate -> descriptive + trend -> validity warnings ->
//! effect size, hypothesis tests, bootstrap interval.

use chrono::NaiveDate;
use n1_core::{AnalysisSettings, BootstrapSettings, MetricSeries, Observation, Sample};

use crate::bootstrap::BootstrapResampler;
use crate::descriptive::Descriptive;
use crate::effect::{cohens_d, pooled_std};
use crate::error::EngineError;
use crate::hypothesis::run_hypothesis_tests;
use crate::trend::calculate_trend;
use crate::types::{Analysis, AnalysisResult, Window};
use crate::validity::{insufficient_data_message, ValidityChecker};
use crate::window::select_windows;

/// Compares a baseline window with an intervention window.
///
/// Holds copies of its thresholds, so engines built with different settings
/// can run side by side.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    settings: AnalysisSettings,
    checker: ValidityChecker,
    resampler: BootstrapResampler,
}

impl AnalysisEngine {
    /// Builds an engine after validating both configuration values.
    ///
    /// # Errors
    /// [`EngineError::Settings`] for out-of-range thresholds and
    /// [`EngineError::InvalidConfidence`] unless `0 < confidence_level < 1`.
    pub fn new(
        settings: AnalysisSettings,
        bootstrap: BootstrapSettings,
    ) -> Result<Self, EngineError> {
        settings.validate()?;
        let level = bootstrap.confidence_level;
        if !(level > 0.0 && level < 1.0) {
            return Err(EngineError::InvalidConfidence(level));
        }

        Ok(Self {
            settings,
            checker: ValidityChecker::new(settings),
            resampler: BootstrapResampler::new(bootstrap),
        })
    }

    #[must_use]
    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    #[must_use]
    pub fn bootstrap(&self) -> &BootstrapSettings {
        self.resampler.config()
    }

    /// Analyses untrusted storage rows that must all belong to one metric.
    ///
    /// # Errors
    /// [`EngineError::Series`] when the rows carry several metric names or
    /// none at all, plus everything [`AnalysisEngine::analyze`] returns.
    pub fn analyze_observations(
        &self,
        observations: &[Observation],
        start_date: NaiveDate,
        baseline_days: u32,
        intervention_days: u32,
    ) -> Result<AnalysisResult, EngineError> {
        let series = MetricSeries::from_observations(observations)?;
        self.analyze(&series, start_date, baseline_days, intervention_days)
    }

    /// Runs the full comparison for one metric.
    ///
    /// Too little data is a result, not an error.
    ///
    /// # Errors
    /// [`EngineError::InvalidWindow`] when a window length is zero.
    pub fn analyze(
        &self,
        series: &MetricSeries,
        start_date: NaiveDate,
        baseline_days: u32,
        intervention_days: u32,
    ) -> Result<AnalysisResult, EngineError> {
        let selection = select_windows(series, start_date, baseline_days, intervention_days)?;

        if let Err(short) = self.checker.gate(&selection) {
            tracing::info!(
                metric = %series.metric,
                baseline = short.baseline_count,
                intervention = short.intervention_count,
                "insufficient data"
            );
            return Ok(AnalysisResult::InsufficientData {
                error: short.error,
                baseline_count: short.baseline_count,
                intervention_count: short.intervention_count,
            });
        }

        let baseline_values = values_of(&selection.baseline);
        let intervention_values = values_of(&selection.intervention);
        let (Some(baseline), Some(intervention)) = (
            Descriptive::of(&baseline_values),
            Descriptive::of(&intervention_values),
        ) else {
            return Ok(AnalysisResult::InsufficientData {
                error: insufficient_data_message(self.settings.min_data_points),
                baseline_count: baseline_values.len(),
                intervention_count: intervention_values.len(),
            });
        };

        let mut warnings = self.checker.warnings(&selection, &baseline, &intervention);
        for warning in &warnings {
            tracing::warn!(metric = %series.metric, "{}", warning);
        }

        let mean_difference = intervention.mean - baseline.mean;
        let pooled = pooled_std(baseline.count, baseline.std, intervention.count, intervention.std);
        let effect = cohens_d(mean_difference, pooled);

        let tests = run_hypothesis_tests(&baseline_values, &intervention_values);
        warnings.extend(tests.warnings);

        let bootstrap_ci = self
            .resampler
            .mean_difference_ci(&baseline_values, &intervention_values);

        tracing::info!(
            metric = %series.metric,
            baseline = baseline.count,
            intervention = intervention.count,
            mean_difference,
            cohens_d = effect,
            warnings = warnings.len(),
            "analysis complete"
        );

        Ok(AnalysisResult::Complete {
            baseline_window: build_window(
                selection.baseline_start,
                selection.start_date,
                selection.baseline,
                &baseline,
            ),
            intervention_window: build_window(
                selection.start_date,
                selection.intervention_end,
                selection.intervention,
                &intervention,
            ),
            analysis: Analysis {
                mean_difference,
                cohens_d: effect,
                t_test: tests.t_test,
                mann_whitney_u: tests.mann_whitney_u,
                bootstrap_ci,
            },
            warnings,
        })
    }
}

fn values_of(samples: &[Sample]) -> Vec<f64> {
    samples.iter().filter_map(Sample::present_value).collect()
}

fn build_window(
    start: NaiveDate,
    end: NaiveDate,
    samples: Vec<Sample>,
    stats: &Descriptive,
) -> Window {
    let trend = calculate_trend(&samples, start);
    Window {
        start,
        end,
        samples,
        count: stats.count,
        mean: stats.mean,
        std: stats.std,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TestResult;
    use chrono::Days;
    use proptest::prelude::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, 1).unwrap()
    }

    fn engine() -> AnalysisEngine {
        AnalysisEngine::new(
            AnalysisSettings::default(),
            BootstrapSettings::new(100, 0.95).with_seed(42),
        )
        .unwrap()
    }

    /// `baseline` on the days before `start()`, `intervention` from `start()` on.
    fn series(baseline: &[f64], intervention: &[f64]) -> MetricSeries {
        let before = baseline.len() as u64;
        let mut samples: Vec<Sample> = baseline
            .iter()
            .enumerate()
            .map(|(i, v)| Sample::daily(start() - Days::new(before - i as u64), *v))
            .collect();
        samples.extend(
            intervention
                .iter()
                .enumerate()
                .map(|(i, v)| Sample::daily(start() + Days::new(i as u64), *v)),
        );
        MetricSeries::new("sleep_quality", samples)
    }

    fn cycle(pattern: &[f64], n: usize) -> Vec<f64> {
        pattern.iter().copied().cycle().take(n).collect()
    }

    fn complete(result: AnalysisResult) -> (Window, Window, Analysis, Vec<String>) {
        match result {
            AnalysisResult::Complete {
                baseline_window,
                intervention_window,
                analysis,
                warnings,
            } => (baseline_window, intervention_window, analysis, warnings),
            other => panic!("expected complete result, got {other:?}"),
        }
    }

    // ============================================================
    // End to end
    // ============================================================

    #[test]
    fn five_point_shift_is_detected() {
        let baseline = cycle(&[48.0, 49.0, 50.0, 51.0, 52.0], 14);
        let intervention = cycle(&[53.0, 54.0, 55.0, 56.0, 57.0], 14);

        let result = engine().analyze(&series(&baseline, &intervention), start(), 14, 14).unwrap();
        let (b, i, analysis, warnings) = complete(result);

        assert_eq!(b.count, 14);
        assert_eq!(i.count, 14);
        let diff = analysis.mean_difference;
        assert!((diff - 5.0).abs() < 1e-9, "diff was {diff}");
        assert!(analysis.cohens_d > 2.0, "d was {}", analysis.cohens_d);
        let p = analysis.t_test.p_value.unwrap();
        assert!(p < 0.001, "t-test p was {p}");
        assert!(analysis.mann_whitney_u.p_value.unwrap() < 0.001);
        let ci = analysis.bootstrap_ci.unwrap();
        assert!(ci.lower > 0.0 && ci.lower <= ci.upper, "ci was {ci:?}");
        assert!(warnings.is_empty(), "warnings were {warnings:?}");
    }

    #[test]
    fn windows_carry_bounds_and_trends() {
        let baseline = cycle(&[48.0, 49.0, 50.0, 51.0, 52.0], 14);
        let intervention: Vec<f64> = (0..14_i32).map(|d| 50.0 + f64::from(d)).collect();

        let result = engine().analyze(&series(&baseline, &intervention), start(), 14, 14).unwrap();
        let (b, i, _, _) = complete(result);

        assert_eq!(b.start, start() - Days::new(14));
        assert_eq!(b.end, start());
        assert_eq!(i.start, start());
        assert_eq!(i.end, start() + Days::new(14));
        let trend = i.trend.unwrap();
        assert!((trend.slope - 1.0).abs() < 1e-9, "slope was {}", trend.slope);
        assert!(trend.p_value.unwrap() < 1e-9, "trend was {trend:?}");
        assert!(b.trend.is_some());
    }

    #[test]
    fn identical_runs_are_identical() {
        let s = series(&cycle(&[1.0, 4.0, 2.0], 10), &cycle(&[3.0, 5.0, 4.0, 6.0], 10));

        let first = engine().analyze(&s, start(), 10, 10).unwrap();
        let second = engine().analyze(&s, start(), 10, 10).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn unsorted_input_with_gaps_matches_sorted_input() {
        let sorted = series(&cycle(&[1.0, 4.0, 2.0], 10), &cycle(&[3.0, 5.0, 4.0, 6.0], 10));
        let mut shuffled = sorted.clone();
        shuffled.samples.reverse();
        shuffled.samples.push(Sample::new(
            start().and_hms_opt(12, 0, 0).unwrap(),
            None,
        ));
        shuffled.samples.push(Sample::new(
            start().and_hms_opt(13, 0, 0).unwrap(),
            Some(f64::NAN),
        ));

        let expected = engine().analyze(&sorted, start(), 10, 10).unwrap();
        let actual = engine().analyze(&shuffled, start(), 10, 10).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn infinite_readings_are_dropped() {
        let baseline = cycle(&[48.0, 49.0, 50.0, 51.0, 52.0], 14);
        let intervention = cycle(&[53.0, 54.0, 55.0, 56.0, 57.0], 14);
        let clean = series(&baseline, &intervention);
        let mut noisy = clean.clone();
        noisy.samples.push(Sample::new(
            start().and_hms_opt(12, 0, 0).unwrap(),
            Some(f64::INFINITY),
        ));

        let expected = engine().analyze(&clean, start(), 14, 14).unwrap();
        let actual = engine().analyze(&noisy, start(), 14, 14).unwrap();

        assert_eq!(expected, actual);
    }

    // ============================================================
    // Insufficient data
    // ============================================================

    #[test]
    fn short_window_returns_error_shape() {
        let result = engine()
            .analyze(&series(&[50.0, 51.0], &[55.0; 10]), start(), 14, 14)
            .unwrap();

        assert_eq!(
            result,
            AnalysisResult::InsufficientData {
                error: "Insufficient data points (minimum 3 required)".to_string(),
                baseline_count: 2,
                intervention_count: 10,
            }
        );
        assert!(result.analysis().is_none());
    }

    #[test]
    fn missing_values_do_not_count_toward_minimum() {
        let mut s = series(&[50.0, 51.0], &[55.0, 56.0, 57.0]);
        s.samples.push(Sample::new(
            (start() - Days::new(5)).and_hms_opt(9, 0, 0).unwrap(),
            None,
        ));

        let result = engine().analyze(&s, start(), 7, 7).unwrap();

        assert!(matches!(
            result,
            AnalysisResult::InsufficientData {
                baseline_count: 2,
                intervention_count: 3,
                ..
            }
        ));
    }

    // ============================================================
    // Degenerate variance
    // ============================================================

    #[test]
    fn constant_equal_groups() {
        let result = engine().analyze(&series(&[50.0; 7], &[50.0; 7]), start(), 7, 7).unwrap();
        let (_, _, analysis, warnings) = complete(result);

        assert_eq!(analysis.t_test.statistic, Some(0.0));
        assert_eq!(analysis.t_test.p_value, Some(1.0));
        assert_eq!(analysis.mean_difference, 0.0);
        assert_eq!(analysis.cohens_d, 0.0);
        assert!(
            warnings.iter().any(|w| w.starts_with("Zero variance")),
            "warnings were {warnings:?}"
        );
    }

    #[test]
    fn signed_zero_readings_are_one_constant_level() {
        let intervention = [0.0, 0.0, -0.0, 0.0, -0.0, 0.0, 0.0];

        let result = engine().analyze(&series(&[0.0; 7], &intervention), start(), 7, 7).unwrap();
        let (_, _, analysis, warnings) = complete(result);

        assert_eq!(analysis.t_test, TestResult::new(0.0, 1.0));
        assert_eq!(analysis.mean_difference.to_bits(), 0.0_f64.to_bits());
        assert!(
            warnings.iter().any(|w| w.starts_with("Zero variance")),
            "warnings were {warnings:?}"
        );
        assert!(!warnings.iter().any(|w| w.starts_with("T-test")));
    }

    #[test]
    fn constant_unequal_groups_leave_t_test_undefined() {
        let result = engine().analyze(&series(&[50.0; 7], &[55.0; 7]), start(), 7, 7).unwrap();
        let (_, _, analysis, warnings) = complete(result);

        assert_eq!(analysis.t_test.statistic, None);
        assert_eq!(analysis.t_test.p_value, None);
        assert_eq!(analysis.cohens_d, 0.0);
        assert!((analysis.mean_difference - 5.0).abs() < f64::EPSILON);
        assert!(analysis.mann_whitney_u.is_defined());
        assert!(warnings.iter().any(|w| w.starts_with("Zero variance")));
        assert!(warnings.iter().any(|w| w.starts_with("T-test undefined")));
    }

    // ============================================================
    // Caller errors
    // ============================================================

    #[test]
    fn mixed_metric_rows_are_rejected() {
        let at = start().and_hms_opt(8, 0, 0).unwrap();
        let rows = vec![
            Observation::new("sleep", at, Some(1.0)),
            Observation::new("mood", at, Some(2.0)),
        ];

        let err = engine().analyze_observations(&rows, start(), 7, 7).unwrap_err();

        assert!(matches!(err, EngineError::Series(_)), "error was {err:?}");
    }

    #[test]
    fn zero_day_window_is_rejected() {
        let err = engine().analyze(&series(&[1.0; 5], &[2.0; 5]), start(), 0, 7).unwrap_err();

        assert!(matches!(err, EngineError::InvalidWindow { baseline_days: 0, .. }));
    }

    #[test]
    fn out_of_range_settings_are_rejected() {
        let settings = AnalysisSettings {
            min_data_points: 1,
            ..AnalysisSettings::default()
        };
        assert!(matches!(
            AnalysisEngine::new(settings, BootstrapSettings::default()),
            Err(EngineError::Settings(_))
        ));
        assert!(matches!(
            AnalysisEngine::new(AnalysisSettings::default(), BootstrapSettings::new(10, 1.0)),
            Err(EngineError::InvalidConfidence(_))
        ));
    }

    // ============================================================
    // Properties
    // ============================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn windows_meet_at_start_date_and_never_overlap(
            baseline_days in 1_u32..30,
            intervention_days in 1_u32..30,
            values in proptest::collection::vec(0.0_f64..100.0, 60),
        ) {
            let samples: Vec<Sample> = values
                .iter()
                .enumerate()
                .map(|(i, v)| Sample::daily(start() - Days::new(30) + Days::new(i as u64), *v))
                .collect();
            let s = MetricSeries::new("m", samples);

            let settings = AnalysisSettings { min_data_points: 2, ..AnalysisSettings::default() };
            let bootstrap = BootstrapSettings::new(20, 0.95).with_seed(1);
            let engine = AnalysisEngine::new(settings, bootstrap).unwrap();

            if let AnalysisResult::Complete { baseline_window, intervention_window, .. } =
                engine.analyze(&s, start(), baseline_days, intervention_days).unwrap()
            {
                prop_assert_eq!(baseline_window.end, intervention_window.start);
                let boundary = intervention_window.start;
                prop_assert!(baseline_window.samples.iter().all(|x| x.date() < boundary));
                prop_assert!(intervention_window.samples.iter().all(|x| x.date() >= boundary));
                prop_assert_eq!(baseline_window.count, baseline_days as usize);
                prop_assert_eq!(intervention_window.count, intervention_days as usize);
            } else {
                prop_assert!(baseline_days < 2 || intervention_days < 2);
            }
        }
    }
}
