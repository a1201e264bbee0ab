use analytics::AnalyticsError;
use analyzer::{ExperimentAnalyzer, error::AnalyzerError};
use chrono::NaiveDate;
use configuration::{ImpactSettings, MetricErrorPolicy, Settings};
use core_types::{AcquisitionChannel, DeviceType, ExperimentRecord, Metric, Variant};
use rust_decimal_macros::dec;

/// Builds one arm of `n` users, the first `conversions` of whom paid.
///
/// Users cycle through every channel x device cell so each cell has both
/// converters and non-converters. `session_shift` is added to session lengths.
fn arm(
    variant: Variant,
    first_id: u64,
    n: u64,
    conversions: u64,
    session_shift: f64,
) -> Vec<ExperimentRecord> {
    let start = NaiveDate::from_ymd_opt(2025, 10, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| ExperimentRecord {
            user_id: first_id + i,
            variant,
            acquisition_channel: AcquisitionChannel::ALL[(i % 4) as usize],
            device_type: DeviceType::ALL[((i / 4) % 2) as usize],
            trial_start_date: start,
            paid_conversion: i < conversions,
            retention_7d: i % 3 == 0,
            avg_session_length_min: 5.0 + (i % 7) as f64 * 0.1 + session_shift,
            paid_conversion_date: None,
            session_count_7d: None,
        })
        .collect()
}

fn onboarding_experiment() -> Vec<ExperimentRecord> {
    let mut records = arm(Variant::Control, 0, 25_000, 3_000, 0.0);
    records.extend(arm(Variant::Treatment, 100_000, 25_000, 3_075, 0.2));
    records
}

#[test]
fn full_readout_of_the_onboarding_experiment() {
    let mut settings = Settings::default();
    settings.impact = Some(ImpactSettings {
        monthly_trials: 100_000,
        value_per_conversion: dec!(125),
    });
    let analyzer = ExperimentAnalyzer::new(settings);

    let report = analyzer.run(&onboarding_experiment()).unwrap();

    assert_eq!(report.records, 50_000);
    assert!(!report.sample_ratio_mismatch);
    assert_eq!(report.sample_ratio.control, 25_000);

    // 12.0% vs 12.3% is not significant at 25k per arm.
    assert_eq!(report.primary.metric, Metric::PaidConversion);
    assert!((report.primary.test.statistic + 1.0266).abs() < 1e-3);
    assert!(report.primary.test.p_value > 0.05);
    assert!(!report.is_conclusive());
    assert!((report.primary.test.difference - 0.003).abs() < 1e-9);

    // Identical retention, shifted session length.
    let retention = report.secondary(Metric::Retention7d).unwrap();
    assert!(!retention.significant);
    let sessions = report.secondary(Metric::AvgSessionLength).unwrap();
    assert!(sessions.significant);
    assert!(sessions.test.difference > 0.19 && sessions.test.difference < 0.21);
    assert!(report.skipped_metrics.is_empty());

    let mobile_paid_social = report.segment("mobile_paid_social").unwrap();
    assert!(!mobile_paid_social.validated);
    assert!(mobile_paid_social.test.is_none());
    assert_eq!(report.grid.len(), 8);
    assert!(report.skipped_segments.is_empty());

    // The fixture carries no conversion dates.
    assert!(report.time_to_convert.is_empty());

    let impact = report.impact.unwrap();
    assert_eq!(impact.additional_conversions_per_year, dec!(3600));
    assert_eq!(impact.projected_annual_value, dec!(450000));
}

#[test]
fn report_serializes_with_run_id() {
    let analyzer = ExperimentAnalyzer::new(Settings::default());
    let report = analyzer.run(&onboarding_experiment()).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["run_id"].as_str().unwrap(), report.run_id.to_string());
    assert_eq!(json["primary"]["metric"], "paid_conversion");
    assert!(json["impact"].is_null());
}

#[test]
fn segment_tests_are_opt_in() {
    let mut settings = Settings::default();
    settings.analysis.test_segments = true;
    let report = ExperimentAnalyzer::new(settings)
        .run(&onboarding_experiment())
        .unwrap();

    assert!(report.segments.iter().all(|s| s.validated && s.test.is_some()));
    assert!(report.grid.iter().all(|s| s.validated));
}

#[test]
fn untestable_grid_cell_stays_in_the_grid() {
    let records: Vec<_> = onboarding_experiment()
        .into_iter()
        .map(|mut r| {
            if r.acquisition_channel == AcquisitionChannel::Referral
                && r.device_type == DeviceType::Mobile
            {
                r.paid_conversion = false;
            }
            r
        })
        .collect();
    let mut settings = Settings::default();
    settings.analysis.test_segments = true;
    settings.analysis.on_metric_error = MetricErrorPolicy::Abort;

    let report = ExperimentAnalyzer::new(settings).run(&records).unwrap();

    assert_eq!(report.grid.len(), 8);
    assert!(report.skipped_segments.is_empty());
    let cell = report
        .grid
        .iter()
        .find(|s| s.segment == "(channel=referral & device=mobile)")
        .unwrap();
    assert!(!cell.validated);
    assert!(cell.test.is_none());
    assert!(cell.test_error.is_some());
    assert!(report.grid.iter().filter(|s| s.validated).count() == 7);
}

#[test]
fn time_to_convert_is_summarised_from_conversion_dates() {
    let records: Vec<_> = onboarding_experiment()
        .into_iter()
        .map(|mut r| {
            if r.paid_conversion {
                let days = match r.variant {
                    Variant::Control => 14,
                    Variant::Treatment => 10 + (r.user_id % 2) as i64,
                };
                r.paid_conversion_date = Some(r.trial_start_date + chrono::Duration::days(days));
            }
            r
        })
        .collect();

    let report = ExperimentAnalyzer::new(Settings::default())
        .run(&records)
        .unwrap();

    let timing = &report.time_to_convert;
    assert_eq!(timing.len(), 2);
    assert_eq!(timing[0].variant, Variant::Control);
    assert_eq!(timing[0].converters, 3_000);
    assert_eq!(timing[0].mean_days, 14.0);
    assert_eq!(timing[1].variant, Variant::Treatment);
    assert_eq!(timing[1].converters, 3_075);
    assert!(timing[1].mean_days > 10.0 && timing[1].mean_days < 11.0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["time_to_convert"][0]["variant"], "control");
}

fn constant_sessions() -> Vec<ExperimentRecord> {
    onboarding_experiment()
        .into_iter()
        .map(|mut r| {
            r.avg_session_length_min = 6.0;
            r
        })
        .collect()
}

#[test]
fn failing_secondary_metric_is_skipped_by_default() {
    let report = ExperimentAnalyzer::new(Settings::default())
        .run(&constant_sessions())
        .unwrap();

    assert!(report.secondary(Metric::AvgSessionLength).is_none());
    assert_eq!(report.skipped_metrics.len(), 1);
    assert_eq!(report.skipped_metrics[0].name, "avg_session_length_min");
    assert!(report.skipped_metrics[0].reason.contains("Degenerate"));
    assert!(report.secondary(Metric::Retention7d).is_some());
}

#[test]
fn failing_secondary_metric_aborts_when_configured() {
    let mut settings = Settings::default();
    settings.analysis.on_metric_error = MetricErrorPolicy::Abort;

    let err = ExperimentAnalyzer::new(settings)
        .run(&constant_sessions())
        .unwrap_err();
    assert!(matches!(
        err,
        AnalyzerError::Metric {
            metric: Metric::AvgSessionLength,
            source: AnalyticsError::DegenerateVariance(_)
        }
    ));
}

#[test]
fn grid_skips_cells_missing_an_arm() {
    let mut records = onboarding_experiment();
    records.retain(|r| {
        !(r.variant == Variant::Treatment && r.acquisition_channel == AcquisitionChannel::Other)
    });

    let mut settings = Settings::default();
    settings.analysis.on_metric_error = MetricErrorPolicy::Abort;
    let report = ExperimentAnalyzer::new(settings).run(&records).unwrap();

    assert_eq!(report.grid.len(), 6);
    assert_eq!(report.skipped_segments.len(), 2);
    assert!(
        report
            .skipped_segments
            .iter()
            .all(|s| s.name.starts_with("(channel=other"))
    );
}

#[test]
fn primary_metric_failure_always_aborts() {
    let records: Vec<_> = onboarding_experiment()
        .into_iter()
        .map(|mut r| {
            r.paid_conversion = false;
            r
        })
        .collect();

    let err = ExperimentAnalyzer::new(Settings::default())
        .run(&records)
        .unwrap_err();
    assert!(matches!(
        err,
        AnalyzerError::Metric { metric: Metric::PaidConversion, .. }
    ));
}

#[test]
fn empty_arm_is_insufficient_data() {
    let records = arm(Variant::Control, 0, 100, 10, 0.0);
    let err = ExperimentAnalyzer::new(Settings::default())
        .run(&records)
        .unwrap_err();
    assert!(matches!(
        err,
        AnalyzerError::Analytics(AnalyticsError::InsufficientData { .. })
    ));
}
