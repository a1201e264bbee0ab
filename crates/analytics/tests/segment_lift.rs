use analytics::{AnalyticsEngine, AnalyticsError, ZeroLiftPolicy};
use chrono::NaiveDate;
use core_types::{AcquisitionChannel, DeviceType, ExperimentRecord, Metric, Segment, Variant};

/// Appends `n` users of one cell, the first `conversions` of whom converted.
fn push_cell(
    records: &mut Vec<ExperimentRecord>,
    variant: Variant,
    channel: AcquisitionChannel,
    device: DeviceType,
    n: usize,
    conversions: usize,
) {
    let start = NaiveDate::from_ymd_opt(2025, 10, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    for i in 0..n {
        let user_id = records.len() as u64 + 1;
        records.push(ExperimentRecord {
            user_id,
            variant,
            acquisition_channel: channel,
            device_type: device,
            trial_start_date: start,
            paid_conversion: i < conversions,
            retention_7d: i % 3 != 0,
            avg_session_length_min: 6.0 + (i % 5) as f64,
            paid_conversion_date: None,
            session_count_7d: None,
        });
    }
}

fn mobile_paid_social() -> Segment {
    Segment::channel(AcquisitionChannel::PaidSocial).and(Segment::device(DeviceType::Mobile))
}

#[test]
fn lift_is_computed_within_the_segment_only() {
    let mut records = Vec::new();
    push_cell(&mut records, Variant::Control, AcquisitionChannel::PaidSocial, DeviceType::Mobile, 100, 10);
    push_cell(&mut records, Variant::Treatment, AcquisitionChannel::PaidSocial, DeviceType::Mobile, 100, 12);
    // Noise outside the segment must not move the segment rates.
    push_cell(&mut records, Variant::Control, AcquisitionChannel::Organic, DeviceType::Desktop, 50, 40);
    push_cell(&mut records, Variant::Treatment, AcquisitionChannel::Organic, DeviceType::Mobile, 50, 0);

    let engine = AnalyticsEngine::new();
    let lift = engine
        .segment_lift(&records, &mobile_paid_social(), "mobile_paid_social", false)
        .unwrap();

    assert_eq!(lift.control.n, 100);
    assert_eq!(lift.treatment.successes, 12);
    assert!((lift.control.rate - 0.10).abs() < 1e-12);
    assert!((lift.treatment.rate - 0.12).abs() < 1e-12);
    assert!((lift.lift_pct - 20.0).abs() < 1e-9);
    assert!(lift.lift_defined);
    assert!(!lift.validated);
    assert!(lift.test.is_none());
}

#[test]
fn opt_in_test_marks_segment_validated() {
    let mut records = Vec::new();
    push_cell(&mut records, Variant::Control, AcquisitionChannel::PaidSocial, DeviceType::Mobile, 400, 40);
    push_cell(&mut records, Variant::Treatment, AcquisitionChannel::PaidSocial, DeviceType::Mobile, 400, 48);

    let lift = AnalyticsEngine::new()
        .segment_lift(&records, &mobile_paid_social(), "mps", true)
        .unwrap();
    let test = lift.test.expect("test requested");
    assert!(lift.validated);
    assert!(test.p_value > 0.05);
}

#[test]
fn untestable_segment_keeps_its_descriptive_lift() {
    let mut records = Vec::new();
    push_cell(&mut records, Variant::Control, AcquisitionChannel::Referral, DeviceType::Mobile, 20, 0);
    push_cell(&mut records, Variant::Treatment, AcquisitionChannel::Referral, DeviceType::Mobile, 20, 0);
    let segment = Segment::channel(AcquisitionChannel::Referral);
    let engine = AnalyticsEngine::new();

    let descriptive = engine.segment_lift(&records, &segment, "referral", false).unwrap();
    assert_eq!(descriptive.test_error, None);

    let tested = engine.segment_lift(&records, &segment, "referral", true).unwrap();
    assert_eq!(tested.control.n, 20);
    assert_eq!(tested.treatment.successes, 0);
    assert_eq!(tested.lift_pct, 0.0);
    assert!(!tested.lift_defined);
    assert!(!tested.validated);
    assert!(tested.test.is_none());
    let reason = tested.test_error.expect("reason for the missing test");
    assert!(reason.contains("Degenerate variance"), "{reason}");
}

#[test]
fn empty_arm_in_segment_is_an_error() {
    let mut records = Vec::new();
    push_cell(&mut records, Variant::Control, AcquisitionChannel::PaidSocial, DeviceType::Mobile, 10, 1);

    let result = AnalyticsEngine::new().segment_lift(&records, &mobile_paid_social(), "mps", false);
    assert_eq!(
        result,
        Err(AnalyticsError::EmptySegment {
            segment: "mps".to_string(),
            variant: Variant::Treatment,
        })
    );
}

#[test]
fn zero_control_rate_follows_engine_policy() {
    let mut records = Vec::new();
    push_cell(&mut records, Variant::Control, AcquisitionChannel::Referral, DeviceType::Desktop, 20, 0);
    push_cell(&mut records, Variant::Treatment, AcquisitionChannel::Referral, DeviceType::Desktop, 20, 3);
    let segment = Segment::channel(AcquisitionChannel::Referral);

    let fallback = AnalyticsEngine::new()
        .segment_lift(&records, &segment, "referral", false)
        .unwrap();
    assert_eq!(fallback.lift_pct, 0.0);
    assert!(!fallback.lift_defined);

    let strict = AnalyticsEngine::new()
        .with_zero_lift_policy(ZeroLiftPolicy::Error)
        .segment_lift(&records, &segment, "referral", false);
    assert!(matches!(strict, Err(AnalyticsError::UndefinedLift(_))));
}

#[test]
fn compare_arms_dispatches_by_metric() {
    let mut records = Vec::new();
    push_cell(&mut records, Variant::Control, AcquisitionChannel::Organic, DeviceType::Mobile, 200, 24);
    push_cell(&mut records, Variant::Treatment, AcquisitionChannel::Organic, DeviceType::Mobile, 200, 30);
    let engine = AnalyticsEngine::new();

    let conversion = engine.compare_arms(&records, Metric::PaidConversion).unwrap();
    assert_eq!(conversion.kind, analytics::TestKind::TwoProportionZ);
    assert_eq!(conversion.group_a.successes, Some(24));

    let sessions = engine.compare_arms(&records, Metric::AvgSessionLength).unwrap();
    assert_eq!(sessions.kind, analytics::TestKind::StudentT);
    assert!((sessions.group_a.mean - sessions.group_b.mean).abs() < 1e-12);

    let srm = engine.sample_ratio(&records).unwrap();
    assert_eq!((srm.control, srm.treatment), (200, 200));
}
