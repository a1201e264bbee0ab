use crate::error::AnalyticsError;
use crate::hypothesis::two_proportion_z_test;
use crate::report::{ArmRate, SegmentLift};
use core_types::{ExperimentRecord, Metric, Segment, Variant};
use serde::{Deserialize, Serialize};

/// What to report when the control rate is zero and relative lift is undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroLiftPolicy {
    /// Report a lift of 0 and mark it as undefined.
    #[default]
    Zero,
    /// Fail with `AnalyticsError::UndefinedLift`.
    Error,
}

/// Relative lift in percent, `(treatment - control) / control * 100`.
///
/// Returns the lift and whether it is defined. A zero control rate is resolved
/// through `policy`; `label` names the slice in the error.
pub fn relative_lift(
    control_rate: f64,
    treatment_rate: f64,
    policy: ZeroLiftPolicy,
    label: &str,
) -> Result<(f64, bool), AnalyticsError> {
    if !control_rate.is_finite() || !treatment_rate.is_finite() {
        return Err(AnalyticsError::InvalidInput(format!(
            "rates must be finite (control {control_rate}, treatment {treatment_rate})"
        )));
    }
    if control_rate == 0.0 {
        return match policy {
            ZeroLiftPolicy::Zero => {
                tracing::warn!(segment = label, "Control rate is zero; reporting lift as 0");
                Ok((0.0, false))
            }
            ZeroLiftPolicy::Error => Err(AnalyticsError::UndefinedLift(label.to_string())),
        };
    }
    Ok(((treatment_rate - control_rate) / control_rate * 100.0, true))
}

/// Per-variant rate of a binary `metric` within `segment`, and the relative lift.
///
/// Segment lifts are descriptive. When `test_confidence` is set a pooled z-test is
/// attached and the result is marked `validated`. If that test cannot be run (e.g.
/// neither arm converted) the lift is still returned, unvalidated, with `test_error`.
pub fn segment_lift(
    records: &[ExperimentRecord],
    segment: &Segment,
    label: &str,
    metric: Metric,
    policy: ZeroLiftPolicy,
    test_confidence: Option<f64>,
) -> Result<SegmentLift, AnalyticsError> {
    if !metric.is_binary() {
        return Err(AnalyticsError::InvalidInput(format!(
            "segment lift needs a binary metric, got {metric}"
        )));
    }

    let control = arm_rate(records, segment, label, metric, Variant::Control)?;
    let treatment = arm_rate(records, segment, label, metric, Variant::Treatment)?;
    let (lift_pct, lift_defined) = relative_lift(control.rate, treatment.rate, policy, label)?;

    // A failed test leaves the descriptive lift intact; the reason is reported instead.
    let (test, test_error) = match test_confidence {
        Some(confidence) => match two_proportion_z_test(
            control.successes,
            control.n,
            treatment.successes,
            treatment.n,
            confidence,
        ) {
            Ok(test) => (Some(test), None),
            Err(e) => {
                tracing::warn!(segment = label, error = %e, "Segment test could not be run");
                (None, Some(e.to_string()))
            }
        },
        None => (None, None),
    };

    tracing::debug!(
        segment = label,
        control_rate = control.rate,
        treatment_rate = treatment.rate,
        lift_pct,
        "Computed segment lift"
    );

    Ok(SegmentLift {
        segment: label.to_string(),
        control,
        treatment,
        lift_pct,
        lift_defined,
        validated: test.is_some(),
        test,
        test_error,
    })
}

fn arm_rate(
    records: &[ExperimentRecord],
    segment: &Segment,
    label: &str,
    metric: Metric,
    variant: Variant,
) -> Result<ArmRate, AnalyticsError> {
    let (n, successes) = segment
        .select(records, variant)
        .fold((0u64, 0u64), |(n, hits), r| {
            (n + 1, hits + u64::from(r.metric_value(metric) > 0.5))
        });
    if n == 0 {
        return Err(AnalyticsError::EmptySegment {
            segment: label.to_string(),
            variant,
        });
    }
    Ok(ArmRate {
        n,
        successes,
        rate: successes as f64 / n as f64,
    })
}
