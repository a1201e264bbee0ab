use core_types::Variant;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The inputs of a pre-experiment power calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerInput {
    /// Baseline conversion probability `p0`.
    pub baseline_rate: f64,
    /// Absolute minimum detectable effect, e.g. 0.015 for +1.5 points.
    pub minimum_detectable_effect: f64,
    pub sample_size_per_arm: u64,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerEstimate {
    pub input: PowerInput,
    /// `Δ / sqrt(p0 (1 - p0))`.
    pub effect_size: f64,
    pub power: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Pooled two-proportion z-test.
    TwoProportionZ,
    /// Student's two-sample t-test with pooled variance.
    StudentT,
    /// Welch's unequal-variance t-test.
    WelchT,
}

/// Summary of one group entering a test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub n: u64,
    /// Sample mean; for a proportion test this is the observed rate.
    pub mean: f64,
    /// Success count, for proportion tests only.
    pub successes: Option<u64>,
    pub std_dev: f64,
}

/// The outcome of a two-sample hypothesis test.
///
/// `statistic` follows the "A minus B" convention (`(mean_a - mean_b) / SE`), so
/// swapping the groups negates it. `difference` and `confidence_interval` describe
/// B minus A, the effect of B relative to A.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub kind: TestKind,
    pub group_a: GroupSummary,
    pub group_b: GroupSummary,
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: Option<f64>,
    pub difference: f64,
    pub confidence_interval: (f64, f64),
    pub confidence_level: f64,
}

impl TestResult {
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Relative change of B over A in percent, or `None` when A's mean is zero.
    pub fn relative_lift_pct(&self) -> Option<f64> {
        if self.group_a.mean == 0.0 {
            None
        } else {
            Some(self.difference / self.group_a.mean * 100.0)
        }
    }
}

/// One arm's rate inside a segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmRate {
    pub n: u64,
    pub successes: u64,
    pub rate: f64,
}

/// Descriptive lift of treatment over control within one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentLift {
    pub segment: String,
    pub control: ArmRate,
    pub treatment: ArmRate,
    /// `(treatment - control) / control * 100`.
    pub lift_pct: f64,
    /// False when the control rate was zero and `lift_pct` is the zero fallback.
    pub lift_defined: bool,
    /// True only when a significance test was run for this segment.
    pub validated: bool,
    pub test: Option<TestResult>,
    /// Why a requested test could not be run; the descriptive lift still stands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_error: Option<String>,
}

/// Days from trial start to paid conversion for one arm's dated converters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionTiming {
    pub variant: Variant,
    /// Converters with a known conversion date.
    pub converters: u64,
    pub mean_days: f64,
    pub median_days: f64,
}

/// Per-arm counts and a chi-square check against an even split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRatio {
    pub control: u64,
    pub treatment: u64,
    pub chi_square: f64,
    pub p_value: f64,
}

impl SampleRatio {
    pub fn is_mismatched(&self, threshold: f64) -> bool {
        self.p_value < threshold
    }
}

/// Annualised value of the observed conversion difference at a given trial volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactProjection {
    pub monthly_trials: u64,
    pub value_per_conversion: Decimal,
    pub absolute_lift: f64,
    pub additional_conversions_per_year: Decimal,
    pub projected_annual_value: Decimal,
}
