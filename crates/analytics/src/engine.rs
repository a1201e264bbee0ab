use crate::balance::sample_ratio_check;
use crate::error::AnalyticsError;
use crate::hypothesis::{TTestKind, two_proportion_z_test, two_sample_t_test};
use crate::lift::{ZeroLiftPolicy, segment_lift};
use crate::power::{estimate_power, required_sample_size};
use crate::report::{PowerEstimate, PowerInput, SampleRatio, SegmentLift, TestResult};
use core_types::{Arms, ExperimentRecord, Metric, Segment, Variant};

/// A stateless calculator for two-arm experiment statistics.
///
/// The engine only carries the conventions a caller chooses once (interval level,
/// t-test flavour, zero-lift policy); every method is a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    confidence_level: f64,
    t_test: TTestKind,
    zero_lift: ZeroLiftPolicy,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            t_test: TTestKind::default(),
            zero_lift: ZeroLiftPolicy::default(),
        }
    }
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    pub fn with_t_test(mut self, kind: TTestKind) -> Self {
        self.t_test = kind;
        self
    }

    pub fn with_zero_lift_policy(mut self, policy: ZeroLiftPolicy) -> Self {
        self.zero_lift = policy;
        self
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn power(&self, input: &PowerInput) -> Result<PowerEstimate, AnalyticsError> {
        estimate_power(input)
    }

    pub fn required_sample_size(
        &self,
        baseline_rate: f64,
        minimum_detectable_effect: f64,
        alpha: f64,
        target_power: f64,
    ) -> Result<u64, AnalyticsError> {
        required_sample_size(baseline_rate, minimum_detectable_effect, alpha, target_power)
    }

    /// Two-proportion z-test from pre-aggregated counts, group A first.
    pub fn proportion_test(
        &self,
        x_a: u64,
        n_a: u64,
        x_b: u64,
        n_b: u64,
    ) -> Result<TestResult, AnalyticsError> {
        two_proportion_z_test(x_a, n_a, x_b, n_b, self.confidence_level)
    }

    /// Two-sample t-test over raw observations, group A first.
    pub fn mean_test(&self, a: &[f64], b: &[f64]) -> Result<TestResult, AnalyticsError> {
        two_sample_t_test(a, b, self.t_test, self.confidence_level)
    }

    /// Tests `metric` with control as group A and treatment as group B.
    ///
    /// Paid conversion uses the two-proportion z-test on per-arm counts. Secondary
    /// metrics, 0/1-coded retention included, use the configured t-test on raw values.
    pub fn compare_arms(
        &self,
        records: &[ExperimentRecord],
        metric: Metric,
    ) -> Result<TestResult, AnalyticsError> {
        let arms = Arms::new(records);
        if metric == Metric::PaidConversion {
            let n_c = arms.count(Variant::Control) as u64;
            let n_t = arms.count(Variant::Treatment) as u64;
            let x_c = arms.successes(Variant::Control, metric) as u64;
            let x_t = arms.successes(Variant::Treatment, metric) as u64;
            self.proportion_test(x_c, n_c, x_t, n_t)
        } else {
            let control = arms.values(Variant::Control, metric);
            let treatment = arms.values(Variant::Treatment, metric);
            self.mean_test(&control, &treatment)
        }
    }

    /// Conversion lift of treatment over control inside `segment`.
    pub fn segment_lift(
        &self,
        records: &[ExperimentRecord],
        segment: &Segment,
        label: &str,
        with_test: bool,
    ) -> Result<SegmentLift, AnalyticsError> {
        segment_lift(
            records,
            segment,
            label,
            Metric::PaidConversion,
            self.zero_lift,
            with_test.then_some(self.confidence_level),
        )
    }

    pub fn sample_ratio(&self, records: &[ExperimentRecord]) -> Result<SampleRatio, AnalyticsError> {
        let arms = Arms::new(records);
        sample_ratio_check(
            arms.count(Variant::Control) as u64,
            arms.count(Variant::Treatment) as u64,
        )
    }
}
