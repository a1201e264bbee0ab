use analytics::{
    ConversionTiming, ImpactProjection, PowerEstimate, SampleRatio, SegmentLift, TestResult,
};
use core_types::Metric;
use serde::Serialize;
use uuid::Uuid;

/// The test outcome for one metric, with control as group A.
#[derive(Debug, Clone, Serialize)]
pub struct MetricResult {
    pub metric: Metric,
    pub test: TestResult,
    /// `p_value < alpha` at the configured analysis alpha.
    pub significant: bool,
    /// Treatment over control in percent; `None` when the control mean is zero.
    pub relative_lift_pct: Option<f64>,
}

/// A metric or segment left out of the report, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub name: String,
    pub reason: String,
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub run_id: Uuid,
    pub records: u64,
    pub alpha: f64,
    pub confidence_level: f64,
    /// Pre-experiment power of the configured design.
    pub power: PowerEstimate,
    pub sample_ratio: SampleRatio,
    pub sample_ratio_mismatch: bool,
    pub primary: MetricResult,
    pub secondary: Vec<MetricResult>,
    pub skipped_metrics: Vec<Skipped>,
    /// Lifts for the configured named segments, in configuration order.
    pub segments: Vec<SegmentLift>,
    /// Lifts for every channel x device cell present in the data.
    pub grid: Vec<SegmentLift>,
    pub skipped_segments: Vec<Skipped>,
    /// Empty when the export carries no conversion dates.
    pub time_to_convert: Vec<ConversionTiming>,
    pub impact: Option<ImpactProjection>,
}

impl ExperimentReport {
    /// Whether the primary metric moved significantly.
    pub fn is_conclusive(&self) -> bool {
        self.primary.significant
    }

    pub fn secondary(&self, metric: Metric) -> Option<&MetricResult> {
        self.secondary.iter().find(|r| r.metric == metric)
    }

    pub fn segment(&self, name: &str) -> Option<&SegmentLift> {
        self.segments.iter().find(|s| s.segment == name)
    }
}
