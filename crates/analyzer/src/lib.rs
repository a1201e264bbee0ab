//! # Vantage Analyzer
//!
//! Turns a loaded experiment table and a [`Settings`] into an [`ExperimentReport`]:
//! design power, arm balance, the primary conversion test, secondary metrics,
//! segment lifts and the optional business projection.

use crate::error::AnalyzerError;
use analytics::{AnalyticsEngine, AnalyticsError, PowerEstimate, SegmentLift, TestResult};
use configuration::{MetricErrorPolicy, Settings};
use core_types::{AcquisitionChannel, DeviceType, ExperimentRecord, Metric, Segment};
use std::collections::BTreeSet;
use uuid::Uuid;

pub mod error;
pub mod report;

pub use report::{ExperimentReport, MetricResult, Skipped};

/// The main analysis engine.
pub struct ExperimentAnalyzer {
    settings: Settings,
    engine: AnalyticsEngine,
}

impl ExperimentAnalyzer {
    pub fn new(settings: Settings) -> Self {
        let engine = settings.analysis.engine();
        Self { settings, engine }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Power of the configured design.
    pub fn design_power(&self) -> Result<PowerEstimate, AnalyzerError> {
        Ok(self.engine.power(&self.settings.design.power_input())?)
    }

    /// Smallest per-arm sample size reaching the configured target power.
    pub fn required_sample_size(&self) -> Result<u64, AnalyzerError> {
        let design = &self.settings.design;
        Ok(self.engine.required_sample_size(
            design.baseline_rate,
            design.minimum_detectable_effect,
            design.alpha,
            design.target_power,
        )?)
    }

    /// Runs the full readout over `records`.
    ///
    /// Failures of the design power, the arm balance check or the primary metric
    /// abort the run. Secondary metrics and named segments follow
    /// `analysis.on_metric_error`; grid cells with an empty arm are always skipped.
    pub fn run(&self, records: &[ExperimentRecord]) -> Result<ExperimentReport, AnalyzerError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("analysis", %run_id);
        let _enter = span.enter();
        tracing::info!(records = records.len(), "Starting experiment analysis");

        let analysis = &self.settings.analysis;

        // 1. Design and balance
        let power = self.design_power()?;
        let sample_ratio = self.engine.sample_ratio(records)?;
        let sample_ratio_mismatch = sample_ratio.is_mismatched(analysis.srm_threshold);
        if sample_ratio_mismatch {
            tracing::warn!(
                control = sample_ratio.control,
                treatment = sample_ratio.treatment,
                p_value = sample_ratio.p_value,
                "Sample ratio mismatch: arm sizes deviate from the intended 50/50 split"
            );
        }

        // 2. Primary metric
        let primary = self
            .test_metric(records, Metric::PaidConversion)
            .map_err(|source| AnalyzerError::Metric { metric: Metric::PaidConversion, source })?;
        tracing::info!(
            statistic = primary.test.statistic,
            p_value = primary.test.p_value,
            significant = primary.significant,
            "Primary metric tested"
        );

        // 3. Secondary metrics
        let mut secondary = Vec::new();
        let mut skipped_metrics = Vec::new();
        for &metric in &analysis.secondary_metrics {
            match self.test_metric(records, metric) {
                Ok(result) => secondary.push(result),
                Err(source) if analysis.on_metric_error == MetricErrorPolicy::Skip => {
                    tracing::warn!(%metric, error = %source, "Skipping secondary metric");
                    skipped_metrics.push(Skipped { name: metric.to_string(), reason: source.to_string() });
                }
                Err(source) => return Err(AnalyzerError::Metric { metric, source }),
            }
        }

        // 4. Segments
        let mut segments = Vec::new();
        let mut skipped_segments = Vec::new();
        for definition in &self.settings.segments {
            match self.lift(records, &definition.segment(), &definition.name) {
                Ok(lift) => segments.push(lift),
                Err(source) if analysis.on_metric_error == MetricErrorPolicy::Skip => {
                    tracing::warn!(segment = %definition.name, error = %source, "Skipping segment");
                    skipped_segments.push(Skipped { name: definition.name.clone(), reason: source.to_string() });
                }
                Err(source) => {
                    return Err(AnalyzerError::Segment { segment: definition.name.clone(), source });
                }
            }
        }

        let grid = if analysis.segment_grid {
            self.segment_grid(records, &mut skipped_segments)?
        } else {
            Vec::new()
        };

        let time_to_convert = analytics::conversion_timing(records);

        // 5. Impact
        let impact = match &self.settings.impact {
            Some(impact) => Some(analytics::project_impact(
                impact.monthly_trials,
                impact.value_per_conversion,
                primary.test.difference,
            )?),
            None => None,
        };

        tracing::info!(
            secondary = secondary.len(),
            skipped_metrics = skipped_metrics.len(),
            segments = segments.len(),
            grid = grid.len(),
            "Experiment analysis complete"
        );

        Ok(ExperimentReport {
            run_id,
            records: records.len() as u64,
            alpha: analysis.alpha,
            confidence_level: self.engine.confidence_level(),
            power,
            sample_ratio,
            sample_ratio_mismatch,
            primary,
            secondary,
            skipped_metrics,
            segments,
            grid,
            skipped_segments,
            time_to_convert,
            impact,
        })
    }

    /// Lift for an ad-hoc slice given by optional channel and device filters.
    pub fn segment(
        &self,
        records: &[ExperimentRecord],
        channel: Option<AcquisitionChannel>,
        device: Option<DeviceType>,
    ) -> Result<SegmentLift, AnalyzerError> {
        let segment = Segment::from_attributes(channel, device);
        let label = segment.to_string();
        self.lift(records, &segment, &label)
            .map_err(|source| AnalyzerError::Segment { segment: label, source })
    }

    fn test_metric(
        &self,
        records: &[ExperimentRecord],
        metric: Metric,
    ) -> Result<MetricResult, AnalyticsError> {
        let test: TestResult = self.engine.compare_arms(records, metric)?;
        Ok(MetricResult {
            metric,
            significant: test.is_significant(self.settings.analysis.alpha),
            relative_lift_pct: test.relative_lift_pct(),
            test,
        })
    }

    fn lift(
        &self,
        records: &[ExperimentRecord],
        segment: &Segment,
        label: &str,
    ) -> Result<SegmentLift, AnalyticsError> {
        self.engine
            .segment_lift(records, segment, label, self.settings.analysis.test_segments)
    }

    /// Lift for every (channel, device) cell that occurs in `records`.
    fn segment_grid(
        &self,
        records: &[ExperimentRecord],
        skipped: &mut Vec<Skipped>,
    ) -> Result<Vec<SegmentLift>, AnalyzerError> {
        let cells: BTreeSet<(AcquisitionChannel, DeviceType)> = records
            .iter()
            .map(|r| (r.acquisition_channel, r.device_type))
            .collect();

        let mut grid = Vec::with_capacity(cells.len());
        for (channel, device) in cells {
            let segment = Segment::from_attributes(Some(channel), Some(device));
            let label = segment.to_string();
            match self.lift(records, &segment, &label) {
                Ok(lift) => grid.push(lift),
                Err(source @ AnalyticsError::EmptySegment { .. }) => {
                    tracing::warn!(segment = %label, error = %source, "Skipping grid cell");
                    skipped.push(Skipped { name: label, reason: source.to_string() });
                }
                Err(source) if self.settings.analysis.on_metric_error == MetricErrorPolicy::Skip => {
                    tracing::warn!(segment = %label, error = %source, "Skipping grid cell");
                    skipped.push(Skipped { name: label, reason: source.to_string() });
                }
                Err(source) => return Err(AnalyzerError::Segment { segment: label, source }),
            }
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::Variant;

    fn record(user_id: u64, variant: Variant, converted: bool, channel: AcquisitionChannel) -> ExperimentRecord {
        ExperimentRecord {
            user_id,
            variant,
            acquisition_channel: channel,
            device_type: DeviceType::Desktop,
            trial_start_date: NaiveDate::from_ymd_opt(2025, 10, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            paid_conversion: converted,
            retention_7d: user_id % 2 == 0,
            avg_session_length_min: 3.0 + (user_id % 5) as f64,
            paid_conversion_date: None,
            session_count_7d: None,
        }
    }

    #[test]
    fn ad_hoc_segment_is_labelled_by_its_predicate() {
        let records = vec![
            record(1, Variant::Control, true, AcquisitionChannel::Referral),
            record(2, Variant::Control, false, AcquisitionChannel::Referral),
            record(3, Variant::Treatment, true, AcquisitionChannel::Referral),
            record(4, Variant::Treatment, true, AcquisitionChannel::Referral),
        ];
        let analyzer = ExperimentAnalyzer::new(Settings::default());

        let lift = analyzer
            .segment(&records, Some(AcquisitionChannel::Referral), None)
            .unwrap();
        assert_eq!(lift.segment, "channel=referral");
        assert!((lift.lift_pct - 100.0).abs() < 1e-9);
        assert!(!lift.validated);
    }

    #[test]
    fn ad_hoc_segment_without_treatment_is_an_error() {
        let records = vec![
            record(1, Variant::Control, true, AcquisitionChannel::Organic),
            record(2, Variant::Treatment, true, AcquisitionChannel::Referral),
        ];
        let analyzer = ExperimentAnalyzer::new(Settings::default());

        let err = analyzer
            .segment(&records, Some(AcquisitionChannel::Organic), None)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::Segment { source: AnalyticsError::EmptySegment { variant: Variant::Treatment, .. }, .. }
        ));
    }

    #[test]
    fn design_power_uses_configured_design() {
        let analyzer = ExperimentAnalyzer::new(Settings::default());
        let power = analyzer.design_power().unwrap();
        assert_eq!(power.input.sample_size_per_arm, 25_000);
        assert!(power.power > 0.9);
        let n = analyzer.required_sample_size().unwrap();
        assert!(n < 25_000);
    }
}
