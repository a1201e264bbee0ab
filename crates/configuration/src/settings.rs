use analytics::{AnalyticsEngine, PowerInput, TTestKind, ZeroLiftPolicy};
use core_types::{AcquisitionChannel, DeviceType, Metric, Segment};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::ConfigError;

/// The root configuration structure for an experiment readout.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub design: DesignSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    /// Named slices to report lift for. Defaults to the mobile paid-social slice.
    #[serde(default = "default_segments")]
    pub segments: Vec<SegmentDefinition>,
    /// Optional business projection; omitted from the report when absent.
    #[serde(default)]
    pub impact: Option<ImpactSettings>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Pre-experiment design assumptions used for the power check.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DesignSettings {
    /// Expected conversion rate of the control arm (e.g. 0.12 for 12%).
    pub baseline_rate: f64,
    /// Smallest absolute lift worth detecting (0.015 is +1.5 points).
    pub minimum_detectable_effect: f64,
    pub sample_size_per_arm: u64,
    pub alpha: f64,
    /// Power the experiment was sized for; used by the sample-size solver.
    pub target_power: f64,
}

/// What to do when a secondary metric cannot be tested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricErrorPolicy {
    /// Fail the whole analysis.
    Abort,
    /// Record the metric as skipped, log it and continue.
    #[default]
    Skip,
}

/// Conventions applied while testing the collected data.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Significance threshold for declaring a result significant.
    pub alpha: f64,
    /// Level of the reported confidence intervals.
    pub confidence_level: f64,
    pub t_test: TTestKind,
    pub zero_lift_policy: ZeroLiftPolicy,
    pub on_metric_error: MetricErrorPolicy,
    /// Metrics tested after the primary paid-conversion test.
    pub secondary_metrics: Vec<Metric>,
    /// Attach a z-test to every segment lift. Off by default: segment lifts are descriptive.
    pub test_segments: bool,
    /// Also compute lift for every channel x device cell present in the data.
    pub segment_grid: bool,
    /// p-value below which the arm split is reported as a sample-ratio mismatch.
    pub srm_threshold: f64,
}

/// A named segment built from optional channel and device filters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SegmentDefinition {
    pub name: String,
    #[serde(default)]
    pub channel: Option<AcquisitionChannel>,
    #[serde(default)]
    pub device: Option<DeviceType>,
}

impl SegmentDefinition {
    pub fn segment(&self) -> Segment {
        Segment::from_attributes(self.channel, self.device)
    }
}

/// Inputs of the yearly value projection.
#[derive(Debug, Clone, Deserialize)]
pub struct ImpactSettings {
    pub monthly_trials: u64,
    /// Annual revenue attributed to one additional paid conversion.
    pub value_per_conversion: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    pub ansi: bool,
}

// --- Default Implementations ---
// These mirror the onboarding experiment design, so a missing file or section
// still produces a meaningful readout.

impl Default for Settings {
    fn default() -> Self {
        Self {
            design: DesignSettings::default(),
            analysis: AnalysisSettings::default(),
            segments: default_segments(),
            impact: None,
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for DesignSettings {
    fn default() -> Self {
        Self {
            baseline_rate: 0.12,
            minimum_detectable_effect: 0.015,
            sample_size_per_arm: 25_000,
            alpha: 0.05,
            target_power: 0.8,
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            confidence_level: 0.95,
            t_test: TTestKind::Student,
            zero_lift_policy: ZeroLiftPolicy::Zero,
            on_metric_error: MetricErrorPolicy::Skip,
            secondary_metrics: vec![Metric::Retention7d, Metric::AvgSessionLength],
            test_segments: false,
            segment_grid: true,
            srm_threshold: 0.001,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "vantage.log".to_string(),
            ansi: true,
        }
    }
}

fn default_segments() -> Vec<SegmentDefinition> {
    vec![SegmentDefinition {
        name: "mobile_paid_social".to_string(),
        channel: Some(AcquisitionChannel::PaidSocial),
        device: Some(DeviceType::Mobile),
    }]
}

impl DesignSettings {
    pub fn power_input(&self) -> PowerInput {
        PowerInput {
            baseline_rate: self.baseline_rate,
            minimum_detectable_effect: self.minimum_detectable_effect,
            sample_size_per_arm: self.sample_size_per_arm,
            alpha: self.alpha,
        }
    }
}

impl AnalysisSettings {
    /// Builds the calculator configured with these conventions.
    pub fn engine(&self) -> AnalyticsEngine {
        AnalyticsEngine::new()
            .with_confidence_level(self.confidence_level)
            .with_t_test(self.t_test)
            .with_zero_lift_policy(self.zero_lift_policy)
    }
}

impl Settings {
    /// Rejects values the analytics layer would refuse later, with a pointer to the key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        open_unit("design.baseline_rate", self.design.baseline_rate)?;
        open_unit("design.alpha", self.design.alpha)?;
        open_unit("design.target_power", self.design.target_power)?;
        if !(self.design.minimum_detectable_effect > 0.0
            && self.design.minimum_detectable_effect < 1.0)
        {
            return Err(ConfigError::ValidationError(format!(
                "design.minimum_detectable_effect must be in (0, 1), got {}",
                self.design.minimum_detectable_effect
            )));
        }
        if self.design.sample_size_per_arm == 0 {
            return Err(ConfigError::ValidationError(
                "design.sample_size_per_arm must be positive".to_string(),
            ));
        }

        open_unit("analysis.alpha", self.analysis.alpha)?;
        open_unit("analysis.confidence_level", self.analysis.confidence_level)?;
        open_unit("analysis.srm_threshold", self.analysis.srm_threshold)?;
        if self.analysis.secondary_metrics.contains(&Metric::PaidConversion) {
            return Err(ConfigError::ValidationError(
                "analysis.secondary_metrics must not repeat the primary metric paid_conversion"
                    .to_string(),
            ));
        }

        let mut names = std::collections::HashSet::new();
        for segment in &self.segments {
            if segment.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "segments.name must not be empty".to_string(),
                ));
            }
            if !names.insert(segment.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate segment name '{}'",
                    segment.name
                )));
            }
        }

        if let Some(impact) = &self.impact {
            if impact.value_per_conversion.is_sign_negative() {
                return Err(ConfigError::ValidationError(
                    "impact.value_per_conversion must not be negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn open_unit(key: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{key} must be strictly between 0 and 1, got {value}"
        )))
    }
}
