use crate::settings::DesignSettings;
use clap::Args;

/// Command-line overrides for the `[design]` section.
#[derive(Debug, Clone, Default, Args)]
pub struct DesignArgs {
    /// Baseline conversion rate (e.g. 0.12).
    #[arg(long)]
    pub baseline: Option<f64>,

    /// Absolute minimum detectable effect (e.g. 0.015).
    #[arg(long)]
    pub mde: Option<f64>,

    /// Sample size per arm.
    #[arg(long = "n")]
    pub sample_size_per_arm: Option<u64>,

    /// Significance level.
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Target power for the sample-size solver.
    #[arg(long)]
    pub power: Option<f64>,
}

impl DesignArgs {
    /// Returns `design` with every flag that was given applied on top.
    pub fn apply(&self, design: &DesignSettings) -> DesignSettings {
        DesignSettings {
            baseline_rate: self.baseline.unwrap_or(design.baseline_rate),
            minimum_detectable_effect: self.mde.unwrap_or(design.minimum_detectable_effect),
            sample_size_per_arm: self.sample_size_per_arm.unwrap_or(design.sample_size_per_arm),
            alpha: self.alpha.unwrap_or(design.alpha),
            target_power: self.power.unwrap_or(design.target_power),
        }
    }
}
