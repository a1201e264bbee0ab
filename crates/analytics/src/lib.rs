//! # Vantage Analytics Engine
//!
//! This crate provides the statistical inference behind a two-arm experiment readout.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files,
//!   configuration or output formats. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every operation is a deterministic function of its
//!   inputs. Invalid or degenerate inputs are reported as `AnalyticsError`s, never
//!   as NaN results.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: facade bundling interval level, t-test flavour and zero-lift policy.
//! - `estimate_power` / `required_sample_size`: pre-experiment design.
//! - `two_proportion_z_test` / `two_sample_t_test`: hypothesis tests.
//! - `relative_lift` / `segment_lift`: descriptive segment effects.
//! - `sample_ratio_check`, `project_impact`: arm balance and business projection.
//! - `conversion_timing`: days from trial start to paid conversion, per arm.

// Declare the modules that constitute this crate.
pub mod balance;
mod distributions;
pub mod engine;
pub mod error;
pub mod hypothesis;
pub mod impact;
pub mod lift;
pub mod power;
pub mod report;
pub mod timing;

// Re-export the key components to create a clean, public-facing API.
pub use balance::sample_ratio_check;
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use hypothesis::{TTestKind, two_proportion_z_test, two_sample_t_test};
pub use impact::project_impact;
pub use lift::{ZeroLiftPolicy, relative_lift, segment_lift};
pub use power::{effect_size, estimate_power, required_sample_size};
pub use report::{
    ArmRate, ConversionTiming, GroupSummary, ImpactProjection, PowerEstimate, PowerInput,
    SampleRatio, SegmentLift, TestKind, TestResult,
};
pub use timing::conversion_timing;
