//! Thin wrappers over `statrs` so every constructor failure becomes an `AnalyticsError`.

use crate::error::AnalyticsError;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};

pub(crate) fn standard_normal() -> Result<Normal, AnalyticsError> {
    Normal::new(0.0, 1.0).map_err(|e| AnalyticsError::Distribution(e.to_string()))
}

pub(crate) fn students_t(df: f64) -> Result<StudentsT, AnalyticsError> {
    StudentsT::new(0.0, 1.0, df).map_err(|e| AnalyticsError::Distribution(e.to_string()))
}

pub(crate) fn chi_squared(df: f64) -> Result<ChiSquared, AnalyticsError> {
    ChiSquared::new(df).map_err(|e| AnalyticsError::Distribution(e.to_string()))
}

/// Two-sided p-value `2 * P(X > |stat|)` for a symmetric distribution, capped at 1.
pub(crate) fn two_sided_p<D: ContinuousCDF<f64, f64>>(dist: &D, statistic: f64) -> f64 {
    (2.0 * dist.sf(statistic.abs())).min(1.0)
}

/// Upper critical value for a two-sided interval at `confidence_level`.
pub(crate) fn two_sided_critical<D: ContinuousCDF<f64, f64>>(dist: &D, confidence_level: f64) -> f64 {
    dist.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0)
}

pub(crate) fn check_probability(name: &str, value: f64) -> Result<(), AnalyticsError> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(AnalyticsError::Domain(format!(
            "{name} must lie strictly between 0 and 1, got {value}"
        )))
    }
}
