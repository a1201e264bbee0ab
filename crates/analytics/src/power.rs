use crate::distributions::{check_probability, standard_normal, two_sided_critical};
use crate::error::AnalyticsError;
use crate::report::{PowerEstimate, PowerInput};
use statrs::distribution::ContinuousCDF;

/// Standardised effect size of an absolute lift over a baseline rate.
pub fn effect_size(baseline_rate: f64, minimum_detectable_effect: f64) -> Result<f64, AnalyticsError> {
    let variance = baseline_rate * (1.0 - baseline_rate);
    if variance.is_nan() || variance <= 0.0 {
        return Err(AnalyticsError::Domain(format!(
            "baseline rate {baseline_rate} has zero Bernoulli variance; effect size is undefined"
        )));
    }
    Ok(minimum_detectable_effect / variance.sqrt())
}

/// Power of a two-sided two-sample z-test with equal allocation.
///
/// With `nobs = n / 2` (the harmonic combination of two arms of size `n`) and
/// `d = effect_size * sqrt(nobs)`, power is `P(Z > z_crit - d) + P(Z < -z_crit - d)`.
pub fn estimate_power(input: &PowerInput) -> Result<PowerEstimate, AnalyticsError> {
    validate(input)?;
    let effect_size = effect_size(input.baseline_rate, input.minimum_detectable_effect)?;
    let power = power_for(effect_size, input.sample_size_per_arm, input.alpha)?;

    tracing::debug!(
        effect_size,
        n = input.sample_size_per_arm,
        alpha = input.alpha,
        power,
        "Computed power estimate"
    );

    Ok(PowerEstimate {
        input: *input,
        effect_size,
        power,
    })
}

/// Smallest per-arm sample size whose power reaches `target_power`.
pub fn required_sample_size(
    baseline_rate: f64,
    minimum_detectable_effect: f64,
    alpha: f64,
    target_power: f64,
) -> Result<u64, AnalyticsError> {
    validate(&PowerInput {
        baseline_rate,
        minimum_detectable_effect,
        sample_size_per_arm: 1,
        alpha,
    })?;
    check_probability("target power", target_power)?;

    let es = effect_size(baseline_rate, minimum_detectable_effect)?;
    let normal = standard_normal()?;
    let z_alpha = two_sided_critical(&normal, 1.0 - alpha);
    let z_beta = normal.inverse_cdf(target_power);

    // The closed form ignores the far rejection tail, so it can only overshoot by a
    // little; walk to the exact boundary from there.
    let approx = 2.0 * ((z_alpha + z_beta) / es).powi(2);
    if !approx.is_finite() || approx > u64::MAX as f64 / 2.0 {
        return Err(AnalyticsError::Calculation(format!(
            "required sample size is not representable (approximation {approx})"
        )));
    }
    let mut n = (approx.ceil() as u64).max(1);

    while power_for(es, n, alpha)? < target_power {
        n += 1;
    }
    while n > 1 && power_for(es, n - 1, alpha)? >= target_power {
        n -= 1;
    }
    Ok(n)
}

fn power_for(effect_size: f64, n_per_arm: u64, alpha: f64) -> Result<f64, AnalyticsError> {
    let normal = standard_normal()?;
    let crit = two_sided_critical(&normal, 1.0 - alpha);
    let nobs = n_per_arm as f64 / 2.0;
    let shift = effect_size * nobs.sqrt();
    let power = normal.sf(crit - shift) + normal.cdf(-crit - shift);
    Ok(power.clamp(0.0, 1.0))
}

fn validate(input: &PowerInput) -> Result<(), AnalyticsError> {
    check_probability("baseline rate", input.baseline_rate)?;
    check_probability("alpha", input.alpha)?;
    if !(input.minimum_detectable_effect.is_finite() && input.minimum_detectable_effect > 0.0) {
        return Err(AnalyticsError::Domain(format!(
            "minimum detectable effect must be positive, got {}",
            input.minimum_detectable_effect
        )));
    }
    if input.sample_size_per_arm == 0 {
        return Err(AnalyticsError::Domain(
            "sample size per arm must be a positive integer".to_string(),
        ));
    }
    Ok(())
}
