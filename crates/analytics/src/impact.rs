use crate::error::AnalyticsError;
use crate::report::ImpactProjection;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

const MONTHS_PER_YEAR: u64 = 12;

/// Projects the yearly value of an absolute conversion lift at a given trial volume.
///
/// `absolute_lift` is a difference of rates (e.g. 0.003 for +0.3 points) and may be
/// negative, in which case the projection is a loss.
pub fn project_impact(
    monthly_trials: u64,
    value_per_conversion: Decimal,
    absolute_lift: f64,
) -> Result<ImpactProjection, AnalyticsError> {
    if value_per_conversion.is_sign_negative() {
        return Err(AnalyticsError::InvalidInput(format!(
            "value per conversion must not be negative, got {value_per_conversion}"
        )));
    }
    let lift = Decimal::from_f64(absolute_lift).ok_or_else(|| {
        AnalyticsError::Calculation(format!("absolute lift {absolute_lift} is not representable"))
    })?;

    let yearly_trials = Decimal::from(monthly_trials) * Decimal::from(MONTHS_PER_YEAR);
    let additional_conversions_per_year = (yearly_trials * lift).round_dp(2);
    let projected_annual_value = (yearly_trials * lift * value_per_conversion).round_dp(2);

    Ok(ImpactProjection {
        monthly_trials,
        value_per_conversion,
        absolute_lift,
        additional_conversions_per_year,
        projected_annual_value,
    })
}
