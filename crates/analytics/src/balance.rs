use crate::distributions::chi_squared;
use crate::error::AnalyticsError;
use crate::report::SampleRatio;
use statrs::distribution::ContinuousCDF;

/// Chi-square goodness-of-fit of the observed arm sizes against a 50/50 split.
pub fn sample_ratio_check(control: u64, treatment: u64) -> Result<SampleRatio, AnalyticsError> {
    let smallest = control.min(treatment);
    if smallest == 0 {
        return Err(AnalyticsError::InsufficientData {
            what: "experiment arms".to_string(),
            required: 1,
            actual: 0,
        });
    }

    let expected = (control + treatment) as f64 / 2.0;
    let chi_square = [control, treatment]
        .iter()
        .map(|&observed| (observed as f64 - expected).powi(2) / expected)
        .sum::<f64>();
    let p_value = chi_squared(1.0)?.sf(chi_square);

    Ok(SampleRatio {
        control,
        treatment,
        chi_square,
        p_value,
    })
}
