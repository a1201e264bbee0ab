use crate::report::ConversionTiming;
use core_types::{Arms, ExperimentRecord, Variant};
use statrs::statistics::Statistics;

/// Time-to-convert summary for each arm, from the users with a known conversion date.
///
/// Arms without any dated converter are left out, so an export lacking the
/// optional `paid_conversion_date` column yields an empty list.
pub fn conversion_timing(records: &[ExperimentRecord]) -> Vec<ConversionTiming> {
    let arms = Arms::new(records);
    Variant::ALL
        .into_iter()
        .filter_map(|variant| {
            let mut days: Vec<i64> = arms
                .iter(variant)
                .filter(|r| r.paid_conversion)
                .filter_map(|r| r.days_to_convert())
                .collect();
            if days.is_empty() {
                return None;
            }
            days.sort_unstable();
            Some(ConversionTiming {
                variant,
                converters: days.len() as u64,
                mean_days: days.iter().map(|&d| d as f64).mean(),
                median_days: median(&days),
            })
        })
        .collect()
}

/// Median of a sorted, non-empty slice.
fn median(sorted: &[i64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}
