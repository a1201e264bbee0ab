use crate::enums::{AcquisitionChannel, DeviceType, Metric, Variant};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One user's row in the experiment table.
///
/// Records are immutable once loaded: the variant assignment and segmentation
/// attributes are fixed at creation, and the outcome fields are derived upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub user_id: u64,
    pub variant: Variant,
    pub acquisition_channel: AcquisitionChannel,
    pub device_type: DeviceType,
    pub trial_start_date: NaiveDateTime,
    pub paid_conversion: bool,
    pub retention_7d: bool,
    pub avg_session_length_min: f64,

    // Optional columns emitted by the data generator.
    #[serde(default)]
    pub paid_conversion_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub session_count_7d: Option<u32>,
}

impl ExperimentRecord {
    /// Returns the numeric value of `metric` for this user, with booleans coded 0/1.
    pub fn metric_value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::PaidConversion => flag(self.paid_conversion),
            Metric::Retention7d => flag(self.retention_7d),
            Metric::AvgSessionLength => self.avg_session_length_min,
        }
    }

    /// Days from trial start to conversion, if the user converted and the date is known.
    pub fn days_to_convert(&self) -> Option<i64> {
        self.paid_conversion_date
            .map(|converted| (converted - self.trial_start_date).num_days())
    }
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Per-arm view over a slice of records.
///
/// Borrowing the records keeps the dataset read-only for the duration of an analysis.
#[derive(Debug, Clone, Copy)]
pub struct Arms<'a> {
    records: &'a [ExperimentRecord],
}

impl<'a> Arms<'a> {
    pub fn new(records: &'a [ExperimentRecord]) -> Self {
        Self { records }
    }

    pub fn iter(self, variant: Variant) -> impl Iterator<Item = &'a ExperimentRecord> + 'a {
        self.records.iter().filter(move |r| r.variant == variant)
    }

    pub fn count(&self, variant: Variant) -> usize {
        self.iter(variant).count()
    }

    /// Collects `metric` for every user in `variant`, in input order.
    pub fn values(&self, variant: Variant, metric: Metric) -> Vec<f64> {
        self.iter(variant).map(|r| r.metric_value(metric)).collect()
    }

    /// Number of users in `variant` for whom a binary `metric` is true.
    pub fn successes(&self, variant: Variant, metric: Metric) -> usize {
        self.iter(variant)
            .filter(|r| r.metric_value(metric) > 0.5)
            .count()
    }
}
