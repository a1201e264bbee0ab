use crate::enums::{AcquisitionChannel, DeviceType, Variant};
use crate::record::ExperimentRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A composable filter over experiment records.
///
/// Segments are built from attribute leaves and combined with `and`, `or` and
/// `not`, so a slice such as "mobile paid social" is a value that can be named,
/// logged, compared and tested on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// Every record.
    #[default]
    All,
    Channel(AcquisitionChannel),
    Device(DeviceType),
    And(Box<Segment>, Box<Segment>),
    Or(Box<Segment>, Box<Segment>),
    Not(Box<Segment>),
}

impl Segment {
    pub fn channel(channel: AcquisitionChannel) -> Self {
        Segment::Channel(channel)
    }

    pub fn device(device: DeviceType) -> Self {
        Segment::Device(device)
    }

    /// Builds the conjunction of an optional channel and an optional device filter.
    /// With neither set the segment is the whole population.
    pub fn from_attributes(channel: Option<AcquisitionChannel>, device: Option<DeviceType>) -> Self {
        match (channel, device) {
            (Some(c), Some(d)) => Segment::Channel(c).and(Segment::Device(d)),
            (Some(c), None) => Segment::Channel(c),
            (None, Some(d)) => Segment::Device(d),
            (None, None) => Segment::All,
        }
    }

    pub fn and(self, other: Segment) -> Self {
        match (self, other) {
            (Segment::All, s) | (s, Segment::All) => s,
            (a, b) => Segment::And(Box::new(a), Box::new(b)),
        }
    }

    pub fn or(self, other: Segment) -> Self {
        match (self, other) {
            (Segment::All, _) | (_, Segment::All) => Segment::All,
            (a, b) => Segment::Or(Box::new(a), Box::new(b)),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        match self {
            Segment::Not(inner) => *inner,
            s => Segment::Not(Box::new(s)),
        }
    }

    pub fn matches(&self, record: &ExperimentRecord) -> bool {
        match self {
            Segment::All => true,
            Segment::Channel(c) => record.acquisition_channel == *c,
            Segment::Device(d) => record.device_type == *d,
            Segment::And(a, b) => a.matches(record) && b.matches(record),
            Segment::Or(a, b) => a.matches(record) || b.matches(record),
            Segment::Not(inner) => !inner.matches(record),
        }
    }

    /// Iterates the records of one arm that fall inside this segment.
    pub fn select<'a>(
        &'a self,
        records: &'a [ExperimentRecord],
        variant: Variant,
    ) -> impl Iterator<Item = &'a ExperimentRecord> + 'a {
        records
            .iter()
            .filter(move |r| r.variant == variant && self.matches(r))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::All => f.write_str("all"),
            Segment::Channel(c) => write!(f, "channel={c}"),
            Segment::Device(d) => write!(f, "device={d}"),
            Segment::And(a, b) => write!(f, "({a} & {b})"),
            Segment::Or(a, b) => write!(f, "({a} | {b})"),
            Segment::Not(inner) => write!(f, "!{inner}"),
        }
    }
}
