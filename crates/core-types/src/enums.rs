use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The experiment arm a user was randomised into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "clap", value(rename_all = "snake_case"))]
pub enum Variant {
    Control,
    Treatment,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Control, Variant::Treatment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Control => "control",
            Variant::Treatment => "treatment",
        }
    }
}

/// Where the trial user came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "clap", value(rename_all = "snake_case"))]
pub enum AcquisitionChannel {
    Organic,
    PaidSocial,
    Referral,
    Other,
}

impl AcquisitionChannel {
    pub const ALL: [AcquisitionChannel; 4] = [
        AcquisitionChannel::Organic,
        AcquisitionChannel::PaidSocial,
        AcquisitionChannel::Referral,
        AcquisitionChannel::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionChannel::Organic => "organic",
            AcquisitionChannel::PaidSocial => "paid_social",
            AcquisitionChannel::Referral => "referral",
            AcquisitionChannel::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "clap", value(rename_all = "snake_case"))]
pub enum DeviceType {
    Mobile,
    Desktop,
}

impl DeviceType {
    pub const ALL: [DeviceType; 2] = [DeviceType::Mobile, DeviceType::Desktop];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Desktop => "desktop",
        }
    }
}

/// The outcome columns an analysis can test.
///
/// `PaidConversion` and `Retention7d` are binary; `AvgSessionLength` is continuous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    PaidConversion,
    #[serde(rename = "retention_7d")]
    Retention7d,
    #[serde(rename = "avg_session_length_min")]
    AvgSessionLength,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::PaidConversion,
        Metric::Retention7d,
        Metric::AvgSessionLength,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::PaidConversion => "paid_conversion",
            Metric::Retention7d => "retention_7d",
            Metric::AvgSessionLength => "avg_session_length_min",
        }
    }

    /// True for 0/1-coded metrics, which can be summarised as a rate.
    pub fn is_binary(&self) -> bool {
        matches!(self, Metric::PaidConversion | Metric::Retention7d)
    }
}

macro_rules! impl_display_from_str {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| CoreError::UnknownCategory {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

impl_display_from_str!(Variant, "variant");
impl_display_from_str!(AcquisitionChannel, "acquisition_channel");
impl_display_from_str!(DeviceType, "device_type");
impl_display_from_str!(Metric, "metric");
