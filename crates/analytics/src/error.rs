use core_types::Variant;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not enough data for {what}: need at least {required} observations, got {actual}")]
    InsufficientData {
        what: String,
        required: usize,
        actual: usize,
    },

    #[error("Degenerate variance: {0}")]
    DegenerateVariance(String),

    #[error("Relative lift is undefined for segment '{0}': the control rate is zero")]
    UndefinedLift(String),

    #[error("Segment '{segment}' has no {variant} records")]
    EmptySegment { segment: String, variant: Variant },

    #[error("Failed to construct distribution: {0}")]
    Distribution(String),

    #[error("Calculation error: {0}")]
    Calculation(String),
}
