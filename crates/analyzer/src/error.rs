use analytics::AnalyticsError;
use core_types::Metric;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Failed to test metric '{metric}': {source}")]
    Metric {
        metric: Metric,
        #[source]
        source: AnalyticsError,
    },

    #[error("Failed to compute lift for segment '{segment}': {source}")]
    Segment {
        segment: String,
        #[source]
        source: AnalyticsError,
    },
}
