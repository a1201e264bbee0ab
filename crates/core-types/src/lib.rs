//! # Vantage Core Types
//!
//! Layer 0 of the workspace: the typed experiment schema shared by every other crate.
//! A row of the experiment table is an `ExperimentRecord`; slices of the population are
//! described by composable `Segment` predicates instead of ad hoc column filters.

pub mod enums;
pub mod error;
pub mod record;
pub mod segment;

// Re-export the core types to provide a clean public API.
pub use enums::{AcquisitionChannel, DeviceType, Metric, Variant};
pub use error::CoreError;
pub use record::{Arms, ExperimentRecord};
pub use segment::Segment;
