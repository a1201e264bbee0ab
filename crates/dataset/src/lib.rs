//! # Vantage Dataset Crate
//!
//! Reads the exported experiment table into validated [`ExperimentRecord`]s.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** All file-format knowledge lives here. The analytics and
//!   analyzer crates only ever see a `&[ExperimentRecord]`.
//! - **Fail on the first bad row:** A malformed row, an unknown category or a
//!   duplicate user aborts the load with the 1-based line number, so no analysis ever
//!   runs on a partially read table.
//!
//! ## Public API
//!
//! - `load_csv`: Reads a CSV export from a path.
//! - `read_csv`: Reads a CSV export from any `io::Read` source.
//! - `DatasetError`: The specific error types that can be returned from this crate.
//!
//! [`ExperimentRecord`]: core_types::ExperimentRecord

pub mod error;
mod parse;
pub mod reader;

pub use error::DatasetError;
pub use reader::{REQUIRED_COLUMNS, load_csv, read_csv};
