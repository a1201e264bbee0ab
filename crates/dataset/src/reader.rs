use crate::error::DatasetError;
use crate::parse::{parse_flag, parse_timestamp};
use core_types::{AcquisitionChannel, DeviceType, ExperimentRecord, Variant};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Columns every experiment export must contain.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "user_id",
    "variant",
    "acquisition_channel",
    "device_type",
    "trial_start_date",
    "paid_conversion",
    "retention_7d",
    "avg_session_length_min",
];

// One CSV row as written by the exporter. Categorical, boolean and date fields are
// kept as text here and converted in `into_record` so that every format the
// exporter produces is accepted and failures carry a readable message.
#[derive(Debug, Deserialize)]
struct CsvRow {
    user_id: u64,
    variant: String,
    acquisition_channel: String,
    device_type: String,
    trial_start_date: String,
    paid_conversion: String,
    retention_7d: String,
    avg_session_length_min: f64,
    #[serde(default)]
    paid_conversion_date: Option<String>,
    #[serde(default)]
    session_count_7d: Option<u32>,
}

impl CsvRow {
    fn into_record(self) -> Result<ExperimentRecord, String> {
        if !self.avg_session_length_min.is_finite() || self.avg_session_length_min < 0.0 {
            return Err(format!(
                "avg_session_length_min must be a non-negative number, got {}",
                self.avg_session_length_min
            ));
        }

        let paid_conversion_date = match self.paid_conversion_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_timestamp(raw).map_err(|e| format!("paid_conversion_date: {e}"))?),
        };

        Ok(ExperimentRecord {
            user_id: self.user_id,
            variant: self.variant.parse::<Variant>().map_err(|e| e.to_string())?,
            acquisition_channel: self
                .acquisition_channel
                .parse::<AcquisitionChannel>()
                .map_err(|e| e.to_string())?,
            device_type: self.device_type.parse::<DeviceType>().map_err(|e| e.to_string())?,
            trial_start_date: parse_timestamp(&self.trial_start_date)
                .map_err(|e| format!("trial_start_date: {e}"))?,
            paid_conversion: parse_flag(&self.paid_conversion)
                .map_err(|e| format!("paid_conversion: {e}"))?,
            retention_7d: parse_flag(&self.retention_7d).map_err(|e| format!("retention_7d: {e}"))?,
            avg_session_length_min: self.avg_session_length_min,
            paid_conversion_date,
            session_count_7d: self.session_count_7d,
        })
    }
}

/// Loads and validates an experiment export from disk.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<ExperimentRecord>, DatasetError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records = read_csv(file)?;
    tracing::info!(path = %path.display(), rows = records.len(), "Loaded experiment dataset");
    Ok(records)
}

/// Reads experiment records from any CSV source with a header row.
///
/// Columns beyond [`REQUIRED_COLUMNS`] and the optional conversion-date and
/// session-count columns are ignored. Line numbers in errors are 1-based and count
/// the header.
pub fn read_csv<R: Read>(source: R) -> Result<Vec<ExperimentRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DatasetError::MissingColumn(column.to_string()));
        }
    }

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let parsed: CsvRow = row
            .deserialize(Some(&headers))
            .map_err(|e| DatasetError::InvalidRow { line, message: e.to_string() })?;
        let record = parsed
            .into_record()
            .map_err(|message| DatasetError::InvalidRow { line, message })?;

        if !seen.insert(record.user_id) {
            return Err(DatasetError::DuplicateUser { user_id: record.user_id, line });
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(DatasetError::Empty);
    }
    tracing::debug!(rows = records.len(), "Parsed experiment rows");
    Ok(records)
}
