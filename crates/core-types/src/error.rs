use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown {kind} value: '{value}'")]
    UnknownCategory { kind: &'static str, value: String },
}
