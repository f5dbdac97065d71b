//! Error taxonomy shared by the coordinate and equity components.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Unsupported source datum: {0}")]
    UnsupportedDatum(String),

    #[error("Malformed coordinate in row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid analysis unit at line {line}: {reason}")]
    InvalidUnit { line: u64, reason: String },

    #[error("Geoprocessing failed: {0}")]
    Geoprocessing(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StudyError>;
