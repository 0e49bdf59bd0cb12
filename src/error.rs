use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading or analysing a questionnaire.
///
/// Every pipeline step reports failures synchronously; nothing is retried or
/// silently skipped.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The configured source path does not exist.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The source could not be parsed into the expected row schema.
    #[error("malformed input in {}: {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },

    /// A row cannot be validated (e.g. it carries no email string).
    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    /// Every answer of the row is missing, so there is no mean to fill with.
    #[error("row {row}: all answers are missing, the fill mean is undefined")]
    UndefinedImputation { row: usize },

    /// The floored mean of a row does not fit the `u8` score column.
    #[error("row {row}: score {value} is outside 0..=255")]
    ScoreOutOfRange { row: usize, value: f64 },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
