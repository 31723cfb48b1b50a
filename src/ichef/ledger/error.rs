use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type covering the different failure cases that can occur while a
/// batch is parsed, merged, or committed.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Wrapper for IO failures such as reading, writing, or moving files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the JSON configuration cannot be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the format-detecting Excel reader.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Errors bubbled up from the `.xlsx` reader used by the table store.
    #[error("Excel read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the CSV reader.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when a source file cannot be decoded as tabular data.
    #[error("cannot parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// Raised when the table store cannot be read or written.
    #[error("table store access failed: {0}")]
    RemoteAccess(String),

    /// Raised when a worksheet is looked up but does not exist.
    #[error("worksheet '{sheet}' not found in table {table}")]
    WorksheetNotFound { table: String, sheet: String },

    /// Raised when a table id is absent or still carries its placeholder.
    #[error("table '{0}' is not configured")]
    ConfigurationMissing(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Coarse classification used by the orchestrator to decide how a failed
/// batch is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    RemoteAccess,
    ConfigurationMissing,
    Other,
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Parse { .. } | SyncError::ExcelRead(_) | SyncError::Csv(_) => {
                ErrorKind::Parse
            }
            SyncError::RemoteAccess(_)
            | SyncError::WorksheetNotFound { .. }
            | SyncError::XlsxRead(_)
            | SyncError::ExcelWrite(_) => ErrorKind::RemoteAccess,
            SyncError::ConfigurationMissing(_) => ErrorKind::ConfigurationMissing,
            _ => ErrorKind::Other,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SyncError::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
