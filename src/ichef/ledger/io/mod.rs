pub mod archive;
pub mod csv_read;
pub mod discover;
pub mod excel_read;
pub mod memory;
pub mod workbook;

use std::path::Path;

use crate::ichef::ledger::error::{ErrorKind, Result, SyncError};
use crate::ichef::ledger::model::SourceBatch;

/// Parses one source file into a batch.
pub trait SourceBatchReader {
    fn read(&self, path: &Path) -> Result<SourceBatch>;
}

/// Reader choosing the parser from the file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileBatchReader;

impl SourceBatchReader for FileBatchReader {
    fn read(&self, path: &Path) -> Result<SourceBatch> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let result = match extension.as_str() {
            "csv" => csv_read::read_batch(path),
            "xls" | "xlsx" | "xlsm" | "xlsb" => excel_read::read_batch(path),
            other => {
                return Err(SyncError::parse(
                    path,
                    format!("unsupported file type '{other}'"),
                ));
            }
        };

        result.map_err(|err| match err.kind() {
            ErrorKind::Parse => err,
            _ => SyncError::parse(path, err.to_string()),
        })
    }
}
