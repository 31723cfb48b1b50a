use std::path::Path;

use crate::ichef::ledger::error::{Result, SyncError};
use crate::ichef::ledger::model::SourceBatch;

const BOM: char = '\u{feff}';

/// Reads a UTF-8 CSV export (optionally BOM-prefixed) as a source batch.
pub fn read_batch(path: &Path) -> Result<SourceBatch> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(position, name)| {
            if position == 0 {
                name.trim_start_matches(BOM).to_string()
            } else {
                name.to_string()
            }
        })
        .collect();
    if columns.iter().all(|name| name.trim().is_empty()) {
        return Err(SyncError::parse(path, "missing header row"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(SourceBatch::new(columns, rows))
}
