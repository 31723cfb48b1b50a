use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, instrument};

use crate::ichef::ledger::error::Result;
use crate::ichef::ledger::model::SourceBatch;
use crate::ichef::ledger::schema::DATA_DATE_COLUMN;
use crate::ichef::ledger::store::{TableStore, TargetTable};

static SNAPSHOT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{8}").expect("valid snapshot date pattern"));

/// Extraction date embedded in a snapshot filename, e.g. `20260218`.
pub fn snapshot_date(file_name: &str) -> Option<&str> {
    SNAPSHOT_DATE.find(file_name).map(|m| m.as_str())
}

/// Result of syncing one loyalty snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// Rows for this date were already present; nothing was written.
    AlreadySynced,
    /// The given number of rows was appended.
    Appended(usize),
}

/// Syncs a whole snapshot file, using its date as the dedup unit.
///
/// Rows are written with the date injected as a leading column. The worksheet
/// is created with the stamped header when missing.
#[instrument(level = "info", skip(store, batch), fields(rows = batch.len()))]
pub fn sync_snapshot<S>(
    store: &S,
    table_id: &str,
    sheet_name: &str,
    batch: &SourceBatch,
    date: &str,
) -> Result<SnapshotOutcome>
where
    S: TableStore,
{
    let stamped = batch.with_leading_column(DATA_DATE_COLUMN, date);
    let mut table = store.ensure_worksheet(table_id, sheet_name, stamped.columns())?;

    let snapshot = table.snapshot()?;
    if snapshot.is_blank() {
        table.append_header(stamped.columns())?;
    } else if snapshot.rows.iter().any(|row| row.get(0) == Some(date)) {
        info!(date, sheet_name, "snapshot already synced, skipping file");
        return Ok(SnapshotOutcome::AlreadySynced);
    }

    let rows = stamped.into_rows();
    if !rows.is_empty() {
        table.append_rows(&rows)?;
    }
    info!(count = rows.len(), sheet_name, "synced snapshot rows");
    Ok(SnapshotOutcome::Appended(rows.len()))
}
