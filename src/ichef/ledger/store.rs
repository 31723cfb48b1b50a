//! Boundary to the table store the engine syncs into.

use crate::ichef::ledger::error::Result;
use crate::ichef::ledger::model::TableSnapshot;

/// One worksheet of the store.
///
/// `append_rows` is the atomic unit of work: an implementation either writes
/// every row passed to a single call or none of them.
pub trait TargetTable {
    /// Reads the header and all data rows.
    fn snapshot(&self) -> Result<TableSnapshot>;

    /// Writes `names` as the first row of an empty table.
    fn append_header(&mut self, names: &[String]) -> Result<()>;

    /// Appends `rows` below the existing content, preserving their order.
    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<()>;

    /// Clears the table and writes `header` followed by `rows`.
    fn replace_all(&mut self, header: &[String], rows: &[Vec<String>]) -> Result<()>;
}

/// Opens worksheets by table id and worksheet name.
pub trait TableStore {
    type Table: TargetTable;

    /// Opens an existing worksheet, failing with
    /// [`SyncError::WorksheetNotFound`](crate::ichef::ledger::error::SyncError::WorksheetNotFound)
    /// when it is absent.
    fn worksheet(&self, table_id: &str, sheet_name: &str) -> Result<Self::Table>;

    /// Opens a worksheet, creating it with `initial_header` when absent.
    fn ensure_worksheet(
        &self,
        table_id: &str,
        sheet_name: &str,
        initial_header: &[String],
    ) -> Result<Self::Table>;
}
