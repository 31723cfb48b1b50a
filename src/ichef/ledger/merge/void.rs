use tracing::info;

use crate::ichef::ledger::model::SourceBatch;
use crate::ichef::ledger::schema::{STATUS_COLUMN, VOID_MARKER};

/// Drops voided transactions from a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoidFilter {
    pub status_column: String,
    pub marker: String,
}

impl Default for VoidFilter {
    fn default() -> Self {
        Self {
            status_column: STATUS_COLUMN.to_string(),
            marker: VOID_MARKER.to_string(),
        }
    }
}

impl VoidFilter {
    /// Returns the rows whose status does not contain the marker, together
    /// with the number removed. A batch without the status column is returned
    /// unchanged.
    pub fn apply(&self, batch: &SourceBatch) -> (SourceBatch, usize) {
        if !batch.has_column(&self.status_column) {
            return (batch.clone(), 0);
        }

        let kept = batch.retain(|record| {
            !record
                .get(&self.status_column)
                .is_some_and(|status| status.contains(self.marker.as_str()))
        });
        let removed = batch.len() - kept.len();
        if removed > 0 {
            info!(removed, marker = %self.marker, "filtered voided rows");
        }
        (kept, removed)
    }
}
