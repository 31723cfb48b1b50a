use std::collections::HashSet;

use tracing::{info, instrument, warn};

use crate::ichef::ledger::error::{Result, SyncError};
use crate::ichef::ledger::model::SourceBatch;
use crate::ichef::ledger::schema::{PRODUCT_MASTER_COLUMNS, PRODUCT_NAME_MARKERS, UNCLASSIFIED};
use crate::ichef::ledger::store::TargetTable;

/// Appends stub master rows for names the master table does not know yet.
///
/// A stub row is `[name, placeholders..., detection date]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntityDetector {
    /// Column of the master table holding the entity name.
    pub master_column: String,
    /// Source column markers, tried in order; the first column containing one
    /// of them is the name column.
    pub source_markers: Vec<String>,
    /// Values written between the name and the trailing date.
    pub placeholders: Vec<String>,
    /// Header written to an empty master table, name column first.
    pub header: Vec<String>,
}

impl NewEntityDetector {
    /// Product-name detector with the default stub layout
    /// `[name, new name, category, sub-category, date]`.
    pub fn products(master_column: impl Into<String>) -> Self {
        let master_column = master_column.into();
        Self {
            source_markers: PRODUCT_NAME_MARKERS.iter().map(|m| m.to_string()).collect(),
            placeholders: vec![
                String::new(),
                UNCLASSIFIED.to_string(),
                UNCLASSIFIED.to_string(),
            ],
            header: std::iter::once(master_column.clone())
                .chain(PRODUCT_MASTER_COLUMNS.iter().map(|c| c.to_string()))
                .collect(),
            master_column,
        }
    }

    /// Name column of `batch`, if any marker matches.
    pub fn source_column<'b>(&self, batch: &'b SourceBatch) -> Option<&'b str> {
        self.source_markers
            .iter()
            .find_map(|marker| batch.find_column(marker))
    }

    /// Stub rows for every distinct, non-empty name absent from `existing`.
    pub fn stubs(
        &self,
        batch: &SourceBatch,
        name_column: &str,
        existing: &mut HashSet<String>,
        date: &str,
    ) -> Vec<Vec<String>> {
        let mut stubs = Vec::new();
        for record in batch.records() {
            let name = record.get(name_column).unwrap_or_default().trim();
            if name.is_empty() || existing.contains(name) {
                continue;
            }
            let mut row = Vec::with_capacity(self.placeholders.len() + 2);
            row.push(name.to_string());
            row.extend(self.placeholders.iter().cloned());
            row.push(date.to_string());
            stubs.push(row);
            existing.insert(name.to_string());
        }
        stubs
    }

    /// Detects new names in `batch` and appends their stubs to `master`.
    ///
    /// Returns the number of stubs appended; a batch without a name column
    /// appends nothing. An empty master gets the stub header first. A master
    /// whose header lacks the name column is rejected, since its names cannot
    /// be compared.
    #[instrument(level = "info", skip_all, fields(master_column = %self.master_column))]
    pub fn detect<T>(&self, master: &mut T, batch: &SourceBatch, date: &str) -> Result<usize>
    where
        T: TargetTable + ?Sized,
    {
        let Some(name_column) = self.source_column(batch) else {
            warn!(markers = ?self.source_markers, "no name column in source batch");
            return Ok(0);
        };

        let snapshot = master.snapshot()?;
        let blank = snapshot.is_blank();
        if !blank && snapshot.position(&self.master_column).is_none() {
            return Err(SyncError::RemoteAccess(format!(
                "master table has no '{}' column",
                self.master_column
            )));
        }
        let mut existing: HashSet<String> = snapshot
            .column_values(&self.master_column)
            .into_iter()
            .collect();

        let stubs = self.stubs(batch, name_column, &mut existing, date);
        if stubs.is_empty() {
            info!("no new entities found");
            return Ok(0);
        }

        if blank {
            master.append_header(&self.header)?;
            info!(columns = self.header.len(), "wrote header to empty master table");
        }
        master.append_rows(&stubs)?;
        info!(count = stubs.len(), "appended stub records");
        Ok(stubs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ichef::ledger::io::memory::MemoryTable;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn products(names: &[&str]) -> SourceBatch {
        SourceBatch::new(
            strings(&["商品名稱", "數量"]),
            names.iter().map(|name| strings(&[name, "1"])).collect(),
        )
    }

    #[test]
    fn only_unknown_names_get_one_stub_each() {
        let mut master = MemoryTable::from_values(vec![
            strings(&["原始名稱", "新名稱", "大類", "小類", "建立日期"]),
            strings(&["A", "", "", "", ""]),
            strings(&["B ", "", "", "", ""]),
        ]);
        let detector = NewEntityDetector::products("原始名稱");

        let count = detector
            .detect(&mut master, &products(&["A", "C", "C", " B"]), "2026-02-18")
            .expect("detect");

        assert_eq!(count, 1);
        assert_eq!(
            master.values().last().cloned(),
            Some(strings(&["C", "", "未分類", "未分類", "2026-02-18"]))
        );
    }

    #[test]
    fn blank_names_are_ignored() {
        let mut master = MemoryTable::default();
        let detector = NewEntityDetector::products("原始名稱");
        let count = detector
            .detect(&mut master, &products(&["", "  "]), "2026-02-18")
            .expect("detect");
        assert_eq!(count, 0);
        assert!(master.values().is_empty());
    }

    #[test]
    fn empty_master_gets_header_and_stays_idempotent() {
        let mut master = MemoryTable::default();
        let detector = NewEntityDetector::products("原始名稱");

        let first = detector
            .detect(&mut master, &products(&["C", "D"]), "2026-02-18")
            .expect("first detect");
        let second = detector
            .detect(&mut master, &products(&["C", "D"]), "2026-02-19")
            .expect("second detect");

        assert_eq!((first, second), (2, 0));
        assert_eq!(
            master.values(),
            vec![
                strings(&["原始名稱", "新名稱", "大類", "小類", "建立日期"]),
                strings(&["C", "", "未分類", "未分類", "2026-02-18"]),
                strings(&["D", "", "未分類", "未分類", "2026-02-18"]),
            ]
        );
    }

    #[test]
    fn master_without_name_column_is_rejected() {
        let mut master = MemoryTable::from_values(vec![
            strings(&["品名", "大類"]),
            strings(&["A", "飲料"]),
        ]);
        let detector = NewEntityDetector::products("原始名稱");

        let error = detector
            .detect(&mut master, &products(&["C"]), "2026-02-18")
            .expect_err("name column missing");

        assert!(matches!(error, SyncError::RemoteAccess(_)));
        assert_eq!(master.values().len(), 2);
    }

    #[test]
    fn english_export_header_is_recognised() {
        let batch = SourceBatch::new(strings(&["Product Name"]), vec![strings(&["Latte"])]);
        let detector = NewEntityDetector::products("原始名稱");
        assert_eq!(detector.source_column(&batch), Some("Product Name"));
    }

    #[test]
    fn batch_without_name_column_appends_nothing() {
        let mut master = MemoryTable::default();
        let batch = SourceBatch::new(strings(&["數量"]), vec![strings(&["1"])]);
        let detector = NewEntityDetector::products("原始名稱");
        assert_eq!(detector.detect(&mut master, &batch, "2026-02-18").expect("detect"), 0);
    }
}
