use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::ichef::ledger::error::{Result, SyncError};
use crate::ichef::ledger::model::TableSnapshot;
use crate::ichef::ledger::store::{TableStore, TargetTable};

/// In-process table holding raw values, the first row being the header.
///
/// Clones share the same rows, so a table handed out by [`MemoryStore`]
/// writes through to the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    values: Rc<RefCell<Vec<Vec<String>>>>,
}

impl MemoryTable {
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        Self {
            values: Rc::new(RefCell::new(values)),
        }
    }

    /// Raw content, header included.
    pub fn values(&self) -> Vec<Vec<String>> {
        self.values.borrow().clone()
    }
}

impl TargetTable for MemoryTable {
    fn snapshot(&self) -> Result<TableSnapshot> {
        Ok(TableSnapshot::from_values(self.values()))
    }

    fn append_header(&mut self, names: &[String]) -> Result<()> {
        self.values.borrow_mut().push(names.to_vec());
        Ok(())
    }

    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<()> {
        self.values.borrow_mut().extend(rows.iter().cloned());
        Ok(())
    }

    fn replace_all(&mut self, header: &[String], rows: &[Vec<String>]) -> Result<()> {
        *self.values.borrow_mut() = std::iter::once(header.to_vec())
            .chain(rows.iter().cloned())
            .collect();
        Ok(())
    }
}

/// Table store keeping every worksheet in memory, keyed by table id and
/// sheet name.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<BTreeMap<(String, String), MemoryTable>>,
}

impl MemoryStore {
    /// Registers a worksheet holding `values`, replacing any previous one.
    pub fn insert(&self, table_id: &str, sheet_name: &str, values: Vec<Vec<String>>) {
        self.tables.borrow_mut().insert(
            (table_id.to_string(), sheet_name.to_string()),
            MemoryTable::from_values(values),
        );
    }

    /// Raw content of a worksheet, if it exists.
    pub fn values(&self, table_id: &str, sheet_name: &str) -> Option<Vec<Vec<String>>> {
        self.tables
            .borrow()
            .get(&(table_id.to_string(), sheet_name.to_string()))
            .map(MemoryTable::values)
    }
}

impl TableStore for MemoryStore {
    type Table = MemoryTable;

    fn worksheet(&self, table_id: &str, sheet_name: &str) -> Result<MemoryTable> {
        self.tables
            .borrow()
            .get(&(table_id.to_string(), sheet_name.to_string()))
            .cloned()
            .ok_or_else(|| SyncError::WorksheetNotFound {
                table: table_id.to_string(),
                sheet: sheet_name.to_string(),
            })
    }

    fn ensure_worksheet(
        &self,
        table_id: &str,
        sheet_name: &str,
        initial_header: &[String],
    ) -> Result<MemoryTable> {
        let mut tables = self.tables.borrow_mut();
        let table = tables
            .entry((table_id.to_string(), sheet_name.to_string()))
            .or_insert_with(|| {
                let values = if initial_header.is_empty() {
                    Vec::new()
                } else {
                    vec![initial_header.to_vec()]
                };
                MemoryTable::from_values(values)
            });
        Ok(table.clone())
    }
}
