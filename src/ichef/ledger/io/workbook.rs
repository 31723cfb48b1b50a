use std::fs;
use std::path::{Path, PathBuf};

use calamine::{Reader, Xlsx, open_workbook};
use rust_xlsxwriter::Workbook;
use tracing::{debug, info};

use crate::ichef::ledger::error::{Result, SyncError};
use crate::ichef::ledger::io::excel_read::range_values;
use crate::ichef::ledger::model::TableSnapshot;
use crate::ichef::ledger::store::{TableStore, TargetTable};

/// A worksheet name with its raw values, header first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetValues {
    pub name: String,
    pub values: Vec<Vec<String>>,
}

/// Table store keeping each table id in `<root>/<id>.xlsx`, one worksheet per
/// sheet name.
#[derive(Debug, Clone)]
pub struct WorkbookStore {
    root: PathBuf,
}

impl WorkbookStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of the workbook backing `table_id`.
    pub fn path_for(&self, table_id: &str) -> PathBuf {
        self.root.join(format!("{table_id}.xlsx"))
    }
}

impl TableStore for WorkbookStore {
    type Table = WorkbookTable;

    fn worksheet(&self, table_id: &str, sheet_name: &str) -> Result<WorkbookTable> {
        let path = self.path_for(table_id);
        let sheets = if path.exists() {
            read_sheets(&path)?
        } else {
            Vec::new()
        };
        if !sheets.iter().any(|sheet| sheet.name == sheet_name) {
            return Err(SyncError::WorksheetNotFound {
                table: table_id.to_string(),
                sheet: sheet_name.to_string(),
            });
        }
        Ok(WorkbookTable::new(path, table_id, sheet_name))
    }

    fn ensure_worksheet(
        &self,
        table_id: &str,
        sheet_name: &str,
        initial_header: &[String],
    ) -> Result<WorkbookTable> {
        let path = self.path_for(table_id);
        let mut sheets = if path.exists() {
            read_sheets(&path)?
        } else {
            fs::create_dir_all(&self.root).map_err(|err| store_error(&self.root, err))?;
            Vec::new()
        };

        if !sheets.iter().any(|sheet| sheet.name == sheet_name) {
            info!(table_id, sheet_name, "creating missing worksheet");
            let values = if initial_header.is_empty() {
                Vec::new()
            } else {
                vec![initial_header.to_vec()]
            };
            sheets.push(SheetValues {
                name: sheet_name.to_string(),
                values,
            });
            write_sheets(&path, &sheets)?;
        }
        Ok(WorkbookTable::new(path, table_id, sheet_name))
    }
}

/// One worksheet of a [`WorkbookStore`]. Every read goes to disk; every
/// write rewrites the workbook atomically.
#[derive(Debug, Clone)]
pub struct WorkbookTable {
    path: PathBuf,
    table_id: String,
    sheet_name: String,
}

impl WorkbookTable {
    fn new(path: PathBuf, table_id: &str, sheet_name: &str) -> Self {
        Self {
            path,
            table_id: table_id.to_string(),
            sheet_name: sheet_name.to_string(),
        }
    }

    fn load(&self) -> Result<Vec<SheetValues>> {
        if !self.path.exists() {
            return Err(self.not_found());
        }
        let sheets = read_sheets(&self.path)?;
        if !sheets.iter().any(|sheet| sheet.name == self.sheet_name) {
            return Err(self.not_found());
        }
        Ok(sheets)
    }

    fn update<F>(&self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Vec<String>>),
    {
        let mut sheets = self.load()?;
        if let Some(sheet) = sheets.iter_mut().find(|sheet| sheet.name == self.sheet_name) {
            edit(&mut sheet.values);
        }
        write_sheets(&self.path, &sheets)
    }

    fn not_found(&self) -> SyncError {
        SyncError::WorksheetNotFound {
            table: self.table_id.clone(),
            sheet: self.sheet_name.clone(),
        }
    }
}

impl TargetTable for WorkbookTable {
    fn snapshot(&self) -> Result<TableSnapshot> {
        let values = self
            .load()?
            .into_iter()
            .find(|sheet| sheet.name == self.sheet_name)
            .map(|sheet| sheet.values)
            .unwrap_or_default();
        Ok(TableSnapshot::from_values(values))
    }

    fn append_header(&mut self, names: &[String]) -> Result<()> {
        self.update(|values| values.push(names.to_vec()))
    }

    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<()> {
        debug!(count = rows.len(), sheet = %self.sheet_name, "appending rows");
        self.update(|values| values.extend(rows.iter().cloned()))
    }

    fn replace_all(&mut self, header: &[String], rows: &[Vec<String>]) -> Result<()> {
        self.update(|values| {
            values.clear();
            values.push(header.to_vec());
            values.extend(rows.iter().cloned());
        })
    }
}

/// Reads every worksheet of the workbook at `path`, in workbook order.
///
/// Trailing all-empty rows are not kept; the merge never writes such rows.
pub fn read_sheets(path: &Path) -> Result<Vec<SheetValues>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let names = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .ok_or_else(|| SyncError::RemoteAccess(format!("missing sheet '{name}'")))??;
        let mut values = range_values(&range);
        while values.last().is_some_and(|row| row.iter().all(String::is_empty)) {
            values.pop();
        }
        sheets.push(SheetValues { name, values });
    }
    Ok(sheets)
}

/// Writes `sheets` to `path` through a temporary file renamed over the
/// target, so readers see either the old or the new workbook.
pub fn write_sheets(path: &Path, sheets: &[SheetValues]) -> Result<()> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (row_idx, row) in sheet.values.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                worksheet.write_string(row_idx as u32, col_idx as u16, cell)?;
            }
        }
    }

    let staging = path.with_extension("xlsx.tmp");
    workbook.save(&staging)?;
    fs::rename(&staging, path).map_err(|err| store_error(path, err))?;
    Ok(())
}

fn store_error(path: &Path, err: std::io::Error) -> SyncError {
    SyncError::RemoteAccess(format!("{}: {err}", path.display()))
}
