use std::path::Path;

use calamine::{DataType, Range, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::ichef::ledger::error::{Result, SyncError};
use crate::ichef::ledger::model::SourceBatch;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads the first worksheet of an `.xls`/`.xlsx` export as a source batch.
///
/// The first row is the header. Rows with no value at all are dropped.
pub fn read_batch(path: &Path) -> Result<SourceBatch> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SyncError::parse(path, "workbook has no worksheets"))??;

    let mut rows = range_values(&range).into_iter();
    let mut columns = rows.next().unwrap_or_default();
    while columns.last().is_some_and(|name| name.trim().is_empty()) {
        columns.pop();
    }
    if columns.is_empty() {
        return Err(SyncError::parse(path, "missing header row"));
    }

    let rows = rows
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();
    Ok(SourceBatch::new(columns, rows))
}

/// Converts a range into rows of strings anchored at cell `A1`.
///
/// calamine trims leading empty rows and columns from a range; they are
/// restored here so positions match the sheet.
pub(crate) fn range_values(range: &Range<DataType>) -> Vec<Vec<String>> {
    let Some((row_offset, col_offset)) = range.start() else {
        return Vec::new();
    };

    let mut values: Vec<Vec<String>> = (0..row_offset).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut cells = vec![String::new(); col_offset as usize];
        cells.extend(row.iter().map(|cell| cell_to_string(Some(cell))));
        values.push(cells);
    }
    values
}

pub(crate) fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::DateTime(serial)) => serial_to_datetime(*serial)
            .map(|datetime| datetime.format(DATETIME_FORMAT).to_string())
            .unwrap_or_else(|| serial.to_string()),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Converts an Excel serial date (days since 1899-12-30, 1900 system) to a
/// timestamp rounded to the second.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::try_seconds(seconds)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_dates_render_like_timestamps() {
        assert_eq!(
            cell_to_string(Some(&DataType::DateTime(46071.5))),
            "2026-02-18 12:00:00"
        );
    }

    #[test]
    fn whole_floats_have_no_fraction() {
        assert_eq!(cell_to_string(Some(&DataType::Float(320.0))), "320");
        assert_eq!(cell_to_string(None), "");
    }
}
