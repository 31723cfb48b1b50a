//! Destructive rewrites of a whole table. These sit outside the sync path and
//! are only run on demand.

use std::collections::HashMap;

use tracing::{info, instrument};

use crate::ichef::ledger::error::{Result, SyncError};
use crate::ichef::ledger::merge::transform::normalize_phone;
use crate::ichef::ledger::model::{Record, TableSnapshot};
use crate::ichef::ledger::store::TargetTable;

/// Removes rows repeating an earlier row's values in `unique_columns`,
/// keeping the last occurrence in its position. Returns the number removed.
#[instrument(level = "info", skip(table))]
pub fn deduplicate<T>(table: &mut T, unique_columns: &[String]) -> Result<usize>
where
    T: TargetTable + ?Sized,
{
    let snapshot = table.snapshot()?;
    let positions = require_columns(&snapshot, unique_columns)?;

    let key_of = |row: &Record| -> Vec<String> {
        positions
            .iter()
            .map(|&position| row.get(position).unwrap_or_default().to_string())
            .collect()
    };

    let mut last_seen: HashMap<Vec<String>, usize> = HashMap::new();
    for (index, row) in snapshot.rows.iter().enumerate() {
        last_seen.insert(key_of(row), index);
    }

    let kept: Vec<Vec<String>> = snapshot
        .rows
        .iter()
        .enumerate()
        .filter(|&(index, row)| last_seen.get(&key_of(row)) == Some(&index))
        .map(|(_, row)| row.cells().to_vec())
        .collect();

    let removed = snapshot.rows.len() - kept.len();
    if removed > 0 {
        table.replace_all(&snapshot.header, &kept)?;
        info!(removed, "removed duplicate rows");
    } else {
        info!("no duplicates found");
    }
    Ok(removed)
}

/// Strips leading zeros from the phone columns present in the table.
/// Returns the number of cells changed.
#[instrument(level = "info", skip(table))]
pub fn clean_phones<T>(table: &mut T, phone_columns: &[String]) -> Result<usize>
where
    T: TargetTable + ?Sized,
{
    let snapshot = table.snapshot()?;
    let positions: Vec<usize> = phone_columns
        .iter()
        .filter_map(|column| snapshot.position(column))
        .collect();
    if positions.is_empty() {
        return Err(SyncError::RemoteAccess(format!(
            "none of the phone columns {phone_columns:?} exist in the table"
        )));
    }

    let mut changed = 0;
    let rows: Vec<Vec<String>> = snapshot
        .rows
        .iter()
        .map(|row| {
            let mut cells = row.cells().to_vec();
            for &position in &positions {
                if let Some(cell) = cells.get_mut(position) {
                    let cleaned = normalize_phone(cell);
                    if cleaned != *cell {
                        *cell = cleaned;
                        changed += 1;
                    }
                }
            }
            cells
        })
        .collect();

    if changed > 0 {
        table.replace_all(&snapshot.header, &rows)?;
        info!(changed, "normalised phone numbers");
    } else {
        info!("no phone numbers needed cleaning");
    }
    Ok(changed)
}

/// Drops rows whose `timestamp_column` starts with `prefix` while
/// `required_column` is blank. Returns the number removed.
#[instrument(level = "info", skip(table))]
pub fn purge_blank<T>(
    table: &mut T,
    timestamp_column: &str,
    prefix: &str,
    required_column: &str,
) -> Result<usize>
where
    T: TargetTable + ?Sized,
{
    let snapshot = table.snapshot()?;
    let columns = [timestamp_column.to_string(), required_column.to_string()];
    let positions = require_columns(&snapshot, &columns)?;
    let (timestamp, required) = (positions[0], positions[1]);

    let kept: Vec<Vec<String>> = snapshot
        .rows
        .iter()
        .filter(|row| {
            let in_window = row.get(timestamp).unwrap_or_default().starts_with(prefix);
            let blank = row.get(required).unwrap_or_default().trim().is_empty();
            !(in_window && blank)
        })
        .map(|row| row.cells().to_vec())
        .collect();

    let removed = snapshot.rows.len() - kept.len();
    if removed > 0 {
        table.replace_all(&snapshot.header, &kept)?;
        info!(removed, "purged blank rows");
    } else {
        info!("no blank rows found");
    }
    Ok(removed)
}

fn require_columns(snapshot: &TableSnapshot, columns: &[String]) -> Result<Vec<usize>> {
    columns
        .iter()
        .map(|column| {
            snapshot.position(column).ok_or_else(|| {
                SyncError::RemoteAccess(format!("column '{column}' not found in table header"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ichef::ledger::io::memory::MemoryTable;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn deduplicate_keeps_last_occurrence() {
        let mut table = MemoryTable::from_values(vec![
            strings(&["發票號碼", "結帳時間", "結帳金額"]),
            strings(&["A1", "10:00", ""]),
            strings(&["A2", "10:05", "50"]),
            strings(&["A1", "10:00", "100"]),
        ]);

        let removed = deduplicate(&mut table, &strings(&["發票號碼", "結帳時間"])).expect("dedupe");

        assert_eq!(removed, 1);
        assert_eq!(
            table.values(),
            vec![
                strings(&["發票號碼", "結帳時間", "結帳金額"]),
                strings(&["A2", "10:05", "50"]),
                strings(&["A1", "10:00", "100"]),
            ]
        );
    }

    #[test]
    fn deduplicate_requires_known_columns() {
        let mut table = MemoryTable::from_values(vec![strings(&["發票號碼"])]);
        assert!(deduplicate(&mut table, &strings(&["商品名稱"])).is_err());
    }

    #[test]
    fn clean_phones_counts_changed_cells() {
        let mut table = MemoryTable::from_values(vec![
            strings(&["顧客電話", "訂購人電話"]),
            strings(&["0912", "912"]),
            strings(&["0933", "0944"]),
        ]);
        let columns = strings(&["顧客電話", "訂購人電話"]);

        assert_eq!(clean_phones(&mut table, &columns).expect("clean"), 3);
        assert_eq!(clean_phones(&mut table, &columns).expect("clean"), 0);
        assert_eq!(table.values()[2], strings(&["933", "944"]));
    }

    #[test]
    fn purge_blank_only_touches_matching_window() {
        let mut table = MemoryTable::from_values(vec![
            strings(&["結帳時間", "發票金額"]),
            strings(&["2026/02/01 10:00", ""]),
            strings(&["2026/02/01 11:00", "80"]),
            strings(&["2026/01/31 10:00", " "]),
        ]);

        let removed = purge_blank(&mut table, "結帳時間", "2026/02", "發票金額").expect("purge");
        assert_eq!(removed, 1);
        assert_eq!(table.values().len(), 3);
    }
}
