use std::collections::HashSet;

use crate::ichef::ledger::model::{Record, SourceRecord};
use crate::ichef::ledger::schema::{CHECKOUT_TIME, INVOICE_NUMBER};

/// Composite key identifying an already-synced transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub identifier: String,
    pub timestamp: String,
}

impl DedupKey {
    pub fn new(identifier: &str, timestamp: &str) -> Self {
        Self {
            identifier: identifier.trim().to_string(),
            timestamp: timestamp.trim().to_string(),
        }
    }

    /// Keys without an identifier never count as duplicates.
    pub fn is_identified(&self) -> bool {
        !self.identifier.is_empty()
    }
}

/// Names of the columns forming the dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumns {
    pub identifier: String,
    pub timestamp: String,
}

impl Default for KeyColumns {
    fn default() -> Self {
        Self {
            identifier: INVOICE_NUMBER.to_string(),
            timestamp: CHECKOUT_TIME.to_string(),
        }
    }
}

impl KeyColumns {
    /// Key of a source record, reading the columns by exact name.
    pub fn key_of(&self, record: &SourceRecord<'_>) -> DedupKey {
        DedupKey::new(
            record.get(&self.identifier).unwrap_or_default(),
            record.get(&self.timestamp).unwrap_or_default(),
        )
    }

    /// Positions of the key columns in `header`: the first entry containing
    /// each marker.
    pub fn locate(&self, header: &[String]) -> Option<(usize, usize)> {
        let identifier = header
            .iter()
            .position(|name| name.contains(self.identifier.as_str()))?;
        let timestamp = header
            .iter()
            .position(|name| name.contains(self.timestamp.as_str()))?;
        Some((identifier, timestamp))
    }
}

/// Keys already present in a target table plus those accepted this run.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    keys: HashSet<DedupKey>,
    degraded: bool,
}

impl DedupIndex {
    /// Indexes `rows` using the key column positions found in `header`.
    ///
    /// When either column cannot be located the index stays empty and is
    /// flagged as degraded; every row then passes as new.
    pub fn build(header: &[String], rows: &[Record], columns: &KeyColumns) -> Self {
        let Some((identifier, timestamp)) = columns.locate(header) else {
            return Self {
                keys: HashSet::new(),
                degraded: !rows.is_empty(),
            };
        };

        let keys = rows
            .iter()
            .filter_map(|row| Some(DedupKey::new(row.get(identifier)?, row.get(timestamp)?)))
            .collect();

        Self {
            keys,
            degraded: false,
        }
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.keys.contains(key)
    }

    /// True when `key` names a transaction that has already been accepted.
    pub fn is_duplicate(&self, key: &DedupKey) -> bool {
        key.is_identified() && self.contains(key)
    }

    pub fn add(&mut self, key: DedupKey) {
        self.keys.insert(key);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether the key columns were missing from a non-empty table.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn record(values: &[&str]) -> Record {
        Record::new(strings(values))
    }

    #[test]
    fn header_markers_match_by_substring() {
        let header = strings(&["序號", "發票號碼(電子)", "結帳時間 ", "結帳時間2"]);
        assert_eq!(KeyColumns::default().locate(&header), Some((1, 2)));
    }

    #[test]
    fn existing_keys_are_trimmed() {
        let header = strings(&["發票號碼", "結帳時間"]);
        let index = DedupIndex::build(
            &header,
            &[record(&[" AB-1 ", "2026/02/18 12:00 "])],
            &KeyColumns::default(),
        );
        assert!(index.contains(&DedupKey::new("AB-1", "2026/02/18 12:00")));
        assert!(!index.is_degraded());
    }

    #[test]
    fn short_rows_contribute_no_key() {
        let header = strings(&["發票號碼", "備註", "結帳時間"]);
        let index = DedupIndex::build(&header, &[record(&["AB-1"])], &KeyColumns::default());
        assert!(index.is_empty());
    }

    #[test]
    fn missing_key_columns_degrade_to_no_dedup() {
        let header = strings(&["品項", "數量"]);
        let index = DedupIndex::build(&header, &[record(&["tea", "1"])], &KeyColumns::default());
        assert!(index.is_degraded());
        assert!(!index.is_duplicate(&DedupKey::new("tea", "1")));
    }

    #[test]
    fn empty_identifier_is_never_duplicate() {
        let mut index = DedupIndex::default();
        let key = DedupKey::new("  ", "2026/02/18 12:00");
        index.add(key.clone());
        assert!(index.contains(&key));
        assert!(!index.is_duplicate(&key));
    }
}
