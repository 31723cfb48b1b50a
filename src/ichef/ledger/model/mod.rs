use std::collections::HashMap;

/// One parsed source file: named columns and ordered rows of string cells.
///
/// Column names keep their original spelling for header bootstrap, while
/// lookups go through the trimmed name so stray whitespace in an export does
/// not hide a column.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBatch {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl SourceBatch {
    /// Builds a batch, padding or truncating each row to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            // First occurrence wins when an export repeats a header.
            index.entry(name.trim().to_string()).or_insert(position);
        }

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self {
            columns,
            index,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column with the given (trimmed) name.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column.trim()).copied()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// First column whose name contains `marker`.
    pub fn find_column(&self, marker: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|name| name.contains(marker))
            .map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = SourceRecord<'_>> {
        self.rows.iter().map(move |values| SourceRecord {
            batch: self,
            values,
        })
    }

    /// Returns a new batch holding only the rows accepted by `keep`.
    pub fn retain<F>(&self, mut keep: F) -> SourceBatch
    where
        F: FnMut(&SourceRecord<'_>) -> bool,
    {
        let rows = self
            .records()
            .filter(|record| keep(record))
            .map(|record| record.values.to_vec())
            .collect();
        SourceBatch {
            columns: self.columns.clone(),
            index: self.index.clone(),
            rows,
        }
    }

    /// Returns a new batch with `f` applied to every value of `column`.
    pub fn map_column<F>(&self, column: &str, f: F) -> SourceBatch
    where
        F: Fn(&str) -> String,
    {
        let mut batch = self.clone();
        if let Some(position) = self.position(column) {
            for row in &mut batch.rows {
                row[position] = f(&row[position]);
            }
        }
        batch
    }

    /// Returns a new batch with `column` inserted in front, every row carrying
    /// `value`.
    pub fn with_leading_column(&self, column: &str, value: &str) -> SourceBatch {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(column.to_string());
        columns.extend(self.columns.iter().cloned());

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = Vec::with_capacity(row.len() + 1);
                cells.push(value.to_string());
                cells.extend(row.iter().cloned());
                cells
            })
            .collect();

        SourceBatch::new(columns, rows)
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

/// Borrowed view of one source row that resolves values by column name.
#[derive(Debug, Clone, Copy)]
pub struct SourceRecord<'a> {
    batch: &'a SourceBatch,
    values: &'a [String],
}

impl<'a> SourceRecord<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.batch
            .position(column)
            .and_then(|position| self.values.get(position))
            .map(String::as_str)
    }

    pub fn values(&self) -> &'a [String] {
        self.values
    }
}

/// A target-table row, addressed by header position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    cells: Vec<String>,
}

impl Record {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.cells.get(position).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// Header and data rows of a target table, read once per merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSnapshot {
    pub header: Vec<String>,
    pub rows: Vec<Record>,
}

impl TableSnapshot {
    /// Builds a snapshot from raw values where the first row is the header.
    pub fn from_values(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut header = values.remove(0);
        while header.last().is_some_and(|name| name.is_empty()) {
            header.pop();
        }
        Self {
            header,
            rows: values.into_iter().map(Record::new).collect(),
        }
    }

    /// True when the table carries neither header nor data.
    pub fn is_blank(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        let column = column.trim();
        self.header.iter().position(|name| name.trim() == column)
    }

    /// Trimmed values of the named column across every row.
    pub fn column_values(&self, column: &str) -> Vec<String> {
        match self.position(column) {
            Some(position) => self
                .rows
                .iter()
                .filter_map(|row| row.get(position))
                .map(|value| value.trim().to_string())
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn lookups_ignore_surrounding_whitespace() {
        let batch = SourceBatch::new(
            strings(&[" 發票號碼 ", "結帳時間"]),
            vec![strings(&["AB-1", "2026/02/18 12:00"])],
        );
        let record = batch.records().next().expect("one record");
        assert_eq!(record.get("發票號碼"), Some("AB-1"));
        assert_eq!(record.get(" 結帳時間"), Some("2026/02/18 12:00"));
        assert_eq!(record.get("備註"), None);
    }

    #[test]
    fn short_rows_are_padded() {
        let batch = SourceBatch::new(strings(&["a", "b", "c"]), vec![strings(&["1"])]);
        let record = batch.records().next().expect("one record");
        assert_eq!(record.values(), strings(&["1", "", ""]).as_slice());
    }

    #[test]
    fn snapshot_drops_trailing_blank_header_cells() {
        let snapshot = TableSnapshot::from_values(vec![
            strings(&["name", "date", ""]),
            strings(&["x", "1", "extra"]),
        ]);
        assert_eq!(snapshot.header, strings(&["name", "date"]));
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.column_values("name"), strings(&["x"]));
    }

    #[test]
    fn leading_column_is_prepended() {
        let batch = SourceBatch::new(strings(&["card"]), vec![strings(&["gold"])]);
        let stamped = batch.with_leading_column("Data_Date", "20260218");
        assert_eq!(stamped.columns(), strings(&["Data_Date", "card"]).as_slice());
        assert_eq!(stamped.into_rows(), vec![strings(&["20260218", "gold"])]);
    }
}
