use crate::ichef::ledger::model::SourceBatch;
use crate::ichef::ledger::schema::PHONE_COLUMNS;

/// Per-table rewrite applied to a batch before it is aligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTransform {
    /// Strips leading zeros from the listed phone columns.
    NormalizePhones(Vec<String>),
}

impl SourceTransform {
    /// Phone normalization over the order export's phone columns.
    pub fn order_phones() -> Self {
        SourceTransform::NormalizePhones(PHONE_COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    pub fn apply(&self, batch: SourceBatch) -> SourceBatch {
        match self {
            SourceTransform::NormalizePhones(columns) => columns
                .iter()
                .fold(batch, |batch, column| batch.map_column(column, normalize_phone)),
        }
    }
}

/// Drops leading zeros so numbers match the legacy rows, e.g. `0912345678`
/// becomes `912345678`. Values not starting with `0` are returned untouched.
pub fn normalize_phone(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.starts_with('0') {
        trimmed.trim_start_matches('0').to_string()
    } else {
        value.to_string()
    }
}
