use crate::ichef::ledger::merge::alias::AliasMap;
use crate::ichef::ledger::model::SourceRecord;

/// Projects a source record onto `header`, one value per target column.
///
/// A column is taken verbatim when the source has it, through its alias when
/// only the alternate name is present, and left blank otherwise.
pub fn resolve_row(header: &[String], record: &SourceRecord<'_>, aliases: &AliasMap) -> Vec<String> {
    header
        .iter()
        .map(|column| {
            let column = column.trim();
            record
                .get(column)
                .or_else(|| aliases.get(column).and_then(|alias| record.get(alias)))
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}
