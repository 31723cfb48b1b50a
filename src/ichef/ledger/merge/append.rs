use tracing::{debug, info, instrument, warn};

use crate::ichef::ledger::error::{Result, SyncError};
use crate::ichef::ledger::merge::alias::AliasMap;
use crate::ichef::ledger::merge::dedup::{DedupIndex, KeyColumns};
use crate::ichef::ledger::merge::resolve::resolve_row;
use crate::ichef::ledger::merge::transform::SourceTransform;
use crate::ichef::ledger::merge::void::VoidFilter;
use crate::ichef::ledger::model::SourceBatch;
use crate::ichef::ledger::store::TargetTable;

/// Counters describing what a single merge did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Rows removed by the void filter.
    pub voided: usize,
    /// Rows skipped because their key was already synced.
    pub skipped_duplicates: usize,
    /// Rows skipped because no target column received a value.
    pub skipped_blank: usize,
    /// Rows written by the commit.
    pub appended: usize,
    /// Whether the header row was written by this merge.
    pub bootstrapped: bool,
    /// Whether deduplication was disabled for lack of key columns.
    pub dedup_degraded: bool,
}

impl MergeOutcome {
    pub fn nothing_new(&self) -> bool {
        self.appended == 0
    }
}

/// Filter, align, deduplicate and append one batch into a target table.
#[derive(Debug, Clone)]
pub struct AppendMerge<'a> {
    aliases: &'a AliasMap,
    void_filter: VoidFilter,
    key_columns: KeyColumns,
    transforms: Vec<SourceTransform>,
}

impl<'a> AppendMerge<'a> {
    pub fn new(aliases: &'a AliasMap) -> Self {
        Self {
            aliases,
            void_filter: VoidFilter::default(),
            key_columns: KeyColumns::default(),
            transforms: Vec::new(),
        }
    }

    pub fn with_key_columns(mut self, key_columns: KeyColumns) -> Self {
        self.key_columns = key_columns;
        self
    }

    pub fn with_transform(mut self, transform: SourceTransform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Runs the merge. Any store error aborts before rows are committed.
    #[instrument(level = "info", skip_all, fields(source_rows = batch.len()))]
    pub fn merge<T>(&self, table: &mut T, batch: &SourceBatch) -> Result<MergeOutcome>
    where
        T: TargetTable + ?Sized,
    {
        let (filtered, voided) = self.void_filter.apply(batch);
        let filtered = self
            .transforms
            .iter()
            .fold(filtered, |batch, transform| transform.apply(batch));

        let mut outcome = MergeOutcome {
            voided,
            ..MergeOutcome::default()
        };

        let snapshot = table.snapshot()?;
        let (header, existing) = if snapshot.is_blank() {
            let header = filtered.columns().to_vec();
            if !header.is_empty() {
                table.append_header(&header)?;
                outcome.bootstrapped = true;
                info!(columns = header.len(), "wrote header to empty table");
            }
            (header, Vec::new())
        } else if snapshot.header.is_empty() {
            return Err(SyncError::RemoteAccess(format!(
                "table has {} rows but no header",
                snapshot.rows.len()
            )));
        } else {
            (snapshot.header, snapshot.rows)
        };

        let mut index = DedupIndex::build(&header, &existing, &self.key_columns);
        if index.is_degraded() {
            warn!(
                identifier = %self.key_columns.identifier,
                timestamp = %self.key_columns.timestamp,
                "key columns not found in table header; deduplication disabled"
            );
            outcome.dedup_degraded = true;
        }
        debug!(existing_keys = index.len(), "dedup index built");

        let mut pending = Vec::new();
        for record in filtered.records() {
            let key = self.key_columns.key_of(&record);
            if index.is_duplicate(&key) {
                outcome.skipped_duplicates += 1;
                continue;
            }
            let row = resolve_row(&header, &record, self.aliases);
            if row.iter().all(|cell| cell.is_empty()) {
                outcome.skipped_blank += 1;
                continue;
            }
            pending.push(row);
            index.add(key);
        }

        if pending.is_empty() {
            info!(
                skipped = outcome.skipped_duplicates,
                blank = outcome.skipped_blank,
                "no new rows after deduplication"
            );
            return Ok(outcome);
        }

        table.append_rows(&pending)?;
        outcome.appended = pending.len();
        info!(
            appended = outcome.appended,
            skipped = outcome.skipped_duplicates,
            "appended new rows"
        );
        Ok(outcome)
    }
}
