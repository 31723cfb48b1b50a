use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{error, info, instrument, warn};

use crate::ichef::ledger::config::{SyncConfig, TableKey};
use crate::ichef::ledger::error::{ErrorKind, Result, SyncError};
use crate::ichef::ledger::io::SourceBatchReader;
use crate::ichef::ledger::io::archive::Archiver;
use crate::ichef::ledger::io::discover::{Intake, discover};
use crate::ichef::ledger::merge::{
    AliasMap, AppendMerge, MergeOutcome, NewEntityDetector, SnapshotOutcome, SourceTransform,
    snapshot_date, sync_snapshot,
};
use crate::ichef::ledger::schema::REWARD_POINTS_MARKER;
use crate::ichef::ledger::store::TableStore;

/// A batch that could not be synced; its file stays in the intake directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedBatch {
    pub path: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

/// Totals for one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub files_synced: usize,
    pub files_archived: usize,
    /// Files left alone because their table is not configured.
    pub files_unconfigured: usize,
    pub rows_appended: usize,
    pub rows_voided: usize,
    pub duplicates_skipped: usize,
    pub entities_added: usize,
    pub snapshots_already_synced: usize,
    pub failures: Vec<FailedBatch>,
}

impl RunReport {
    fn absorb(&mut self, outcome: &MergeOutcome) {
        self.rows_appended += outcome.appended;
        self.rows_voided += outcome.voided;
        self.duplicates_skipped += outcome.skipped_duplicates;
    }

    fn fail(&mut self, path: &Path, err: &SyncError) {
        error!(file = %path.display(), error = %err, "batch failed; file left in place");
        self.failures.push(FailedBatch {
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        });
    }
}

/// Runs every discovered batch through the merge protocol, one at a time.
pub struct SyncService<'a, S, R, A> {
    config: &'a SyncConfig,
    store: &'a S,
    reader: &'a R,
    archiver: &'a A,
    aliases: AliasMap,
    detection_date: String,
}

impl<'a, S, R, A> SyncService<'a, S, R, A>
where
    S: TableStore,
    R: SourceBatchReader,
    A: Archiver,
{
    pub fn new(config: &'a SyncConfig, store: &'a S, reader: &'a R, archiver: &'a A) -> Self {
        Self {
            config,
            store,
            reader,
            archiver,
            aliases: config.alias_map(),
            detection_date: Local::now().format("%Y-%m-%d").to_string(),
        }
    }

    /// Overrides the date stamped on stub master rows.
    pub fn with_detection_date(mut self, date: impl Into<String>) -> Self {
        self.detection_date = date.into();
        self
    }

    /// Discovers the intake directories and syncs everything found.
    #[instrument(level = "info", skip_all)]
    pub fn run(&self) -> Result<RunReport> {
        let intake = discover(&self.config.downloads_dir(), &self.config.rewards_dir())?;
        if intake.is_empty() {
            info!("no source files found");
        }
        Ok(self.run_intake(&intake))
    }

    /// Syncs the given files: product exports, then orders, then snapshots.
    pub fn run_intake(&self, intake: &Intake) -> RunReport {
        let mut report = RunReport::default();

        match self.config.table(TableKey::ProductSales) {
            Ok(_) => {
                for path in &intake.product_files {
                    match self.sync_product_file(path, &mut report) {
                        Ok(()) => self.finish(path, &mut report),
                        Err(err) => report.fail(path, &err),
                    }
                }
            }
            Err(err) => self.skip_unconfigured(&intake.product_files, &err, &mut report),
        }

        match self.config.table(TableKey::Orders) {
            Ok(_) => {
                for path in &intake.order_files {
                    match self.sync_order_file(path, &mut report) {
                        Ok(()) => self.finish(path, &mut report),
                        Err(err) => report.fail(path, &err),
                    }
                }
            }
            Err(err) => self.skip_unconfigured(&intake.order_files, &err, &mut report),
        }

        for path in &intake.reward_files {
            match self.sync_reward_file(path, &mut report) {
                Ok(()) => report.files_synced += 1,
                Err(err @ SyncError::ConfigurationMissing(_)) => {
                    warn!(file = %path.display(), error = %err, "skipping snapshot");
                    report.files_unconfigured += 1;
                }
                Err(err) => report.fail(path, &err),
            }
        }

        info!(
            synced = report.files_synced,
            failed = report.failures.len(),
            appended = report.rows_appended,
            "sync run finished"
        );
        report
    }

    /// Merges a line-item export into the sales table, then records new
    /// product names in the master table.
    #[instrument(level = "info", skip(self, path, report), fields(file = %path.display()))]
    pub fn sync_product_file(&self, path: &Path, report: &mut RunReport) -> Result<()> {
        let batch = self.reader.read(path)?;
        let sales = self.config.table(TableKey::ProductSales)?;
        let mut table = self.store.worksheet(&sales.id, &sales.sheet_name)?;
        let outcome = AppendMerge::new(&self.aliases)
            .with_key_columns(sales.key_columns())
            .merge(&mut table, &batch)?;
        report.absorb(&outcome);

        let master = match self.config.table(TableKey::ProductMaster) {
            Ok(master) => master,
            Err(err) => {
                warn!(error = %err, "skipping new product detection");
                return Ok(());
            }
        };
        let Some(name_column) = master.columns.name.as_deref() else {
            warn!(
                table = %TableKey::ProductMaster,
                "columns.name not configured; skipping new product detection"
            );
            return Ok(());
        };
        let mut master_table = self.store.worksheet(&master.id, &master.sheet_name)?;
        report.entities_added += NewEntityDetector::products(name_column).detect(
            &mut master_table,
            &batch,
            &self.detection_date,
        )?;
        Ok(())
    }

    /// Merges an order export, normalising phone numbers first.
    #[instrument(level = "info", skip(self, path, report), fields(file = %path.display()))]
    pub fn sync_order_file(&self, path: &Path, report: &mut RunReport) -> Result<()> {
        let batch = self.reader.read(path)?;
        let orders = self.config.table(TableKey::Orders)?;
        let mut table = self.store.worksheet(&orders.id, &orders.sheet_name)?;
        let outcome = AppendMerge::new(&self.aliases)
            .with_key_columns(orders.key_columns())
            .with_transform(SourceTransform::order_phones())
            .merge(&mut table, &batch)?;
        report.absorb(&outcome);
        Ok(())
    }

    /// Syncs a loyalty snapshot CSV as a whole, keyed by its filename date.
    #[instrument(level = "info", skip(self, path, report), fields(file = %path.display()))]
    pub fn sync_reward_file(&self, path: &Path, report: &mut RunReport) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let key = if file_name.contains(REWARD_POINTS_MARKER) {
            TableKey::RewardPoints
        } else {
            TableKey::RewardCards
        };
        let table = self.config.table(key)?;
        let date = snapshot_date(&file_name)
            .ok_or_else(|| SyncError::parse(path, "no 8-digit date in filename"))?;

        let batch = self.reader.read(path)?;
        match sync_snapshot(self.store, &table.id, &table.sheet_name, &batch, date)? {
            SnapshotOutcome::AlreadySynced => report.snapshots_already_synced += 1,
            SnapshotOutcome::Appended(count) => report.rows_appended += count,
        }
        Ok(())
    }

    fn finish(&self, path: &Path, report: &mut RunReport) {
        report.files_synced += 1;
        match self.archiver.archive(path) {
            Ok(_) => report.files_archived += 1,
            Err(err) => report.fail(path, &err),
        }
    }

    fn skip_unconfigured(&self, files: &[PathBuf], err: &SyncError, report: &mut RunReport) {
        if files.is_empty() {
            return;
        }
        warn!(error = %err, count = files.len(), "skipping files for unconfigured table");
        report.files_unconfigured += files.len();
    }
}
