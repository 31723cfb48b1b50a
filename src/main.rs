use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ichef_ledger::config::{SyncConfig, TableKey};
use ichef_ledger::io::FileBatchReader;
use ichef_ledger::io::archive::DirectoryArchiver;
use ichef_ledger::io::workbook::WorkbookStore;
use ichef_ledger::maintenance;
use ichef_ledger::schema::{CHECKOUT_TIME, PHONE_COLUMNS};
use ichef_ledger::store::TableStore;
use ichef_ledger::sync::SyncService;
use ichef_ledger::{Result, SyncError};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| SyncError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let config = SyncConfig::load(&cli.config)?;
    let store = WorkbookStore::new(config.store_root());

    match cli.command {
        Command::Sync => execute_sync(&config, &store),
        Command::Dedupe(args) => {
            let mut table = open_table(&config, &store, args.table)?;
            let removed = maintenance::deduplicate(&mut table, &args.columns)?;
            println!("removed {removed} duplicate rows");
            Ok(())
        }
        Command::CleanPhones(args) => {
            let columns = if args.columns.is_empty() {
                PHONE_COLUMNS.iter().map(|c| c.to_string()).collect()
            } else {
                args.columns
            };
            let mut table = open_table(&config, &store, args.table)?;
            let changed = maintenance::clean_phones(&mut table, &columns)?;
            println!("normalised {changed} phone numbers");
            Ok(())
        }
        Command::PurgeBlank(args) => {
            let mut table = open_table(&config, &store, args.table)?;
            let removed =
                maintenance::purge_blank(&mut table, &args.timestamp, &args.prefix, &args.required)?;
            println!("purged {removed} blank rows");
            Ok(())
        }
    }
}

fn execute_sync(config: &SyncConfig, store: &WorkbookStore) -> Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "starting POS export sync");
    let reader = FileBatchReader;
    let archiver = DirectoryArchiver::new(config.archive_dir());
    let report = SyncService::new(config, store, &reader, &archiver).run()?;

    println!(
        "synced {} files ({} archived), appended {} rows, skipped {} duplicates, \
         filtered {} voided, added {} products, {} snapshots already present",
        report.files_synced,
        report.files_archived,
        report.rows_appended,
        report.duplicates_skipped,
        report.rows_voided,
        report.entities_added,
        report.snapshots_already_synced,
    );
    if report.files_unconfigured > 0 {
        println!("{} files skipped: table not configured", report.files_unconfigured);
    }
    for failure in &report.failures {
        println!("failed: {} ({})", failure.path.display(), failure.message);
    }
    Ok(())
}

fn open_table(
    config: &SyncConfig,
    store: &WorkbookStore,
    table: TableArg,
) -> Result<<WorkbookStore as TableStore>::Table> {
    let entry = config.table(table.into())?;
    store.worksheet(&entry.id, &entry.sheet_name)
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconcile POS export batches into append-only tables."
)]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sync every export waiting in the intake directories.
    Sync,
    /// Rewrite a table keeping the last row per unique column combination.
    Dedupe(DedupeArgs),
    /// Strip leading zeros from phone number columns.
    CleanPhones(CleanPhonesArgs),
    /// Drop rows inside a timestamp window whose required column is blank.
    PurgeBlank(PurgeBlankArgs),
}

#[derive(clap::Args)]
struct DedupeArgs {
    /// Table to rewrite.
    #[arg(long, value_enum)]
    table: TableArg,

    /// Columns forming the unique key, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    columns: Vec<String>,
}

#[derive(clap::Args)]
struct CleanPhonesArgs {
    /// Table to rewrite.
    #[arg(long, value_enum)]
    table: TableArg,

    /// Phone columns, comma separated. Defaults to the order export's.
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,
}

#[derive(clap::Args)]
struct PurgeBlankArgs {
    /// Table to rewrite.
    #[arg(long, value_enum)]
    table: TableArg,

    /// Timestamp prefix selecting the rows to inspect, e.g. `2026/02`.
    #[arg(long)]
    prefix: String,

    /// Column that must not be blank.
    #[arg(long)]
    required: String,

    /// Timestamp column matched against the prefix.
    #[arg(long, default_value = CHECKOUT_TIME)]
    timestamp: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TableArg {
    Orders,
    ProductSales,
    ProductMaster,
    RewardCards,
    RewardPoints,
}

impl From<TableArg> for TableKey {
    fn from(arg: TableArg) -> Self {
        match arg {
            TableArg::Orders => TableKey::Orders,
            TableArg::ProductSales => TableKey::ProductSales,
            TableArg::ProductMaster => TableKey::ProductMaster,
            TableArg::RewardCards => TableKey::RewardCards,
            TableArg::RewardPoints => TableKey::RewardPoints,
        }
    }
}
