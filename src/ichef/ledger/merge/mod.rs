//! Reconciliation of source batches into append-only tables.

pub mod alias;
pub mod append;
pub mod dedup;
pub mod entities;
pub mod loyalty;
pub mod resolve;
pub mod transform;
pub mod void;

pub use alias::AliasMap;
pub use append::{AppendMerge, MergeOutcome};
pub use dedup::{DedupIndex, DedupKey, KeyColumns};
pub use entities::NewEntityDetector;
pub use loyalty::{SnapshotOutcome, snapshot_date, sync_snapshot};
pub use resolve::resolve_row;
pub use transform::SourceTransform;
pub use void::VoidFilter;
