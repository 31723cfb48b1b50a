//! Core library for the ichef-ledger command line application.
//!
//! The library reconciles point-of-sale export batches into append-only
//! tables. Source parsing and the table store live under
//! [`ichef::ledger::io`], the batch and row representations in
//! [`ichef::ledger::model`], the reconciliation logic (void filtering, column
//! resolution, deduplication, new-entity detection) in
//! [`ichef::ledger::merge`], and the run orchestration under
//! [`ichef::ledger::sync`].

pub mod ichef;

pub use ichef::ledger::{
    Result, SyncError, config, error, io, maintenance, merge, model, schema, store, sync,
};
