pub mod config;
pub mod error;
pub mod io;
pub mod maintenance;
pub mod merge;
pub mod model;
pub mod schema;
pub mod store;
pub mod sync;

pub use error::{Result, SyncError};
