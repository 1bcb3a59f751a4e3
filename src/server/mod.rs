//! Development remote store.
//!
//! Serves the same table dialect as the hosted service over a local SQLite
//! database, so the remote path of the CLI can run without a hosted project.

pub mod routes;
pub mod storage;

pub use routes::{router, AppState};
pub use storage::{is_known_table, RecordStore, RecordStoreError};
