//! Document stores for per-student attendance.
//!
//! One document per registration id, holding an `attendance` map of subject
//! code → percentage. Writes are partial merges: a key absent from an
//! upsert is never cleared.
//!
//! - [`SqliteStore`]: persistent store behind a single shared connection.
//! - [`MemoryStore`]: in-process store for tests and for a web service
//!   started without a store path.
//! - [`sync_table`]: push a whole extraction run into a store.

pub mod memory;
pub mod sqlite;
pub mod sync;

#[cfg(test)]
mod conformance;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use sync::{SyncReport, sync_table};
// Re-export the trait and its types from core
pub use attendex_core::{
    AttendanceMap, DocumentStore, StoreError, StudentDocument, UpsertOutcome,
};
