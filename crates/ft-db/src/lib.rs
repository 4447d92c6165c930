//! Storage layer for the focus timer.
//!
//! Everything is persisted as JSON text in a flat key-value store, the same
//! shape a browser `localStorage` or a remote per-user cloud store has. The
//! [`KvStore`] trait is the seam; [`Database`] backs it with `rusqlite` and
//! [`MemoryStore`] keeps it in memory for tests.
//!
//! [`UserStore`] layers typed, per-identity access on top: loading never
//! fails (malformed data is logged and replaced by defaults), saving reports
//! errors so the caller can decide to continue in memory.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`. Use one instance per thread or wrap it in a `Mutex`.
//!
//! # Schema
//!
//! A single `kv` table: `key TEXT PRIMARY KEY`, `value TEXT`, and
//! `updated_at` in milliseconds since the epoch.

mod kv;
pub mod mirror;
mod sqlite;
mod store;

use thiserror::Error;

pub use kv::{KvStore, MemoryStore};
pub use mirror::Mirror;
pub use sqlite::Database;
pub use store::UserStore;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A value could not be serialized for storage.
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
