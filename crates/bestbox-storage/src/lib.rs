#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! `BestBox` storage — unified persistence layer.
//!
//! Two tiers, both on the same embedded `SurrealDB`/`SurrealKV` engine:
//!
//! - **[`kv`]**: raw namespaced byte key-value access ([`KvStore`]), used by
//!   the checkpointer for CAS-guarded state snapshots.
//! - **[`db`]**: the full `SurrealDB` query engine ([`Database`]), used by
//!   the audit log and thread/turn record stores.
//!
//! Scaling embedded → distributed `TiKV` is a connection-string change, not
//! a code change.

pub mod db;
/// Storage error types.
pub mod error;
pub mod kv;

pub use db::Database;
pub use error::{StorageError, StorageResult};
pub use kv::{KvEntry, KvStore, MemoryKvStore, SurrealKvStore};
