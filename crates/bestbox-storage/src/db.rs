//! Tier 2: `SurrealDB` query engine interface.
//!
//! [`Database`] wraps a `SurrealDB` connection for the typed stores that sit
//! on top of it — checkpoints, audit log, thread/turn records. In embedded
//! mode it uses the `SurrealKV` engine; the same connection string shape
//! scales to a distributed `TiKV`-backed deployment without a code change.

use crate::error::{StorageError, StorageResult};

/// `SurrealDB` query engine wrapper.
///
/// Cheap to clone: `surrealdb::Surreal` holds its connection behind an
/// `Arc` internally, so cloning shares one underlying connection rather
/// than opening another. `bestbox-server` clones this to hand the same
/// embedded connection to the checkpointer, audit log, and thread store.
#[derive(Clone)]
pub struct Database {
    inner: surrealdb::Surreal<surrealdb::engine::any::Any>,
}

impl Database {
    /// Connect to an embedded `SurrealDB`, persisted to `path` via `SurrealKV`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection fails.
    pub async fn connect_embedded(path: &str) -> StorageResult<Self> {
        let endpoint = format!("surrealkv://{path}");
        Self::connect(&endpoint, "main").await
    }

    /// Connect to an in-memory `SurrealDB` (for tests; spec §0.4).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection fails.
    pub async fn connect_memory() -> StorageResult<Self> {
        Self::connect("mem://", "test").await
    }

    async fn connect(endpoint: &str, db_name: &str) -> StorageResult<Self> {
        let db: surrealdb::Surreal<surrealdb::engine::any::Any> = surrealdb::Surreal::init();
        db.connect(endpoint)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        db.use_ns("bestbox")
            .use_db(db_name)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { inner: db })
    }

    /// Direct access to the underlying client for typed-store `SurrealQL`
    /// queries not covered by this wrapper's surface.
    #[must_use]
    pub fn client(&self) -> &surrealdb::Surreal<surrealdb::engine::any::Any> {
        &self.inner
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connects_in_memory() {
        let db = Database::connect_memory().await.unwrap();
        let _: &surrealdb::Surreal<surrealdb::engine::any::Any> = db.client();
    }
}
