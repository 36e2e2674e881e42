//! Tier 1: raw key-value storage ([`KvStore`]).
//!
//! Namespaced `get`/`set`/`delete`/`list_keys` over byte blobs. Used by the
//! checkpoint and audit crates as the substrate beneath their typed APIs.
//! [`SurrealKvStore`] persists to disk via `SurrealDB`'s embedded `SurrealKV`
//! engine; [`MemoryKvStore`] is the in-process fallback used by tests and by
//! any deployment that does not need durability across restarts.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};

/// One stored key-value entry, namespace-qualified.
#[derive(Debug, Clone)]
pub struct KvEntry {
    /// Namespace the key belongs to (e.g. `"checkpoint:steps"`).
    pub namespace: String,
    /// Key within the namespace.
    pub key: String,
    /// Raw stored bytes.
    pub value: Vec<u8>,
}

/// Namespaced byte-level key-value store.
///
/// Implementations must be thread-safe; callers never share a raw connection
/// (spec §5 "adapters encapsulate their own connection pools").
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch a value by namespace and key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to read.
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Store a value, overwriting any existing value at the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to write.
    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()>;

    /// Delete a value by namespace and key. No-op if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to delete.
    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<()>;

    /// List all keys in a namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to enumerate keys.
    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>>;

    /// List all keys with the given prefix within a namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to enumerate keys.
    async fn scan_prefix(&self, namespace: &str, prefix: &str) -> StorageResult<Vec<KvEntry>>;
}

/// In-process key-value store backed by a `BTreeMap`. No durability across
/// restarts; used by tests and small/demo deployments (spec §0.4: tests
/// needing a `KvStore` use the in-memory backend, touching neither the
/// filesystem nor the network).
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    data: RwLock<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryKvStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let data = self.data.read().await;
        Ok(data.get(&(namespace.to_owned(), key.to_owned())).cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()> {
        let mut data = self.data.write().await;
        data.insert((namespace.to_owned(), key.to_owned()), value);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<()> {
        let mut data = self.data.write().await;
        data.remove(&(namespace.to_owned(), key.to_owned()));
        Ok(())
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, k)| k.clone())
            .collect())
    }

    async fn scan_prefix(&self, namespace: &str, prefix: &str) -> StorageResult<Vec<KvEntry>> {
        let data = self.data.read().await;
        Ok(data
            .iter()
            .filter(|((ns, k), _)| ns == namespace && k.starts_with(prefix))
            .map(|((ns, k), v)| KvEntry {
                namespace: ns.clone(),
                key: k.clone(),
                value: v.clone(),
            })
            .collect())
    }
}

/// `SurrealKV`-backed, disk-persistent key-value store.
///
/// Wraps an embedded `SurrealDB` instance configured with the `SurrealKV`
/// storage engine, storing each namespace as a table and each key as a
/// record id, so the same embedded engine backs both [`KvStore`] and
/// [`crate::db::Database`] without a second storage dependency.
pub struct SurrealKvStore {
    inner: Arc<surrealdb::Surreal<surrealdb::engine::any::Any>>,
}

impl SurrealKvStore {
    /// Open (or create) a `SurrealKV`-backed store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the embedded engine fails to
    /// open.
    pub async fn open(path: &str) -> StorageResult<Self> {
        let endpoint = format!("surrealkv://{path}");
        let db: surrealdb::Surreal<surrealdb::engine::any::Any> = surrealdb::Surreal::init();
        db.connect(&endpoint)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        db.use_ns("bestbox")
            .use_db("kv")
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(db),
        })
    }
}

#[async_trait]
impl KvStore for SurrealKvStore {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let row: Option<StoredValue> = self
            .inner
            .select((namespace, key))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(row.map(|r| r.value))
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()> {
        let _: Option<StoredValue> = self
            .inner
            .upsert((namespace, key))
            .content(StoredValue { value })
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<()> {
        let _: Option<StoredValue> = self
            .inner
            .delete((namespace, key))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        let rows: Vec<surrealdb::sql::Thing> = self
            .inner
            .query(format!("SELECT VALUE id FROM type::table($tb)"))
            .bind(("tb", namespace.to_owned()))
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .take(0)
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(rows.into_iter().map(|t| t.id.to_raw()).collect())
    }

    async fn scan_prefix(&self, namespace: &str, prefix: &str) -> StorageResult<Vec<KvEntry>> {
        let keys = self.list_keys(namespace).await?;
        let mut entries = Vec::new();
        for key in keys.into_iter().filter(|k| k.starts_with(prefix)) {
            if let Some(value) = self.get(namespace, &key).await? {
                entries.push(KvEntry {
                    namespace: namespace.to_owned(),
                    key,
                    value,
                });
            }
        }
        Ok(entries)
    }
}

impl std::fmt::Debug for SurrealKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealKvStore").finish_non_exhaustive()
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct StoredValue {
    value: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryKvStore::new();
        store.set("ns", "k1", b"hello".to_vec()).await.unwrap();
        assert_eq!(store.get("ns", "k1").await.unwrap(), Some(b"hello".to_vec()));
        assert_eq!(store.get("ns", "missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_store_delete() {
        let store = MemoryKvStore::new();
        store.set("ns", "k1", b"hello".to_vec()).await.unwrap();
        store.delete("ns", "k1").await.unwrap();
        assert_eq!(store.get("ns", "k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_store_scan_prefix() {
        let store = MemoryKvStore::new();
        store.set("ns", "turn:1:step:0", vec![0]).await.unwrap();
        store.set("ns", "turn:1:step:1", vec![1]).await.unwrap();
        store.set("ns", "turn:2:step:0", vec![2]).await.unwrap();
        let entries = store.scan_prefix("ns", "turn:1:").await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn memory_store_namespaces_are_isolated() {
        let store = MemoryKvStore::new();
        store.set("ns_a", "k", vec![1]).await.unwrap();
        assert_eq!(store.get("ns_b", "k").await.unwrap(), None);
    }
}
