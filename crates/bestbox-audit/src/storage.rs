//! Persistence for audit entries, built on [`bestbox_storage::KvStore`].
//!
//! Entries are namespaced by thread so a thread's history can be scanned in
//! one call; within a thread they're keyed by a lexically sortable timestamp
//! so [`KvStore::scan_prefix`] returns them in write order.

use std::sync::Arc;

use async_trait::async_trait;
use bestbox_core::ids::{ThreadId, TurnId};
use bestbox_storage::KvStore;

use crate::entry::AuditEntry;
use crate::error::{AuditError, AuditResult};

const NAMESPACE: &str = "audit_log";

/// Durable backend for audit entries.
///
/// Split out from [`crate::AuditLog`] so the flush loop and any admin query
/// surface share one persistence contract, and so tests can swap in an
/// in-memory double without spinning up `SurrealDB`.
#[async_trait]
pub trait AuditStorage: Send + Sync {
    /// Persist one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store write fails.
    async fn append(&self, entry: AuditEntry) -> AuditResult<()>;

    /// All entries recorded for a thread, in write order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store read fails.
    async fn entries_for_thread(&self, thread_id: ThreadId) -> AuditResult<Vec<AuditEntry>>;

    /// All entries recorded for a single turn, in write order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store read fails.
    async fn entries_for_turn(&self, thread_id: ThreadId, turn_id: TurnId) -> AuditResult<Vec<AuditEntry>>;
}

/// [`AuditStorage`] backed by any [`KvStore`] implementation (in-memory or
/// `SurrealKV`-backed; spec §0.4 uses the in-memory store for tests).
pub struct KvAuditStorage {
    kv: Arc<dyn KvStore>,
}

impl KvAuditStorage {
    /// Wrap a [`KvStore`] as audit storage.
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn key_for(thread_id: ThreadId, turn_id: TurnId, timestamp_nanos: i64, seq: u32) -> String {
        format!("thread:{thread_id}:ts:{timestamp_nanos:020}:seq:{seq:06}:turn:{turn_id}")
    }
}

#[async_trait]
impl AuditStorage for KvAuditStorage {
    async fn append(&self, entry: AuditEntry) -> AuditResult<()> {
        let bytes = serde_json::to_vec(&entry).map_err(|e| AuditError::Serialization(e.to_string()))?;
        let nanos = entry.timestamp.into_inner().timestamp_nanos_opt().unwrap_or_default();
        // Random low bits keep keys unique when two entries share a nanosecond.
        let seq = rand::random::<u32>() % 1_000_000;
        let key = Self::key_for(entry.thread_id, entry.turn_id, nanos, seq);
        self.kv.set(NAMESPACE, &key, bytes).await?;
        Ok(())
    }

    async fn entries_for_thread(&self, thread_id: ThreadId) -> AuditResult<Vec<AuditEntry>> {
        let prefix = format!("thread:{thread_id}:");
        let rows = self.kv.scan_prefix(NAMESPACE, &prefix).await?;
        decode_sorted(rows)
    }

    async fn entries_for_turn(&self, thread_id: ThreadId, turn_id: TurnId) -> AuditResult<Vec<AuditEntry>> {
        let all = self.entries_for_thread(thread_id).await?;
        Ok(all.into_iter().filter(|e| e.turn_id == turn_id).collect())
    }
}

fn decode_sorted(mut rows: Vec<bestbox_storage::KvEntry>) -> AuditResult<Vec<AuditEntry>> {
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows.into_iter()
        .map(|row| serde_json::from_slice::<AuditEntry>(&row.value).map_err(|e| AuditError::Serialization(e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use bestbox_core::ids::{ThreadId, TurnId};
    use bestbox_storage::MemoryKvStore;

    use super::*;

    #[tokio::test]
    async fn round_trips_entries_for_a_thread() {
        let storage = KvAuditStorage::new(Arc::new(MemoryKvStore::new()));
        let thread_id = ThreadId::new();
        let turn_id = TurnId::new();
        storage
            .append(AuditEntry::turn_start(turn_id, thread_id, "u1", None, "hi"))
            .await
            .unwrap();
        storage
            .append(AuditEntry::turn_end(turn_id, thread_id, "u1", None, "done", 1))
            .await
            .unwrap();

        let entries = storage.entries_for_thread(thread_id).await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn filters_entries_by_turn() {
        let storage = KvAuditStorage::new(Arc::new(MemoryKvStore::new()));
        let thread_id = ThreadId::new();
        let turn_a = TurnId::new();
        let turn_b = TurnId::new();
        storage
            .append(AuditEntry::turn_start(turn_a, thread_id, "u1", None, "a"))
            .await
            .unwrap();
        storage
            .append(AuditEntry::turn_start(turn_b, thread_id, "u1", None, "b"))
            .await
            .unwrap();

        let entries = storage.entries_for_turn(thread_id, turn_a).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].turn_id, turn_a);
    }
}
