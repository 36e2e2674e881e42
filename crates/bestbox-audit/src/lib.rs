#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! `BestBox` audit log (C9) — append-only record of turns, tool calls, and
//! ratings.
//!
//! Per spec §4.9, writes are best-effort and asynchronous: a caller hands an
//! [`entry::AuditEntry`] to [`AuditLog::record`] and moves on immediately. A
//! background task drains a bounded channel and batches writes to the
//! configured [`storage::AuditStorage`] at most once a second. A failed write
//! is logged and dropped — it never fails the turn that produced it.

pub mod entry;
/// Audit log error types.
pub mod error;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use bestbox_core::ids::{ThreadId, TurnId};
use tokio::sync::mpsc;

pub use entry::{AuditEntry, AuditEventType};
pub use error::{AuditError, AuditResult};
pub use storage::{AuditStorage, KvAuditStorage};

/// Channel depth between callers and the flush loop. Spec §0.4: a slow
/// storage backend should apply backpressure rather than grow memory
/// unboundedly, so `record` blocks (briefly) once this fills rather than
/// dropping entries outright.
const CHANNEL_CAPACITY: usize = 1024;

/// Batch writes to [`AuditStorage`] at least this often, even if the channel
/// keeps receiving entries.
const FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Facade over the async, batched audit log.
///
/// Cloning an `AuditLog` is cheap — every clone shares the same channel and
/// the same background flush task.
#[derive(Clone)]
pub struct AuditLog {
    sender: mpsc::Sender<AuditEntry>,
    storage: Arc<dyn AuditStorage>,
}

impl AuditLog {
    /// Start the background flush loop and return a handle to send entries
    /// through.
    #[must_use]
    pub fn spawn(storage: Arc<dyn AuditStorage>) -> Self {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(flush_loop(receiver, storage.clone()));
        Self { sender, storage }
    }

    /// Queue an entry for the flush loop to persist. Never fails the caller:
    /// if the channel is closed (the flush task panicked), the entry is
    /// logged and dropped.
    pub async fn record(&self, entry: AuditEntry) {
        if let Err(err) = self.sender.send(entry).await {
            tracing::warn!(error = %err, "audit channel closed, entry dropped");
        }
    }

    /// Read back every entry recorded for a thread, in write order. Used by
    /// admin/debug surfaces, not by the turn-processing hot path.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage read fails.
    pub async fn entries_for_thread(&self, thread_id: ThreadId) -> AuditResult<Vec<AuditEntry>> {
        self.storage.entries_for_thread(thread_id).await
    }

    /// Read back every entry recorded for a single turn, in write order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage read fails.
    pub async fn entries_for_turn(&self, thread_id: ThreadId, turn_id: TurnId) -> AuditResult<Vec<AuditEntry>> {
        self.storage.entries_for_turn(thread_id, turn_id).await
    }
}

async fn flush_loop(mut receiver: mpsc::Receiver<AuditEntry>, storage: Arc<dyn AuditStorage>) {
    let mut buffer = Vec::new();
    let mut ticker = tokio::time::interval(FLUSH_INTERVAL);
    // The first tick fires immediately; skip it so we don't flush an empty buffer.
    ticker.tick().await;

    loop {
        tokio::select! {
            received = receiver.recv() => {
                match received {
                    Some(entry) => buffer.push(entry),
                    None => {
                        flush(&storage, &mut buffer).await;
                        return;
                    }
                }
            }
            _ = ticker.tick() => {
                flush(&storage, &mut buffer).await;
            }
        }
    }
}

async fn flush(storage: &Arc<dyn AuditStorage>, buffer: &mut Vec<AuditEntry>) {
    if buffer.is_empty() {
        return;
    }
    for entry in buffer.drain(..) {
        if let Err(err) = storage.append(entry).await {
            tracing::warn!(error = %err, "audit write failed, entry dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use bestbox_core::ids::{ThreadId, TurnId};
    use bestbox_storage::MemoryKvStore;

    use super::*;

    #[tokio::test]
    async fn recorded_entries_become_readable_after_a_flush() {
        let storage: Arc<dyn AuditStorage> = Arc::new(KvAuditStorage::new(Arc::new(MemoryKvStore::new())));
        let log = AuditLog::spawn(storage);

        let thread_id = ThreadId::new();
        let turn_id = TurnId::new();
        log.record(AuditEntry::turn_start(turn_id, thread_id, "u1", None, "hi")).await;
        log.record(AuditEntry::turn_end(turn_id, thread_id, "u1", None, "done", 0)).await;

        // Give the flush loop a moment; it also flushes on every tick, but
        // draining happens as soon as the channel yields entries back-to-back
        // only at the next select! iteration, so a short sleep is the
        // deterministic way to observe it in a test.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let entries = log.entries_for_thread(thread_id).await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn dropping_all_senders_flushes_remaining_entries() {
        let storage: Arc<dyn AuditStorage> = Arc::new(KvAuditStorage::new(Arc::new(MemoryKvStore::new())));
        let log = AuditLog::spawn(storage.clone());
        let thread_id = ThreadId::new();
        log.record(AuditEntry::turn_start(TurnId::new(), thread_id, "u1", None, "hi")).await;
        drop(log);

        tokio::time::sleep(Duration::from_millis(50)).await;
        let entries = storage.entries_for_thread(thread_id).await.unwrap();
        assert_eq!(entries.len(), 1);
    }
}
