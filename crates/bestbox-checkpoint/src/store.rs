//! CAS-guarded checkpoint storage on top of [`bestbox_storage::Database`].

use bestbox_core::ids::{ThreadId, Timestamp, TurnId};
use bestbox_storage::Database;
use serde::{Deserialize, Serialize};

use crate::error::{CheckpointError, CheckpointResult};
use crate::snapshot::Checkpoint;

const TABLE: &str = "checkpoint";

/// Durable CAS-guarded checkpoint store.
///
/// One record per `(thread_id, turn_id)`, keyed by a record id derived from
/// both, holding the latest [`Checkpoint`]. Writes are conditioned on the
/// caller's expected prior `step_index` so two concurrent writers to the
/// same turn can't silently clobber each other (spec §4.7).
pub struct Checkpointer {
    db: Database,
}

impl Checkpointer {
    /// Wrap a [`Database`] as a checkpoint store.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Fetch the latest committed snapshot for a turn, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    pub async fn load(&self, thread_id: ThreadId, turn_id: TurnId) -> CheckpointResult<Option<Checkpoint>> {
        let id = record_id(thread_id, turn_id);
        let row: Option<StoredCheckpoint> = self
            .db
            .client()
            .select((TABLE, id))
            .await
            .map_err(|e| CheckpointError::Storage(bestbox_storage::StorageError::Internal(e.to_string())))?;
        Ok(row.map(Into::into))
    }

    /// Write the first snapshot of a new turn. Fails with
    /// [`CheckpointError::Conflict`] if a snapshot for this `(thread_id,
    /// turn_id)` already exists — callers resuming an in-progress turn
    /// should use [`Self::advance`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Conflict`] if a snapshot already exists,
    /// or a storage error if the write itself fails.
    pub async fn create(&self, checkpoint: &Checkpoint) -> CheckpointResult<()> {
        let id = record_id(checkpoint.thread_id, checkpoint.turn_id);
        let stored = StoredCheckpoint::from(checkpoint.clone());
        let result: Result<Option<StoredCheckpoint>, _> = self.db.client().create((TABLE, id)).content(stored).await;
        match result {
            Ok(_) => Ok(()),
            Err(_) => {
                let existing = self.load(checkpoint.thread_id, checkpoint.turn_id).await?;
                Err(CheckpointError::Conflict {
                    thread_id: checkpoint.thread_id,
                    turn_id: checkpoint.turn_id,
                    expected: None,
                    actual: existing.map(|c| c.step_index),
                })
            }
        }
    }

    /// Advance a turn's checkpoint: write `checkpoint` only if the stored
    /// `step_index` is currently `checkpoint.step_index - 1`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Conflict`] if the stored `step_index`
    /// doesn't match the expected prior value (another writer got there
    /// first, or this writer is stale after a crash/resume race), or a
    /// storage error if the write itself fails.
    pub async fn advance(&self, checkpoint: &Checkpoint) -> CheckpointResult<()> {
        let expected = checkpoint.step_index.checked_sub(1).ok_or_else(|| CheckpointError::Conflict {
            thread_id: checkpoint.thread_id,
            turn_id: checkpoint.turn_id,
            expected: None,
            actual: None,
        })?;
        let id = record_id(checkpoint.thread_id, checkpoint.turn_id);
        let stored = StoredCheckpoint::from(checkpoint.clone());

        let mut response = self
            .db
            .client()
            .query("UPDATE type::thing($tb, $id) SET step_index = $step_index, state = $state, completed_tool_calls = $completed_tool_calls, created_at = $created_at WHERE step_index = $expected RETURN AFTER")
            .bind(("tb", TABLE))
            .bind(("id", id.clone()))
            .bind(("step_index", stored.step_index))
            .bind(("state", stored.state.clone()))
            .bind(("completed_tool_calls", stored.completed_tool_calls.clone()))
            .bind(("created_at", stored.created_at))
            .bind(("expected", expected))
            .await
            .map_err(|e| CheckpointError::Storage(bestbox_storage::StorageError::Internal(e.to_string())))?;

        let updated: Vec<StoredCheckpoint> = response
            .take(0)
            .map_err(|e| CheckpointError::Storage(bestbox_storage::StorageError::Internal(e.to_string())))?;

        if updated.is_empty() {
            let actual = self.load(checkpoint.thread_id, checkpoint.turn_id).await?.map(|c| c.step_index);
            return Err(CheckpointError::Conflict {
                thread_id: checkpoint.thread_id,
                turn_id: checkpoint.turn_id,
                expected: Some(expected),
                actual,
            });
        }
        Ok(())
    }

    /// Delete committed snapshots older than `grace_seconds`, per spec
    /// §4.7's garbage-collection grace period (default 24h,
    /// [`bestbox_config::CheckpointSection::grace_seconds`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn gc(&self, grace_seconds: i64) -> CheckpointResult<u64> {
        let cutoff = Timestamp::from_datetime(chrono::Utc::now() - chrono::Duration::seconds(grace_seconds));
        let mut response = self
            .db
            .client()
            .query("DELETE FROM type::table($tb) WHERE created_at < $cutoff RETURN BEFORE")
            .bind(("tb", TABLE))
            .bind(("cutoff", cutoff))
            .await
            .map_err(|e| CheckpointError::Storage(bestbox_storage::StorageError::Internal(e.to_string())))?;
        let deleted: Vec<StoredCheckpoint> = response
            .take(0)
            .map_err(|e| CheckpointError::Storage(bestbox_storage::StorageError::Internal(e.to_string())))?;
        Ok(deleted.len() as u64)
    }
}

fn record_id(thread_id: ThreadId, turn_id: TurnId) -> String {
    format!("{}_{}", thread_id.0.simple(), turn_id.0.simple())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCheckpoint {
    thread_id: ThreadId,
    turn_id: TurnId,
    step_index: u64,
    state: bestbox_core::model::AgentState,
    completed_tool_calls: std::collections::HashSet<bestbox_core::ids::ToolCallId>,
    created_at: Timestamp,
}

impl From<Checkpoint> for StoredCheckpoint {
    fn from(c: Checkpoint) -> Self {
        Self {
            thread_id: c.thread_id,
            turn_id: c.turn_id,
            step_index: c.step_index,
            state: c.state,
            completed_tool_calls: c.completed_tool_calls,
            created_at: c.created_at,
        }
    }
}

impl From<StoredCheckpoint> for Checkpoint {
    fn from(s: StoredCheckpoint) -> Self {
        Self {
            thread_id: s.thread_id,
            turn_id: s.turn_id,
            step_index: s.step_index,
            state: s.state,
            completed_tool_calls: s.completed_tool_calls,
            created_at: s.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use bestbox_core::model::{AgentState, UserContext};

    use super::*;

    fn user_context() -> UserContext {
        UserContext {
            user_id: "u1".to_owned(),
            org_id: None,
            roles: vec![],
            permissions: std::collections::HashSet::new(),
        }
    }

    #[tokio::test]
    async fn create_then_advance_round_trips() {
        let db = Database::connect_memory().await.unwrap();
        let checkpointer = Checkpointer::new(db);
        let thread_id = ThreadId::new();
        let turn_id = TurnId::new();

        let first = Checkpoint::initial(thread_id, turn_id, AgentState::new(user_context()));
        checkpointer.create(&first).await.unwrap();

        let loaded = checkpointer.load(thread_id, turn_id).await.unwrap().unwrap();
        assert_eq!(loaded.step_index, 0);

        let second = first.next(AgentState::new(user_context()), std::collections::HashSet::new());
        checkpointer.advance(&second).await.unwrap();

        let loaded = checkpointer.load(thread_id, turn_id).await.unwrap().unwrap();
        assert_eq!(loaded.step_index, 1);
    }

    #[tokio::test]
    async fn create_twice_conflicts() {
        let db = Database::connect_memory().await.unwrap();
        let checkpointer = Checkpointer::new(db);
        let thread_id = ThreadId::new();
        let turn_id = TurnId::new();

        let first = Checkpoint::initial(thread_id, turn_id, AgentState::new(user_context()));
        checkpointer.create(&first).await.unwrap();

        let err = checkpointer.create(&first).await.unwrap_err();
        assert!(matches!(err, CheckpointError::Conflict { .. }));
    }

    #[tokio::test]
    async fn stale_advance_conflicts() {
        let db = Database::connect_memory().await.unwrap();
        let checkpointer = Checkpointer::new(db);
        let thread_id = ThreadId::new();
        let turn_id = TurnId::new();

        let first = Checkpoint::initial(thread_id, turn_id, AgentState::new(user_context()));
        checkpointer.create(&first).await.unwrap();
        let second = first.next(AgentState::new(user_context()), std::collections::HashSet::new());
        checkpointer.advance(&second).await.unwrap();

        // `second` has already been committed; re-advancing from the same
        // stale base (step 0 -> 1) must now conflict.
        let err = checkpointer.advance(&second).await.unwrap_err();
        assert!(matches!(err, CheckpointError::Conflict { .. }));
    }
}
