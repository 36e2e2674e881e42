//! Thread/turn persistence (spec §3, §6 `GET /v1/threads/{thread_id}`).
//!
//! The teacher's retrieved pack has no equivalent session-record store, so
//! this is modeled directly on [`bestbox_checkpoint::store::Checkpointer`]'s
//! `SurrealDB`-over-[`Database`] shape: one record per thread, one per
//! turn, looked up by a deterministic record id derived from the opaque id.
//! Unlike the checkpointer, writes here aren't CAS-guarded — at most one
//! `run_turn`/`resume_turn`/`approve_turn` call touches a given turn at a
//! time, so there's no concurrent-writer race to serialize against.

use bestbox_core::ids::{ThreadId, TurnId};
use bestbox_core::model::{Thread, Turn};
use bestbox_storage::{Database, StorageError, StorageResult};
use bestbox_tools::ApprovalEnvelope;
use serde::{Deserialize, Serialize};

const THREAD_TABLE: &str = "thread";
const TURN_TABLE: &str = "turn_record";

/// A turn's durable record: the core [`Turn`] plus whatever write-class
/// tool call is currently awaiting approval, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    /// The turn itself.
    pub turn: Turn,
    /// A pending write-class call awaiting `approve_turn`, and the id C4
    /// used for the originating tool call (needed to build the
    /// [`bestbox_llm::ToolCallResult`] fed back to the model on resume).
    pub pending_approval: Option<PendingApproval>,
}

/// A write-class tool call parked on `awaiting_human`, with enough context
/// to resume it once a human approves or denies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingApproval {
    /// What's awaiting approval and what it would do if approved.
    pub envelope: ApprovalEnvelope,
}

fn thread_record_id(thread_id: ThreadId) -> String {
    thread_id.0.simple().to_string()
}

fn turn_record_id(turn_id: TurnId) -> String {
    turn_id.0.simple().to_string()
}

/// Durable store for [`Thread`]s and [`TurnRecord`]s.
pub struct ThreadStore {
    db: Database,
}

impl ThreadStore {
    /// Wrap a [`Database`] as a thread/turn store.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist a new or updated thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write fails.
    pub async fn save_thread(&self, thread: &Thread) -> StorageResult<()> {
        let id = thread_record_id(thread.thread_id);
        let _: Option<Thread> = self.db.client().upsert((THREAD_TABLE, id)).content(thread.clone()).await.map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Load a thread by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    pub async fn load_thread(&self, thread_id: ThreadId) -> StorageResult<Option<Thread>> {
        let id = thread_record_id(thread_id);
        self.db.client().select((THREAD_TABLE, id)).await.map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// Persist a new or updated turn record.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write fails.
    pub async fn save_turn(&self, record: &TurnRecord) -> StorageResult<()> {
        let id = turn_record_id(record.turn.turn_id);
        let _: Option<TurnRecord> = self.db.client().upsert((TURN_TABLE, id)).content(record.clone()).await.map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Load a turn record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    pub async fn load_turn(&self, turn_id: TurnId) -> StorageResult<Option<TurnRecord>> {
        let id = turn_record_id(turn_id);
        self.db.client().select((TURN_TABLE, id)).await.map_err(|e| StorageError::Internal(e.to_string()))
    }

    /// Every turn recorded for a thread, in the order they were opened.
    ///
    /// # Errors
    ///
    /// Returns an error if a thread or turn read fails.
    pub async fn turns_for_thread(&self, thread_id: ThreadId) -> StorageResult<Vec<Turn>> {
        let Some(thread) = self.load_thread(thread_id).await? else { return Ok(Vec::new()) };
        let mut turns = Vec::with_capacity(thread.turn_ids.len());
        for turn_id in thread.turn_ids {
            if let Some(record) = self.load_turn(turn_id).await? {
                turns.push(record.turn);
            }
        }
        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use bestbox_core::model::{AgentName, UserContext};
    use std::collections::HashSet;

    use super::*;

    fn user_context() -> UserContext {
        UserContext { user_id: "u1".to_owned(), org_id: None, roles: Vec::new(), permissions: HashSet::new() }
    }

    #[tokio::test]
    async fn thread_and_turn_round_trip() {
        let db = Database::connect_memory().await.unwrap();
        let store = ThreadStore::new(db);

        let mut thread = Thread::new(user_context());
        let turn = Turn::new(thread.thread_id, "hello");
        thread.turn_ids.push(turn.turn_id);

        store.save_thread(&thread).await.unwrap();
        store.save_turn(&TurnRecord { turn: turn.clone(), pending_approval: None }).await.unwrap();

        let loaded_thread = store.load_thread(thread.thread_id).await.unwrap().unwrap();
        assert_eq!(loaded_thread.turn_ids, vec![turn.turn_id]);

        let loaded_turn = store.load_turn(turn.turn_id).await.unwrap().unwrap();
        assert_eq!(loaded_turn.turn.input_text, "hello");
        assert_eq!(loaded_turn.turn.current_agent, AgentName::Router);
    }

    #[tokio::test]
    async fn turns_for_thread_preserves_order() {
        let db = Database::connect_memory().await.unwrap();
        let store = ThreadStore::new(db);

        let mut thread = Thread::new(user_context());
        let first = Turn::new(thread.thread_id, "first");
        let second = Turn::new(thread.thread_id, "second");
        thread.turn_ids = vec![first.turn_id, second.turn_id];

        store.save_thread(&thread).await.unwrap();
        store.save_turn(&TurnRecord { turn: first, pending_approval: None }).await.unwrap();
        store.save_turn(&TurnRecord { turn: second, pending_approval: None }).await.unwrap();

        let turns = store.turns_for_thread(thread.thread_id).await.unwrap();
        assert_eq!(turns.iter().map(|t| t.input_text.as_str()).collect::<Vec<_>>(), vec!["first", "second"]);
    }
}
