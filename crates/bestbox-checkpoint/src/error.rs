//! Checkpoint error types.

use bestbox_core::ids::{ThreadId, TurnId};
use thiserror::Error;

/// Errors from checkpoint read/write operations.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The backing storage failed to read or write.
    #[error("storage error: {0}")]
    Storage(#[from] bestbox_storage::StorageError),

    /// A snapshot could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A writer's `step_index` did not match the prior-latest + 1 (spec
    /// §4.7: concurrent writers to the same thread are serialized; a stale
    /// writer is rejected rather than silently overwriting).
    #[error("checkpoint conflict for thread {thread_id} turn {turn_id}: expected step {expected:?}, found {actual:?}")]
    Conflict {
        /// Thread the checkpoint belongs to.
        thread_id: ThreadId,
        /// Turn the checkpoint belongs to.
        turn_id: TurnId,
        /// The `step_index` the writer expected to supersede.
        expected: Option<u64>,
        /// The `step_index` actually stored, if any.
        actual: Option<u64>,
    },
}

/// Result alias over [`CheckpointError`].
pub type CheckpointResult<T> = Result<T, CheckpointError>;
