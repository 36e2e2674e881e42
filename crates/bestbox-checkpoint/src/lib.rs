#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! `BestBox` checkpointer (C7) — durable per-turn state snapshots with
//! at-least-once writes and idempotent replay on resume.
//!
//! A turn's state is written after every node transition and after every
//! tool result (spec §4.7). Resuming a turn loads the latest snapshot and
//! replays forward without re-invoking tool calls already recorded in
//! [`snapshot::Checkpoint::completed_tool_calls`]. Concurrent writers are
//! serialized by a compare-and-swap on `step_index`; a stale writer gets
//! [`error::CheckpointError::Conflict`] instead of silently clobbering a
//! newer snapshot.

/// Checkpoint error types.
pub mod error;
pub mod snapshot;
pub mod store;

pub use error::{CheckpointError, CheckpointResult};
pub use snapshot::Checkpoint;
pub use store::Checkpointer;
