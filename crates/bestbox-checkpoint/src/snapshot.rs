//! The durable unit of checkpointed state.

use std::collections::HashSet;

use bestbox_core::ids::{ThreadId, Timestamp, ToolCallId, TurnId};
use bestbox_core::model::AgentState;
use serde::{Deserialize, Serialize};

/// One durable snapshot of a turn in progress.
///
/// Written after every node transition and after every tool result (spec
/// §4.7). `completed_tool_calls` lets a resumed turn short-circuit tool
/// calls it already executed rather than re-invoking side-effecting
/// adapters on replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Thread this snapshot belongs to.
    pub thread_id: ThreadId,
    /// Turn this snapshot belongs to.
    pub turn_id: TurnId,
    /// Monotonically increasing per-turn step counter. The CAS key.
    pub step_index: u64,
    /// The agent state as of this step.
    pub state: AgentState,
    /// Tool calls already executed and recorded this turn, by id. Checked
    /// before invoking a tool again on replay.
    pub completed_tool_calls: HashSet<ToolCallId>,
    /// When this snapshot was written.
    pub created_at: Timestamp,
}

impl Checkpoint {
    /// Build the first snapshot of a turn (`step_index = 0`).
    #[must_use]
    pub fn initial(thread_id: ThreadId, turn_id: TurnId, state: AgentState) -> Self {
        Self {
            thread_id,
            turn_id,
            step_index: 0,
            state,
            completed_tool_calls: HashSet::new(),
            created_at: Timestamp::now(),
        }
    }

    /// Derive the next snapshot in sequence, advancing `step_index` by one.
    #[must_use]
    pub fn next(&self, state: AgentState, completed_tool_calls: HashSet<ToolCallId>) -> Self {
        Self {
            thread_id: self.thread_id,
            turn_id: self.turn_id,
            step_index: self.step_index.saturating_add(1),
            state,
            completed_tool_calls,
            created_at: Timestamp::now(),
        }
    }

    /// True if `tool_call_id` was already executed and recorded in this
    /// snapshot — a resumed turn should feed back the recorded result
    /// rather than invoking the adapter again.
    #[must_use]
    pub fn already_executed(&self, tool_call_id: ToolCallId) -> bool {
        self.completed_tool_calls.contains(&tool_call_id)
    }
}
