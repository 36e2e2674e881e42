//! In-process graph state (spec §4, the node walk a turn takes).
//!
//! [`GraphState`] is never persisted directly — [`bestbox_checkpoint::Checkpoint`]
//! snapshots [`bestbox_core::model::AgentState`] after every node transition, and a
//! resumed turn rebuilds `GraphState` from the checkpoint's `current_agent` and
//! whether a pending approval is on file. `GraphState` only drives the
//! in-memory loop within a single `run_turn`/`resume_turn` call.

use bestbox_core::model::AgentName;

/// A turn's position in the router → specialist → answer graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    /// The router has not yet decided which specialist owns this turn.
    Routing,
    /// `agent` is running its reasoning loop, about to call the model.
    Executing(AgentName),
    /// `agent` is waiting on a tool result (already dispatched, not an
    /// approval interrupt — see [`Self::AwaitingHuman`] for that).
    AwaitingTool(AgentName),
    /// `agent` issued a write-class tool call that needs human approval
    /// before it can run.
    AwaitingHuman(AgentName),
    /// `agent` has produced its final answer text for the turn.
    Answering(AgentName),
    /// The turn completed successfully.
    Done,
    /// The turn ended in an unrecoverable error.
    Failed,
}

impl GraphState {
    /// The specialist this state is attached to, if any (`Routing`/`Done`/
    /// `Failed` carry none).
    #[must_use]
    pub fn agent(&self) -> Option<AgentName> {
        match self {
            Self::Executing(agent) | Self::AwaitingTool(agent) | Self::AwaitingHuman(agent) | Self::Answering(agent) => Some(*agent),
            Self::Routing | Self::Done | Self::Failed => None,
        }
    }

    /// Whether this state represents a terminal outcome for the turn.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}
