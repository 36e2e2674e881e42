//! [`ToolOutcome`]: the never-unwinding result every [`crate::tool::Tool`]
//! returns (spec §4.2 "added detail").

use bestbox_core::ids::ToolCallId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A pending write-class action awaiting human approval (spec §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalEnvelope {
    /// Correlates this approval with the originating tool call.
    pub tool_call_id: ToolCallId,
    /// Tool name awaiting approval.
    pub tool_name: String,
    /// Arguments the tool would be invoked with if approved.
    pub args: Value,
    /// Human-readable summary of the action, for the approval UI.
    pub summary: String,
}

/// Machine-readable error classification in a failed [`ToolOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// `permission_tag` not present in the caller's `UserContext`.
    PermissionDenied,
    /// The backing adapter is unreachable.
    BackendUnavailable,
    /// The requested operation isn't declared on this adapter.
    OperationUnsupported,
    /// The adapter returned an application-level error.
    BackendError,
    /// The arguments failed schema/semantic validation before dispatch.
    InvalidArguments,
}

/// The result of invoking one [`crate::tool::Tool`]: never a [`Result`]
/// that can unwind across the C6 boundary (spec §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ToolOutcome {
    /// `{ok: true, data: record}`.
    Ok {
        /// The tool's normalized result payload.
        data: Value,
    },
    /// `{ok: false, error_kind, message}`.
    Err {
        /// Machine-readable error classification.
        error_kind: ErrorKind,
        /// Human-readable message, safe to feed back to the model.
        message: String,
    },
    /// A write-class tool call that must be approved before it executes.
    PendingApproval(ApprovalEnvelope),
}

impl ToolOutcome {
    /// Build a successful outcome.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self::Ok { data }
    }

    /// Build a failed outcome.
    #[must_use]
    pub fn err(error_kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Err { error_kind, message: message.into() }
    }

    /// Whether this outcome should be treated as terminal for the current
    /// tool-call loop iteration (i.e. not an interrupt).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::PendingApproval(_))
    }
}
