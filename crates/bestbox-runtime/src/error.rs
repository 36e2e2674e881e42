//! Runtime error types observable at the C6 boundary (spec §7).

use bestbox_core::ids::{ThreadId, ToolCallId, TurnId};
use bestbox_core::CoreError;
use thiserror::Error;

/// Errors the agent graph runtime can return. Tool-level failures
/// (backend unavailable, permission denied on a single tool, ...) are
/// recovered locally by [`bestbox_tools::ToolRegistry::invoke`] and fed back
/// to the model as `{ok:false, ...}` — they never reach this type. What
/// lands here is everything that stops the turn itself.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No thread exists with this id.
    #[error("thread not found: {0}")]
    ThreadNotFound(ThreadId),

    /// No turn exists with this id on the given thread.
    #[error("turn not found: {0}")]
    TurnNotFound(TurnId),

    /// `approve_turn` was called but the turn has no pending approval.
    #[error("turn {0} has no pending approval")]
    NoPendingApproval(TurnId),

    /// The caller's approval didn't name the tool call actually pending.
    #[error("approval does not match the pending tool call {0}")]
    ApprovalMismatch(ToolCallId),

    /// Caller lacks the permission tag a tool requires, surfaced when a
    /// permission check fails before the turn can even start a tool call
    /// (e.g. the whole domain is unreachable to this caller).
    #[error("permission denied: missing {tag}")]
    PermissionDenied {
        /// The missing permission tag.
        tag: String,
    },

    /// Message history could not be compacted below the model's context
    /// window even after digesting and dropping the oldest turn pair.
    #[error("context overflow: {current} tokens exceeds limit of {max}")]
    ContextOverflow {
        /// Estimated token count after compaction.
        current: usize,
        /// Model's declared context window.
        max: usize,
    },

    /// A gated resource (a GPU lease) could not be acquired in time.
    #[error("resource busy: {resource}")]
    ResourceBusy {
        /// Resource identifier (`gpu_id:class`).
        resource: String,
    },

    /// A turn exceeded its configured deadline (spec §4.6 simple/complex
    /// deadlines, enforced via `tokio::time::timeout`).
    #[error("deadline exceeded after {elapsed_ms} ms")]
    DeadlineExceeded {
        /// Elapsed time in milliseconds.
        elapsed_ms: u64,
    },

    /// The LLM endpoint was unreachable after retries.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The checkpoint store rejected a write or read.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] bestbox_checkpoint::CheckpointError),

    /// Thread/turn persistence failed.
    #[error("storage error: {0}")]
    Storage(#[from] bestbox_storage::StorageError),

    /// The GPU scheduler rejected an acquire.
    #[error("gpu error: {0}")]
    Gpu(#[from] bestbox_gpu::GpuError),

    /// Unclassified internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<bestbox_llm::LlmError> for RuntimeError {
    fn from(error: bestbox_llm::LlmError) -> Self {
        match error {
            bestbox_llm::LlmError::ContextOverflow { current, max } => Self::ContextOverflow { current, max },
            bestbox_llm::LlmError::UpstreamUnavailable(message) => Self::UpstreamUnavailable(message),
            bestbox_llm::LlmError::ApiRequestFailed(message)
            | bestbox_llm::LlmError::InvalidResponse(message)
            | bestbox_llm::LlmError::StreamingError(message) => Self::UpstreamUnavailable(message),
            bestbox_llm::LlmError::ApiKeyNotConfigured { provider } => Self::Internal(format!("API key not configured for {provider}")),
        }
    }
}

impl RuntimeError {
    /// Map this error to the [`CoreError`] kind spec §6/§7 assigns an HTTP
    /// status to, for use at the server boundary.
    #[must_use]
    pub fn to_core_error(&self) -> CoreError {
        match self {
            Self::PermissionDenied { tag } => CoreError::PermissionDenied { tag: tag.clone() },
            Self::ContextOverflow { current, max } => CoreError::ContextOverflow { current: *current, max: *max },
            Self::ResourceBusy { resource } => CoreError::ResourceBusy { resource: resource.clone() },
            Self::Gpu(bestbox_gpu::GpuError::ResourceBusy) => CoreError::ResourceBusy { resource: "gpu".to_owned() },
            Self::Gpu(bestbox_gpu::GpuError::UnknownDevice) => CoreError::InternalError("unknown GPU device".to_owned()),
            Self::Checkpoint(bestbox_checkpoint::CheckpointError::Conflict { actual, .. }) => {
                CoreError::CheckpointConflict { step_index: actual.unwrap_or_default() }
            }
            Self::DeadlineExceeded { elapsed_ms } => CoreError::DeadlineExceeded { elapsed_ms: *elapsed_ms },
            Self::UpstreamUnavailable(message) => CoreError::UpstreamUnavailable(message.clone()),
            other => CoreError::InternalError(other.to_string()),
        }
    }
}

/// Result alias over [`RuntimeError`].
pub type RuntimeResult<T> = Result<T, RuntimeError>;
