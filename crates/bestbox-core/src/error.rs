//! Error kinds observable at the runtime boundary (spec §7).

use thiserror::Error;

/// The seven error kinds the runtime surfaces across its API boundary, plus
/// `InternalError` as a catch-all. Adapter/tool-level failures
/// (`BackendUnavailable`, `BackendError`, `OperationUnsupported`) are *not*
/// represented here: they are recovered locally and fed back to the LLM as
/// `{ok:false, ...}`, never surfaced as a [`CoreError`].
#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller lacks the permission tag a tool requires.
    #[error("permission denied: missing {tag}")]
    PermissionDenied {
        /// The missing permission tag.
        tag: String,
    },

    /// Message budget could not be compacted below the model's context limit.
    #[error("context overflow: {current} tokens exceeds limit of {max}")]
    ContextOverflow {
        /// Estimated token count after compaction.
        current: usize,
        /// Model's declared context window.
        max: usize,
    },

    /// GPU scheduler `acquire` timed out.
    #[error("resource busy: {resource}")]
    ResourceBusy {
        /// Resource identifier (`gpu_id:class`).
        resource: String,
    },

    /// Concurrent checkpoint writer detected (CAS failure).
    #[error("checkpoint conflict on step {step_index}")]
    CheckpointConflict {
        /// The rejected writer's step index.
        step_index: u64,
    },

    /// A turn exceeded its configured deadline.
    #[error("deadline exceeded after {elapsed_ms} ms")]
    DeadlineExceeded {
        /// Elapsed time in milliseconds.
        elapsed_ms: u64,
    },

    /// The LLM endpoint was unreachable after retries.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Unclassified internal error.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl CoreError {
    /// Maps each error kind to the HTTP status code spec §6/§7 assigns it.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::PermissionDenied { .. } => 403,
            Self::ContextOverflow { .. } => 400,
            Self::ResourceBusy { .. } => 429,
            Self::CheckpointConflict { .. } => 500,
            Self::DeadlineExceeded { .. } => 408,
            Self::UpstreamUnavailable(_) => 503,
            Self::InternalError(_) => 500,
        }
    }
}

/// Result alias over [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
