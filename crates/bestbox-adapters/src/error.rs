//! Adapter error types (spec §4.1).

use thiserror::Error;

/// Errors a [`crate::adapter::BackendAdapter`] can return from `query`.
///
/// These never propagate past C2/C6 as a hard failure — the tool catalog
/// wraps them into `{ok:false, error_kind, message}` and feeds them back to
/// the model (spec §4.2, §7).
#[derive(Debug, Error, Clone)]
pub enum AdapterError {
    /// `is_available()` was false, or the transport call itself failed.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The operation is not in this adapter's declared/allowed set.
    #[error("operation not supported: {0}")]
    OperationUnsupported(String),

    /// The remote backend returned an application-level error.
    #[error("backend error [{code}]: {message}")]
    BackendError {
        /// Backend-specific error code.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

/// Result alias over [`AdapterError`].
pub type AdapterResult<T> = Result<T, AdapterError>;
