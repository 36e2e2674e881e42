//! Audit log error types.

use thiserror::Error;

/// Errors from audit log operations. Per spec §4.9, write failures are
/// logged but never fail the originating turn — this type exists for the
/// flush loop's own diagnostics and for synchronous query paths (admin read).
#[derive(Debug, Error)]
pub enum AuditError {
    /// The backing storage failed to read or write.
    #[error("storage error: {0}")]
    Storage(#[from] bestbox_storage::StorageError),

    /// An entry could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The flush channel was closed (the background task panicked or the
    /// `AuditLog` was dropped while a caller still held a sender clone).
    #[error("audit channel closed")]
    ChannelClosed,
}

/// Result alias over [`AuditError`].
pub type AuditResult<T> = Result<T, AuditError>;
