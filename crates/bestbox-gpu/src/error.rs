//! GPU scheduler error types (spec §4.8, §7).

use thiserror::Error;

/// Errors from [`crate::scheduler::GpuScheduler::acquire`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GpuError {
    /// `acquire` timed out waiting for the lock (default 60s). Maps to
    /// HTTP 429 with a retry hint at the C6/external boundary (spec §7).
    #[error("GPU resource busy: acquire timed out")]
    ResourceBusy,

    /// No device is declared for the requested `gpu_id`.
    #[error("unknown GPU device")]
    UnknownDevice,
}
