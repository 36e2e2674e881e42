#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! `BestBox` GPU work scheduler (C8) — mutual-exclusion arbitration between
//! `llm-primary` and `ocr-vl` jobs contending for the same GPU.
//!
//! At most one of `{llm-primary, ocr-vl}` may hold a given `gpu_id`'s
//! exclusive lock at any moment (spec §4.8, §8 invariant). Waiters queue
//! FIFO within priority; in-flight holders always run to completion
//! (pre-emption disabled). [`scheduler::GpuLease`] releases automatically on
//! drop so a panicking or early-returning caller can never leak a held lock.

/// GPU scheduler error types.
pub mod error;
pub mod scheduler;
/// GPU resource classification and status types.
pub mod types;

pub use error::GpuError;
pub use scheduler::{GpuLease, GpuScheduler, DEFAULT_ACQUIRE_TIMEOUT};
pub use types::{GpuClass, GpuStatus};
