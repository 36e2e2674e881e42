#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! `BestBox` core — shared types, identifiers, and error kinds used
//! throughout the agent orchestration runtime.
//!
//! This crate has no async runtime or storage dependency of its own; every
//! other `bestbox-*` crate depends on it for the vocabulary the spec
//! defines once and reuses everywhere (`ThreadId`, `Message`, `AgentState`,
//! `CoreError`, retry/backoff).

/// Error kinds observable at the runtime boundary (spec §7).
pub mod error;
/// Opaque identifiers and timestamps.
pub mod ids;
/// Core data model: threads, turns, messages, tool specs (spec §3).
pub mod model;
/// Jittered exponential backoff shared by every crate that calls an
/// external system.
pub mod retry;
/// Small text/token helpers.
pub mod utils;

pub use error::{CoreError, CoreResult};
pub use ids::{ThreadId, Timestamp, ToolCallId, TurnId};
pub use retry::{retry, RetryConfig, RetryOutcome};
