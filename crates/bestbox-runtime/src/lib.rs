#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! `BestBox` agent graph runtime (C6) — router → specialist dispatch, the
//! per-turn tool-call loop, the write-class approval interrupt, and the
//! checkpoint/audit/context wiring that holds a turn together across a
//! crash (spec §4.6, §4.7, §8).
//!
//! [`engine::AgentRuntime`] is the crate's single public entry point:
//! `bestbox-server` builds one per deployment and calls `run_turn` /
//! `resume_turn` / `approve_turn` / `get_thread` against it.

/// The tool catalog and per-specialist tool visibility (spec §4.2, §4.6).
pub mod catalog;
/// Durable/wire message conversion between C6's history and C4's types.
pub mod convert;
/// Runtime error types and their HTTP-status mapping (spec §7).
pub mod error;
/// The `AgentRuntime` orchestrator itself.
pub mod engine;
/// Streaming emission hook.
pub mod observer;
/// Router and specialist system prompts.
pub mod persona;
/// Router decision parsing and the deterministic lexicon fallback.
pub mod router;
/// In-process graph state walked by one `run_turn`/`resume_turn` call.
pub mod state;
/// `Thread`/`Turn` durable persistence.
pub mod threads;

pub use engine::{AgentRuntime, TurnOutcome};
pub use error::{RuntimeError, RuntimeResult};
pub use observer::{NullObserver, TurnObserver};
pub use state::GraphState;
pub use threads::{PendingApproval, ThreadStore, TurnRecord};
