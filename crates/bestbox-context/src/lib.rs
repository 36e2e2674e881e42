#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! `BestBox` turn context manager (C5) — sliding-window message compaction
//! so the message history fed to C4 stays under the model's context window.
//!
//! Policy (spec §4.5): always keep the system prompt and the latest
//! `k_recent` user+assistant turn pairs verbatim. Older turns are folded
//! into a single `system`-tagged digest, produced by delegating a short
//! summarization prompt to C4, once the estimated token count crosses
//! `budget_tokens * summarize_threshold_ratio`. If summarization itself
//! fails, the oldest turn pair is dropped instead of digested. Oversized
//! tool results are truncated independently of compaction, with a marker
//! noting the omission — the full result still lives in the audit log.

mod compactor;
mod turns;

pub use compactor::{CompactionOutcome, ContextManager};
