#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Integration test support for `BestBox`.
//!
//! `publish = false` — this crate only ships [`MockLlmProvider`] and
//! [`RuntimeTestHarness`], the fixtures every scenario test in `tests/`
//! builds an [`bestbox_runtime::AgentRuntime`] from. The scenarios
//! themselves live in `tests/`, not here.

mod harness;
mod mock_llm;

pub use harness::{fully_permissioned_user, RuntimeTestHarness};
pub use mock_llm::{MockLlmProvider, MockTurn};
