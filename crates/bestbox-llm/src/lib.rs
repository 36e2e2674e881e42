#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! `BestBox` LLM client (C4) — streaming chat+tool-call abstraction over an
//! `OpenAI`-compatible endpoint.
//!
//! [`provider::LlmProvider`] is the trait every backend implements;
//! [`openai_compat::OpenAiCompatProvider`] is the one concrete
//! implementation this deployment needs, since every supported inference
//! endpoint (local quantized models, vLLM, a hosted API) speaks the same
//! `/chat/completions` wire format. On top of the teacher's streaming loop
//! this crate adds the three quantized-model quirks spec §4.4 calls out:
//! reasoning-preamble stripping, bounded tool-call JSON repair, and a
//! context-window pre-check.

/// LLM client error types.
pub mod error;
pub mod openai_compat;
pub mod provider;
/// JSON repair for malformed tool-call argument strings.
pub mod repair;
pub mod types;

pub use error::{LlmError, LlmResult};
pub use openai_compat::OpenAiCompatProvider;
pub use provider::{LlmProvider, ProviderConfig, StreamBox};
pub use types::{
    LlmResponse, LlmToolDefinition, Message, MessageRole, StopReason, StreamEvent, ToolCall,
    ToolCallResult, Usage,
};
