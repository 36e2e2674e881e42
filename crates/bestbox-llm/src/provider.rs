//! The [`LlmProvider`] trait every model backend implements.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::LlmResult;
use crate::types::{LlmResponse, LlmToolDefinition, Message, StreamEvent};

/// A boxed stream of [`StreamEvent`]s.
pub type StreamBox = Pin<Box<dyn Stream<Item = LlmResult<StreamEvent>> + Send>>;

/// Streaming LLM backend (spec §4.4).
///
/// One implementation, [`crate::openai_compat::OpenAiCompatProvider`], talks
/// to any OpenAI-compatible `/chat/completions` endpoint; additional
/// providers can be added behind the same trait without touching callers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider identifier, for logging.
    fn name(&self) -> &str;

    /// The model name this provider is configured for.
    fn model(&self) -> &str;

    /// Stream a completion, yielding deltas as the model generates them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::LlmError::ContextOverflow`] if the request
    /// would exceed [`Self::max_context_length`], or a request/streaming
    /// error if the endpoint call fails.
    async fn stream(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str) -> LlmResult<StreamBox>;

    /// Complete without streaming, returning the full response at once.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::LlmError::ContextOverflow`] if the request
    /// would exceed [`Self::max_context_length`], or a request error if the
    /// endpoint call fails.
    async fn complete(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str) -> LlmResult<LlmResponse>;

    /// Convenience wrapper for a single-turn, tool-free completion (used by
    /// C5's digest summarization).
    ///
    /// # Errors
    ///
    /// Propagates whatever [`Self::complete`] returns.
    async fn complete_simple(&self, prompt: &str) -> LlmResult<String> {
        let messages = vec![Message::user(prompt)];
        let response = self.complete(&messages, &[], "").await?;
        Ok(response.message.text().unwrap_or_default().to_owned())
    }

    /// Approximate token count for a piece of text. Providers may override
    /// with a model-specific tokenizer; the default delegates to the
    /// shared CJK-aware heuristic.
    fn count_tokens(&self, text: &str) -> usize {
        bestbox_core::utils::estimate_tokens(text)
    }

    /// The model's declared context window, in tokens.
    fn max_context_length(&self) -> usize;
}

#[async_trait]
impl LlmProvider for Box<dyn LlmProvider> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    async fn stream(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str) -> LlmResult<StreamBox> {
        (**self).stream(messages, tools, system).await
    }

    async fn complete(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str) -> LlmResult<LlmResponse> {
        (**self).complete(messages, tools, system).await
    }

    fn count_tokens(&self, text: &str) -> usize {
        (**self).count_tokens(text)
    }

    fn max_context_length(&self) -> usize {
        (**self).max_context_length()
    }
}

/// Construction parameters shared by every provider.
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key, read from the environment variable named in
    /// [`bestbox_config::LlmSection::auth_env`].
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: usize,
    /// Sampling temperature.
    pub temperature: f64,
    /// Endpoint base URL.
    pub base_url: String,
    /// Context window size, in tokens.
    pub context_window: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("has_api_key", &self.api_key.is_some())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("context_window", &self.context_window)
            .finish()
    }
}
