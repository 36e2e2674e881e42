//! LLM client error types (spec §4.4, §7).

use thiserror::Error;

/// Errors from the LLM client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// API key not configured for a non-local endpoint.
    #[error("API key not configured for {provider}")]
    ApiKeyNotConfigured {
        /// Provider name.
        provider: String,
    },

    /// The HTTP request to the model endpoint failed.
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// The endpoint returned a non-2xx response.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Streaming the response body failed partway through.
    #[error("streaming error: {0}")]
    StreamingError(String),

    /// `len(messages)` after compaction still exceeds the model's declared
    /// context window (spec §4.4 point 3). The runtime should hand this
    /// back to C5 for more aggressive compaction.
    #[error("context overflow: {current} tokens exceeds model window of {max}")]
    ContextOverflow {
        /// Estimated token count of the outgoing request.
        current: usize,
        /// The model's declared context window.
        max: usize,
    },

    /// The upstream endpoint is unreachable after retries.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

/// Result alias over [`LlmError`].
pub type LlmResult<T> = Result<T, LlmError>;
