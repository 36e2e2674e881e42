//! Wire-neutral message, tool, and streaming types (spec §4.4).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message in the conversation sent to or received from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role.
    pub role: MessageRole,
    /// Message content.
    pub content: MessageContent,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message carrying tool calls instead of text.
    #[must_use]
    pub fn assistant_with_tools(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::ToolCalls(tool_calls),
        }
    }

    /// Create a tool result message.
    #[must_use]
    pub fn tool_result(result: ToolCallResult) -> Self {
        Self {
            role: MessageRole::Tool,
            content: MessageContent::ToolResult(result),
        }
    }

    /// Text content, if this message is plain text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Tool calls, if this message carries any.
    #[must_use]
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match &self.content {
            MessageContent::ToolCalls(calls) => Some(calls),
            _ => None,
        }
    }
}

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
    /// A tool's result fed back to the model.
    Tool,
}

/// Message content, in one of the shapes the wire format allows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text.
    Text(String),
    /// One or more tool invocations requested by the assistant.
    ToolCalls(Vec<ToolCall>),
    /// The result of a single tool invocation.
    ToolResult(ToolCallResult),
    /// Multi-part content (text interleaved with images).
    MultiPart(Vec<ContentPart>),
}

/// One part of a multi-part message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// An inline image (used by the OCR-VL path, spec §4.8).
    Image {
        /// Base64-encoded image bytes.
        data: String,
        /// MIME type.
        media_type: String,
    },
}

/// A tool call requested by the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call id, used to correlate the eventual [`ToolCallResult`].
    pub id: String,
    /// Tool name, `domain.operation` per spec §5.
    pub name: String,
    /// Parsed arguments.
    pub arguments: Value,
}

impl ToolCall {
    /// Construct with empty arguments.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: Value::Object(serde_json::Map::new()),
        }
    }

    /// Attach parsed arguments.
    #[must_use]
    pub fn with_arguments(mut self, args: Value) -> Self {
        self.arguments = args;
        self
    }
}

/// The outcome of executing a [`ToolCall`], fed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// The call this is a result for.
    pub call_id: String,
    /// Result content, as text (tool outputs are always rendered to text
    /// before being fed back — spec §5's `{ok, value|error}` envelope is
    /// serialized to JSON text here).
    pub content: String,
    /// Whether this result represents a tool-level failure.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Build a success result.
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Build an error result.
    pub fn error(call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: error.into(),
            is_error: true,
        }
    }
}

/// A tool definition advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmToolDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// JSON schema for the tool's arguments.
    pub input_schema: Value,
}

impl LlmToolDefinition {
    /// Construct with an empty object schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: serde_json::json!({"type": "object"}),
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Attach an input schema.
    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

/// One event in a streaming completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StreamEvent {
    /// A chunk of user-visible assistant text.
    TextDelta(String),
    /// A chunk of internal reasoning/chain-of-thought text, stripped out of
    /// the user-visible stream (spec §4.4 point 1).
    ReasoningDelta(String),
    /// A new tool call has started.
    ToolCallStart {
        /// Call id.
        id: String,
        /// Tool name.
        name: String,
    },
    /// A chunk of a tool call's arguments JSON.
    ToolCallDelta {
        /// Call id.
        id: String,
        /// Partial arguments JSON text.
        args_delta: String,
    },
    /// A tool call's arguments are complete.
    ToolCallEnd {
        /// Call id.
        id: String,
    },
    /// Token usage for the completed request.
    Usage {
        /// Prompt tokens.
        input_tokens: usize,
        /// Completion tokens.
        output_tokens: usize,
    },
    /// The stream has ended.
    Done,
    /// The stream failed.
    Error(String),
}

/// A non-streaming completion result.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The assistant's message.
    pub message: Message,
    /// Whether the message carries tool calls.
    pub has_tool_calls: bool,
    /// Why generation stopped.
    pub stop_reason: StopReason,
    /// Token usage.
    pub usage: Usage,
    /// Reasoning text stripped from the visible message, if any (spec §4.4
    /// point 1). Not sent to the caller as part of the answer; recorded as
    /// a `think` reasoning-trace entry by the runtime.
    pub reasoning: Option<String>,
    /// Set when a tool call's arguments could not be repaired into valid
    /// JSON after 3 attempts (spec §4.4 point 2). The call is dropped from
    /// `message` and `has_tool_calls` is `false` — the caller sees an
    /// ordinary no-tool-call response, but this flag tells the runtime the
    /// cause was unrepairable JSON rather than a genuine final answer, so
    /// it can issue its one allowed corrective re-prompt instead of
    /// treating the response as done.
    pub tool_call_repair_failed: bool,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Natural end of turn.
    EndTurn,
    /// Hit the configured max token budget.
    MaxTokens,
    /// The model requested a tool call.
    ToolUse,
    /// A stop sequence or content filter ended generation.
    StopSequence,
}

/// Token usage for a single request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    /// Prompt tokens.
    pub input_tokens: usize,
    /// Completion tokens.
    pub output_tokens: usize,
}

impl Usage {
    /// Total tokens across prompt and completion.
    #[must_use]
    pub fn total(&self) -> usize {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_round_trip_text() {
        let user = Message::user("hello");
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.text(), Some("hello"));
    }

    #[test]
    fn tool_call_carries_arguments() {
        let call = ToolCall::new("1", "erp.count_purchase_orders").with_arguments(serde_json::json!({"vendor": "V-001"}));
        assert_eq!(call.arguments["vendor"], "V-001");
    }

    #[test]
    fn tool_result_marks_errors() {
        let ok = ToolCallResult::success("1", "3");
        let err = ToolCallResult::error("1", "backend unavailable");
        assert!(!ok.is_error);
        assert!(err.is_error);
    }
}
