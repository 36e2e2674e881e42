//! Deterministic, queue-based [`LlmProvider`] double for end-to-end tests.
//!
//! One [`MockLlmProvider`] instance stands in for a single model role (the
//! router, or a specialist) — each scenario test builds one of each and
//! preloads the exact sequence of turns that role will be asked to produce.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bestbox_llm::{LlmError, LlmProvider, LlmResponse, LlmResult, LlmToolDefinition, Message, StopReason, StreamBox, StreamEvent, ToolCall, Usage};
use futures::stream;
use serde_json::Value;

/// A single scripted turn replayed by [`MockLlmProvider`].
#[derive(Debug, Clone)]
pub enum MockTurn {
    /// A plain-text response (router decision JSON or a final answer).
    Text(String),
    /// One or more tool calls.
    ToolCalls(Vec<MockToolCall>),
    /// A tool call whose arguments could not be repaired into valid JSON
    /// (spec §4.4 point 2) — simulates `complete()`'s degrade-to-no-tool-call
    /// path without needing to round-trip real malformed JSON through the
    /// repair module.
    UnrepairableToolCall,
}

impl MockTurn {
    /// Shorthand for a router decision turn.
    #[must_use]
    pub fn router_decision(agent: &str) -> Self {
        Self::Text(serde_json::json!({ "next": agent }).to_string())
    }

    /// Shorthand for a final-answer text turn.
    #[must_use]
    pub fn answer(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Shorthand for a single tool call.
    #[must_use]
    pub fn tool_call(name: impl Into<String>, args: Value) -> Self {
        Self::ToolCalls(vec![MockToolCall::new(name, args)])
    }
}

/// A single tool call specification for [`MockTurn::ToolCalls`].
#[derive(Debug, Clone)]
pub struct MockToolCall {
    id: String,
    name: String,
    arguments: Value,
}

impl MockToolCall {
    /// Build with an auto-generated call id.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self { id: format!("call-{}", uuid::Uuid::new_v4()), name: name.into(), arguments }
    }
}

/// A deterministic [`LlmProvider`] that replays preloaded [`MockTurn`]s in
/// order, one per call to `complete`/`stream`. Panics-by-error if the queue
/// runs dry, so a scenario under-scripting its mock surfaces as a test
/// failure rather than a silent empty response.
pub struct MockLlmProvider {
    turns: Mutex<VecDeque<MockTurn>>,
    calls: Mutex<usize>,
}

impl MockLlmProvider {
    /// Preload the exact sequence of turns this provider will produce.
    #[must_use]
    pub fn new(turns: Vec<MockTurn>) -> Self {
        Self { turns: Mutex::new(VecDeque::from(turns)), calls: Mutex::new(0) }
    }

    /// Number of `complete`/`stream` calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock().expect("lock poisoned")
    }

    fn next_turn(&self) -> LlmResult<MockTurn> {
        *self.calls.lock().expect("lock poisoned") += 1;
        self.turns.lock().expect("lock poisoned").pop_front().ok_or_else(|| LlmError::StreamingError("MockLlmProvider: no more turns queued".to_owned()))
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn max_context_length(&self) -> usize {
        32_000
    }

    async fn stream(&self, _messages: &[Message], _tools: &[LlmToolDefinition], _system: &str) -> LlmResult<StreamBox> {
        let turn = self.next_turn()?;
        let events: Vec<LlmResult<StreamEvent>> = match turn {
            MockTurn::Text(text) => vec![Ok(StreamEvent::TextDelta(text)), Ok(StreamEvent::Usage { input_tokens: 10, output_tokens: 10 }), Ok(StreamEvent::Done)],
            MockTurn::ToolCalls(calls) => {
                let mut events = Vec::new();
                for call in &calls {
                    events.push(Ok(StreamEvent::ToolCallStart { id: call.id.clone(), name: call.name.clone() }));
                    events.push(Ok(StreamEvent::ToolCallDelta { id: call.id.clone(), args_delta: call.arguments.to_string() }));
                    events.push(Ok(StreamEvent::ToolCallEnd { id: call.id.clone() }));
                }
                events.push(Ok(StreamEvent::Usage { input_tokens: 10, output_tokens: 10 }));
                events.push(Ok(StreamEvent::Done));
                events
            }
            MockTurn::UnrepairableToolCall => vec![
                Ok(StreamEvent::ToolCallStart { id: "call-unrepairable".to_owned(), name: "erp.count_purchase_orders".to_owned() }),
                Ok(StreamEvent::ToolCallDelta { id: "call-unrepairable".to_owned(), args_delta: "{not valid json".to_owned() }),
                Ok(StreamEvent::ToolCallEnd { id: "call-unrepairable".to_owned() }),
                Ok(StreamEvent::Usage { input_tokens: 10, output_tokens: 10 }),
                Ok(StreamEvent::Done),
            ],
        };
        Ok(Box::pin(stream::iter(events)))
    }

    async fn complete(&self, _messages: &[Message], _tools: &[LlmToolDefinition], _system: &str) -> LlmResult<LlmResponse> {
        let turn = self.next_turn()?;
        match turn {
            MockTurn::Text(text) => Ok(LlmResponse {
                message: Message::assistant(text),
                has_tool_calls: false,
                stop_reason: StopReason::EndTurn,
                usage: Usage { input_tokens: 10, output_tokens: 10 },
                reasoning: None,
                tool_call_repair_failed: false,
            }),
            MockTurn::ToolCalls(calls) => {
                let tool_calls: Vec<ToolCall> = calls.into_iter().map(|c| ToolCall::new(c.id, c.name).with_arguments(c.arguments)).collect();
                Ok(LlmResponse {
                    message: Message::assistant_with_tools(tool_calls),
                    has_tool_calls: true,
                    stop_reason: StopReason::ToolUse,
                    usage: Usage { input_tokens: 10, output_tokens: 10 },
                    reasoning: None,
                    tool_call_repair_failed: false,
                })
            }
            MockTurn::UnrepairableToolCall => Ok(LlmResponse {
                message: Message::assistant(String::new()),
                has_tool_calls: false,
                stop_reason: StopReason::EndTurn,
                usage: Usage { input_tokens: 10, output_tokens: 10 },
                reasoning: None,
                tool_call_repair_failed: true,
            }),
        }
    }
}
