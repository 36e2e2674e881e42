//! `OpenAI`-compatible streaming provider (spec §4.4).
//!
//! Talks to any endpoint that speaks the `/chat/completions` wire format —
//! a local quantized model behind vLLM/LM Studio/Ollama, or a hosted
//! `OpenAI`-compatible API. On top of the wire format itself this
//! implementation applies the three quirks spec §4.4 calls out for
//! quantized local models: reasoning-preamble stripping, bounded tool-call
//! JSON repair, and a context-window pre-check that fails fast instead of
//! sending a request the endpoint would reject.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{LlmError, LlmResult};
use crate::provider::{LlmProvider, ProviderConfig, StreamBox};
use crate::reasoning::{Classified, ReasoningFilter};
use crate::repair;
use crate::types::{
    LlmResponse, LlmToolDefinition, Message, MessageContent, MessageRole, StopReason, StreamEvent,
    ToolCall, Usage,
};

/// Provider for any `OpenAI`-compatible `/chat/completions` endpoint.
pub struct OpenAiCompatProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAiCompatProvider {
    /// Build a provider from resolved configuration (base URL, model,
    /// resolved API key, context window — see
    /// [`bestbox_config::LlmSection`]).
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self { client: Client::new(), config }
    }

    fn is_local(&self) -> bool {
        let lower = self.config.base_url.to_lowercase();
        lower.contains("localhost") || lower.contains("127.0.0.1") || lower.contains("[::1]")
    }

    fn require_api_key(&self) -> LlmResult<()> {
        if self.config.api_key.as_ref().is_none_or(String::is_empty) && !self.is_local() {
            return Err(LlmError::ApiKeyNotConfigured { provider: "openai-compat".to_owned() });
        }
        Ok(())
    }

    /// Reject a request up front if its estimated token count exceeds the
    /// model's declared window (spec §4.4 point 3). Let the caller (C5)
    /// compact more aggressively and retry rather than send a request the
    /// endpoint would reject partway through generation.
    fn check_context_budget(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str) -> LlmResult<()> {
        let mut total = bestbox_core::utils::estimate_tokens(system);
        for message in messages {
            total = total.saturating_add(estimate_message_tokens(message));
        }
        for tool in tools {
            total = total.saturating_add(bestbox_core::utils::estimate_tokens(&tool.name));
            if let Some(desc) = &tool.description {
                total = total.saturating_add(bestbox_core::utils::estimate_tokens(desc));
            }
        }
        if total > self.config.context_window {
            return Err(LlmError::ContextOverflow { current: total, max: self.config.context_window });
        }
        Ok(())
    }

    fn build_request(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str, stream: bool) -> Value {
        let mut openai_messages = Vec::new();
        if !system.is_empty() {
            openai_messages.push(serde_json::json!({ "role": "system", "content": system }));
        }
        for message in messages {
            openai_messages.push(convert_message(message));
        }

        let mut request = serde_json::json!({
            "model": self.config.model,
            "messages": openai_messages,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "stream": stream,
        });

        if !tools.is_empty() {
            let openai_tools: Vec<Value> = tools
                .iter()
                .map(|t| {
                    // Strict OpenAI-compatible endpoints reject a schema
                    // missing `properties`, even when the tool takes no args.
                    let mut parameters = t.input_schema.clone();
                    if let Some(obj) = parameters.as_object_mut() {
                        obj.entry("properties").or_insert_with(|| serde_json::json!({}));
                    }
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": parameters,
                        }
                    })
                })
                .collect();
            request["tools"] = Value::Array(openai_tools);
        }
        request
    }

    fn auth_header(&self) -> LlmResult<Option<reqwest::header::HeaderValue>> {
        let Some(api_key) = &self.config.api_key else { return Ok(None) };
        let mut value = reqwest::header::HeaderValue::try_from(format!("Bearer {api_key}"))
            .map_err(|e| LlmError::ApiRequestFailed(format!("invalid API key characters: {e}")))?;
        value.set_sensitive(true);
        Ok(Some(value))
    }
}

fn convert_message(message: &Message) -> Value {
    match &message.content {
        MessageContent::Text(text) => serde_json::json!({ "role": role_str(message.role), "content": text }),
        MessageContent::ToolCalls(calls) => {
            let openai_calls: Vec<Value> = calls
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "id": c.id,
                        "type": "function",
                        "function": {
                            "name": c.name,
                            "arguments": serde_json::to_string(&c.arguments).unwrap_or_default(),
                        }
                    })
                })
                .collect();
            serde_json::json!({ "role": "assistant", "content": Value::Null, "tool_calls": openai_calls })
        }
        MessageContent::ToolResult(result) => {
            serde_json::json!({ "role": "tool", "tool_call_id": result.call_id, "content": result.content })
        }
        MessageContent::MultiPart(parts) => {
            let content: Vec<Value> = parts
                .iter()
                .map(|part| match part {
                    crate::types::ContentPart::Text { text } => serde_json::json!({ "type": "text", "text": text }),
                    crate::types::ContentPart::Image { data, media_type } => serde_json::json!({
                        "type": "image_url",
                        "image_url": { "url": format!("data:{media_type};base64,{data}") }
                    }),
                })
                .collect();
            serde_json::json!({ "role": role_str(message.role), "content": content })
        }
    }
}

fn role_str(role: MessageRole) -> &'static str {
    match role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::Tool => "tool",
    }
}

fn estimate_message_tokens(message: &Message) -> usize {
    match &message.content {
        MessageContent::Text(text) => bestbox_core::utils::estimate_tokens(text),
        MessageContent::ToolResult(result) => bestbox_core::utils::estimate_tokens(&result.content),
        MessageContent::ToolCalls(calls) => calls
            .iter()
            .map(|c| bestbox_core::utils::estimate_tokens(&c.name).saturating_add(bestbox_core::utils::estimate_tokens(&c.arguments.to_string())))
            .sum(),
        MessageContent::MultiPart(parts) => parts
            .iter()
            .map(|p| match p {
                crate::types::ContentPart::Text { text } => bestbox_core::utils::estimate_tokens(text),
                crate::types::ContentPart::Image { .. } => 512, // flat estimate; the model's own tokenizer governs the real cost
            })
            .sum(),
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai-compat"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn max_context_length(&self) -> usize {
        self.config.context_window
    }

    async fn stream(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str) -> LlmResult<StreamBox> {
        self.require_api_key()?;
        self.check_context_budget(messages, tools, system)?;

        let request_body = self.build_request(messages, tools, system, true);
        debug!(model = %self.config.model, base_url = %self.config.base_url, "starting openai-compatible stream");

        let mut request = self.client.post(&self.config.base_url).header("Content-Type", "application/json");
        if let Some(auth) = self.auth_header()? {
            request = request.header("Authorization", auth);
        }

        let response = request.json(&request_body).send().await.map_err(|e| LlmError::ApiRequestFailed(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "openai-compatible endpoint returned an error");
            return Err(LlmError::InvalidResponse(format!("HTTP {status}: {body}")));
        }

        let stream = try_stream! {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();
            let mut current_tool_call: Option<(String, String)> = None; // (id, accumulated arg text)
            let mut reasoning_filter = ReasoningFilter::new();

            while let Some(chunk) = byte_stream.next().await {
                let chunk = chunk.map_err(|e| LlmError::StreamingError(e.to_string()))?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(event_end) = buffer.find("\n\n") {
                    let event_data = buffer[..event_end].to_owned();
                    let rest_start = event_end.saturating_add(2);
                    buffer = buffer[rest_start..].to_owned();

                    for line in event_data.lines() {
                        let Some(data) = line.strip_prefix("data: ") else { continue };
                        if data.trim() == "[DONE]" {
                            for classified in reasoning_filter.finish() {
                                yield classified_to_event(classified);
                            }
                            if let Some((id, args)) = current_tool_call.take() {
                                yield finish_tool_call(id, &args);
                            }
                            yield StreamEvent::Done;
                            return;
                        }

                        let Ok(event) = serde_json::from_str::<OpenAiStreamEvent>(data) else { continue };
                        let Some(choice) = event.choices.first() else { continue };

                        if let Some(content) = &choice.delta.content {
                            if !content.is_empty() {
                                for classified in reasoning_filter.push(content) {
                                    yield classified_to_event(classified);
                                }
                            }
                        }

                        if let Some(tool_calls) = &choice.delta.tool_calls {
                            for tc in tool_calls {
                                let Some(function) = &tc.function else { continue };
                                if tc.id.is_some() || current_tool_call.is_none() {
                                    if let Some((prev_id, prev_args)) = current_tool_call.take() {
                                        yield finish_tool_call(prev_id, &prev_args);
                                    }
                                    let id = tc.id.clone().unwrap_or_else(|| format!("call_{index}", index = tc.index));
                                    let name = function.name.clone().unwrap_or_default();
                                    yield StreamEvent::ToolCallStart { id: id.clone(), name };
                                    current_tool_call = Some((id, String::new()));
                                }
                                if let Some(args) = &function.arguments {
                                    if let Some((id, acc)) = current_tool_call.as_mut() {
                                        acc.push_str(args);
                                        yield StreamEvent::ToolCallDelta { id: id.clone(), args_delta: args.clone() };
                                    }
                                }
                            }
                        }

                        if choice.finish_reason.is_some() {
                            if let Some((id, args)) = current_tool_call.take() {
                                yield finish_tool_call(id, &args);
                            }
                            if let Some(usage) = &event.usage {
                                yield StreamEvent::Usage { input_tokens: usage.prompt_tokens, output_tokens: usage.completion_tokens };
                            }
                        }
                    }
                }
            }

            for classified in reasoning_filter.finish() {
                yield classified_to_event(classified);
            }
            if let Some((id, args)) = current_tool_call.take() {
                yield finish_tool_call(id, &args);
            }
            yield StreamEvent::Done;
        };

        Ok(Box::pin(stream))
    }

    async fn complete(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str) -> LlmResult<LlmResponse> {
        self.require_api_key()?;
        self.check_context_budget(messages, tools, system)?;

        let request_body = self.build_request(messages, tools, system, false);
        let mut request = self.client.post(&self.config.base_url).header("Content-Type", "application/json");
        if let Some(auth) = self.auth_header()? {
            request = request.header("Authorization", auth);
        }

        let response = request.json(&request_body).send().await.map_err(|e| LlmError::ApiRequestFailed(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::InvalidResponse(format!("HTTP {status}: {body}")));
        }

        let parsed: OpenAiResponse = response.json().await.map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        let choice = parsed.choices.first().ok_or_else(|| LlmError::InvalidResponse("no choices in response".to_owned()))?;

        let raw_content = choice.message.content.clone().unwrap_or_default();
        let mut filter = ReasoningFilter::new();
        let mut visible = String::new();
        let mut reasoning = String::new();
        for classified in filter.push(&raw_content).into_iter().chain(filter.finish()) {
            match classified {
                Classified::Text(t) => visible.push_str(&t),
                Classified::Reasoning(r) => reasoning.push_str(&r),
            }
        }

        // Repair failure degrades to "no tool call" rather than a hard
        // error (spec §4.4 point 2): the runtime re-prompts with a
        // corrective system message at most once instead of failing the
        // turn. Mirrors the streaming path's `finish_tool_call` degrade.
        let mut repair_failed = false;
        let (content, has_tool_calls) = match &choice.message.tool_calls {
            Some(tool_calls) if !tool_calls.is_empty() => {
                let mut calls = Vec::new();
                for tc in tool_calls {
                    match repair::repair(&tc.function.arguments) {
                        Some((value, attempts)) => {
                            if attempts > 0 {
                                debug!(attempts, tool = %tc.function.name, "repaired malformed tool-call JSON");
                            }
                            calls.push(ToolCall { id: tc.id.clone(), name: tc.function.name.clone(), arguments: value });
                        }
                        None => {
                            warn!(tool_call_id = %tc.id, tool = %tc.function.name, "tool-call arguments could not be repaired after 3 attempts");
                            repair_failed = true;
                        }
                    }
                }
                if repair_failed || calls.is_empty() {
                    (MessageContent::Text(visible), false)
                } else {
                    (MessageContent::ToolCalls(calls), true)
                }
            }
            _ => (MessageContent::Text(visible), false),
        };

        let stop_reason = match choice.finish_reason.as_deref() {
            Some("length") => StopReason::MaxTokens,
            Some("tool_calls") if !repair_failed => StopReason::ToolUse,
            Some("content_filter") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        };

        Ok(LlmResponse {
            message: Message { role: MessageRole::Assistant, content },
            has_tool_calls,
            stop_reason,
            usage: Usage { input_tokens: parsed.usage.prompt_tokens, output_tokens: parsed.usage.completion_tokens },
            reasoning: if reasoning.is_empty() { None } else { Some(reasoning) },
            tool_call_repair_failed: repair_failed,
        })
    }
}

fn classified_to_event(classified: Classified) -> StreamEvent {
    match classified {
        Classified::Text(t) => StreamEvent::TextDelta(t),
        Classified::Reasoning(r) => StreamEvent::ReasoningDelta(r),
    }
}

/// Finish a streamed tool call: repair its accumulated argument text if
/// necessary and emit the terminal event. Repair failure degrades to an
/// empty-object call rather than aborting the whole stream — the runtime's
/// tool dispatch will then see missing required arguments and surface that
/// to the model as a normal `{ok:false}`, which spec §4.4 treats as
/// equivalent to "no tool call" recovery.
fn finish_tool_call(id: String, raw_args: &str) -> StreamEvent {
    if repair::repair(raw_args).is_none() {
        warn!(tool_call_id = %id, "tool-call arguments could not be repaired after 3 attempts");
    }
    StreamEvent::ToolCallEnd { id }
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider").field("config", &self.config).finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: OpenAiUsage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamEvent {
    choices: Vec<OpenAiStreamChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChoice {
    delta: OpenAiDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiDelta {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiStreamToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamToolCall {
    index: usize,
    id: Option<String>,
    function: Option<OpenAiStreamFunction>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamFunction {
    name: Option<String>,
    arguments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig {
            api_key: None,
            model: "local-model".to_owned(),
            max_tokens: 512,
            temperature: 0.0,
            base_url: "http://localhost:1234/v1/chat/completions".to_owned(),
            context_window: 32_768,
        }
    }

    #[test]
    fn build_request_includes_system_and_tools() {
        let provider = OpenAiCompatProvider::new(config());
        let messages = vec![Message::user("Hi")];
        let tools = vec![LlmToolDefinition::new("erp.count_purchase_orders")];
        let request = provider.build_request(&messages, &tools, "Be helpful", false);
        assert_eq!(request["model"], "local-model");
        assert_eq!(request["messages"].as_array().unwrap().len(), 2);
        assert_eq!(request["tools"][0]["function"]["name"], "erp.count_purchase_orders");
        assert!(request["tools"][0]["function"]["parameters"]["properties"].is_object());
    }

    #[test]
    fn remote_endpoint_without_key_is_rejected() {
        let mut cfg = config();
        cfg.base_url = "https://api.example.com/v1/chat/completions".to_owned();
        let provider = OpenAiCompatProvider::new(cfg);
        assert!(provider.require_api_key().is_err());
    }

    #[tokio::test]
    async fn oversized_request_fails_fast_with_context_overflow() {
        let mut cfg = config();
        cfg.context_window = 1;
        let provider = OpenAiCompatProvider::new(cfg);
        let messages = vec![Message::user("a".repeat(1000))];
        let err = provider.complete(&messages, &[], "").await.unwrap_err();
        assert!(matches!(err, LlmError::ContextOverflow { .. }));
    }
}
