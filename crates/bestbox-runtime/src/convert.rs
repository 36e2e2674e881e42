//! Translates between [`bestbox_core::model::Message`] (the durable,
//! checkpointed history) and [`bestbox_llm::Message`] (the wire-neutral
//! shape C4 speaks).
//!
//! The durable model records one tool call per [`bestbox_core::model::Message`]
//! (this runtime only ever asks the model for one tool call at a time, see
//! `DESIGN.md`), so a single core message maps to exactly one LLM message in
//! either direction.

use bestbox_core::model::{Message as CoreMessage, MessageRole as CoreRole};
use bestbox_llm::{Message as LlmMessage, ToolCall, ToolCallResult};

/// Render a turn's durable history as the message list C4 expects.
#[must_use]
pub fn to_llm_messages(history: &[CoreMessage]) -> Vec<LlmMessage> {
    history.iter().map(to_llm_message).collect()
}

fn to_llm_message(message: &CoreMessage) -> LlmMessage {
    match message.role {
        CoreRole::User => LlmMessage::user(message.content.clone()),
        CoreRole::System => LlmMessage::system(message.content.clone()),
        CoreRole::Assistant => match (&message.tool_name, &message.tool_call_id, &message.tool_args) {
            (Some(name), Some(call_id), args) => {
                let arguments = args.clone().unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
                LlmMessage::assistant_with_tools(vec![ToolCall::new(call_id.to_string(), name.clone()).with_arguments(arguments)])
            }
            _ => LlmMessage::assistant(message.content.clone()),
        },
        CoreRole::ToolResult => {
            let call_id = message.tool_call_id.map(|id| id.to_string()).unwrap_or_default();
            let is_error = tool_result_is_error(&message.content);
            LlmMessage::tool_result(if is_error { ToolCallResult::error(call_id, message.content.clone()) } else { ToolCallResult::success(call_id, message.content.clone()) })
        }
    }
}

/// A tool-result message's content is always the JSON-serialized
/// [`bestbox_tools::ToolOutcome`]; sniff its `kind` tag rather than
/// threading a parallel `is_error` field through the durable model.
fn tool_result_is_error(content: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(content).ok().and_then(|value| value.get("kind").and_then(|k| k.as_str()).map(|k| k == "Err")).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use bestbox_core::ids::ToolCallId;
    use bestbox_tools::ToolOutcome;

    use super::*;

    #[test]
    fn user_and_system_round_trip_as_text() {
        let rendered = to_llm_messages(&[CoreMessage::user("hi"), CoreMessage::system("be nice")]);
        assert_eq!(rendered[0].text(), Some("hi"));
        assert_eq!(rendered[1].text(), Some("be nice"));
    }

    #[test]
    fn assistant_tool_call_message_carries_one_call() {
        let call_id = ToolCallId::new();
        let mut message = CoreMessage::assistant(String::new());
        message.tool_name = Some("erp_get_purchase_order".to_owned());
        message.tool_call_id = Some(call_id);
        message.tool_args = Some(serde_json::json!({"po_id": "PO-1"}));

        let rendered = to_llm_message(&message);
        let calls = rendered.tool_calls().expect("tool calls");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "erp_get_purchase_order");
        assert_eq!(calls[0].id, call_id.to_string());
    }

    #[test]
    fn tool_result_error_flag_is_derived_from_outcome_kind() {
        let call_id = ToolCallId::new();
        let ok = CoreMessage::tool_result(call_id, "t", serde_json::to_string(&ToolOutcome::ok(serde_json::json!({"count": 1}))).unwrap());
        let err = CoreMessage::tool_result(call_id, "t", serde_json::to_string(&ToolOutcome::err(bestbox_tools::ErrorKind::BackendError, "down")).unwrap());

        assert!(!to_llm_message(&ok).tool_calls().is_some()); // sanity: not a tool-call message
        assert!(!tool_result_is_error(&ok.content));
        assert!(tool_result_is_error(&err.content));
    }
}
