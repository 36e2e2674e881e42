//! `POST /v1/chat/completions` — the OpenAI-compatible chat surface
//! (spec §6).

use std::collections::HashSet;
use std::convert::Infallible;

use async_stream::stream;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bestbox_core::ids::ThreadId;
use bestbox_core::model::{PermissionTag, UserContext};
use bestbox_runtime::TurnOutcome;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::sse::{ChatDelta, SseObserver};
use crate::state::AppState;

/// One message in the `messages` array. Only `role: "user"` entries are
/// meaningful to this endpoint — the runtime owns its own durable history
/// per `thread_id` and only needs the newest user turn (spec §3: threads
/// accumulate server-side, unlike a stateless OpenAI completion call).
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageDto {
    /// `"user"`, `"assistant"`, or `"system"`; only `"user"` is consumed.
    pub role: String,
    /// Message text.
    pub content: String,
}

/// Identity and permissions this request is made on behalf of. Forwarded by
/// the upstream gateway that already resolved the caller's SSO identity —
/// minting that identity is out of scope here (spec §1 non-goals).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserContextDto {
    /// Stable user identifier.
    #[serde(default)]
    pub user_id: String,
    /// Organization, for payload-filter isolation in C3.
    #[serde(default)]
    pub org_id: Option<String>,
    /// Informational role labels.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Permission tags granted to this caller.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl From<UserContextDto> for UserContext {
    fn from(dto: UserContextDto) -> Self {
        Self {
            user_id: dto.user_id,
            org_id: dto.org_id,
            roles: dto.roles,
            permissions: dto.permissions.into_iter().map(PermissionTag::new).collect::<HashSet<_>>(),
        }
    }
}

/// Request body for `POST /v1/chat/completions`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    /// Conversation so far; only the last `user` message is used as input.
    pub messages: Vec<ChatMessageDto>,
    /// Continue an existing thread, or start a new one if absent.
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Stream deltas over SSE instead of returning one JSON body.
    #[serde(default)]
    pub stream: Option<bool>,
    /// Caller identity and permissions.
    #[serde(default)]
    pub user_context: UserContextDto,
}

/// Non-streaming response body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionResponse {
    /// Thread this turn belongs to (new or continued).
    pub thread_id: String,
    /// The completed turn's id.
    pub turn_id: String,
    /// Lifecycle status the turn ended in.
    pub status: &'static str,
    /// The assistant's final answer, if the turn completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

fn last_user_message(messages: &[ChatMessageDto]) -> Result<&str, ApiError> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.as_str())
        .ok_or_else(|| ApiError(bestbox_core::CoreError::InternalError("messages must include at least one user message".to_owned())))
}

fn parse_thread_id(raw: &Option<String>) -> Result<Option<ThreadId>, ApiError> {
    match raw {
        None => Ok(None),
        Some(s) => ThreadId::parse(s).map(Some).ok_or_else(|| ApiError(bestbox_core::CoreError::InternalError(format!("malformed thread_id: {s}")))),
    }
}

fn outcome_to_response(outcome: TurnOutcome) -> ChatCompletionResponse {
    match outcome {
        TurnOutcome::Done { thread_id, turn_id, answer } => {
            ChatCompletionResponse { thread_id: thread_id.to_string(), turn_id: turn_id.to_string(), status: "done", answer: Some(answer) }
        }
        TurnOutcome::AwaitingHuman { thread_id, turn_id, .. } => {
            ChatCompletionResponse { thread_id: thread_id.to_string(), turn_id: turn_id.to_string(), status: "awaiting_human", answer: None }
        }
    }
}

/// Handles `POST /v1/chat/completions`: runs one turn to completion (or an
/// `awaiting_human`/`failed` terminal state) and either returns it as a
/// single JSON body or streams `think`/`act`/`observe`/`answer` deltas over
/// SSE as the turn progresses (spec §4.6 streaming emission order).
pub async fn chat_completions(State(state): State<AppState>, Json(request): Json<ChatCompletionRequest>) -> Result<Response, ApiError> {
    let input = last_user_message(&request.messages)?.to_owned();
    let thread_id = parse_thread_id(&request.thread_id)?;
    let user_context: UserContext = request.user_context.into();

    if request.stream.unwrap_or(false) {
        Ok(stream_chat(state, thread_id, input, user_context).await)
    } else {
        let outcome = state.runtime.run_turn(thread_id, &input, user_context, &bestbox_runtime::NullObserver).await?;
        Ok(Json(outcome_to_response(outcome)).into_response())
    }
}

async fn stream_chat(state: AppState, thread_id: Option<ThreadId>, input: String, user_context: UserContext) -> Response {
    let (observer, mut receiver) = SseObserver::channel();

    let event_stream = stream! {
        let runtime = state.runtime.clone();
        let drive = tokio::spawn(async move {
            runtime.run_turn(thread_id, &input, user_context, &observer).await
        });

        while let Some(delta) = receiver.recv().await {
            yield Ok::<Event, Infallible>(event_for(&delta));
        }

        let final_delta = match drive.await {
            Ok(Ok(outcome)) => final_delta_for(outcome),
            Ok(Err(error)) => ChatDelta { text: Some(format!("turn failed: {error}")), done: Some(true), ..ChatDelta::default() },
            Err(_) => ChatDelta { text: Some("turn task panicked".to_owned()), done: Some(true), ..ChatDelta::default() },
        };
        yield Ok(event_for(&final_delta));
    };

    Sse::new(event_stream).keep_alive(KeepAlive::default()).into_response()
}

fn final_delta_for(outcome: TurnOutcome) -> ChatDelta {
    match outcome {
        TurnOutcome::Done { .. } => ChatDelta { done: Some(true), ..ChatDelta::default() },
        TurnOutcome::AwaitingHuman { .. } => ChatDelta { reasoning_step: Some("awaiting_human".to_owned()), done: Some(true), ..ChatDelta::default() },
    }
}

fn event_for(delta: &ChatDelta) -> Event {
    Event::default().json_data(delta).unwrap_or_else(|_| Event::default().data("{}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_user_message_picks_the_most_recent_one() {
        let messages = vec![
            ChatMessageDto { role: "user".to_owned(), content: "first".to_owned() },
            ChatMessageDto { role: "assistant".to_owned(), content: "reply".to_owned() },
            ChatMessageDto { role: "user".to_owned(), content: "second".to_owned() },
        ];
        assert_eq!(last_user_message(&messages).unwrap(), "second");
    }

    #[test]
    fn no_user_message_is_rejected() {
        let messages = vec![ChatMessageDto { role: "system".to_owned(), content: "persona".to_owned() }];
        assert!(last_user_message(&messages).is_err());
    }

    #[test]
    fn malformed_thread_id_is_rejected() {
        assert!(parse_thread_id(&Some("not-a-uuid".to_owned())).is_err());
    }

    #[test]
    fn absent_thread_id_parses_to_none() {
        assert_eq!(parse_thread_id(&None).unwrap(), None);
    }
}
