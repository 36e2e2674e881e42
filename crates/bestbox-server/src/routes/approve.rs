//! `POST /v1/threads/{thread_id}/approve` — resolves a write-class tool call
//! left `awaiting_human` (spec §4.1, §6, §8 scenario 4).

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bestbox_core::ids::{ThreadId, TurnId};
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::chat::ChatCompletionResponse;
use crate::state::AppState;

fn outcome_to_response(outcome: bestbox_runtime::TurnOutcome) -> ChatCompletionResponse {
    use bestbox_runtime::TurnOutcome;
    match outcome {
        TurnOutcome::Done { thread_id, turn_id, answer } => {
            ChatCompletionResponse { thread_id: thread_id.to_string(), turn_id: turn_id.to_string(), status: "done", answer: Some(answer) }
        }
        TurnOutcome::AwaitingHuman { thread_id, turn_id, .. } => {
            ChatCompletionResponse { thread_id: thread_id.to_string(), turn_id: turn_id.to_string(), status: "awaiting_human", answer: None }
        }
    }
}

/// Request body for `POST /v1/threads/{thread_id}/approve`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalRequest {
    /// The interrupted turn to resolve.
    pub turn_id: String,
    /// Whether the pending write-class tool call should proceed.
    pub approved: bool,
    /// Optional reviewer note, recorded to the audit log alongside the
    /// decision (not currently surfaced back to the model).
    #[serde(default)]
    pub note: Option<String>,
}

/// Handles `POST /v1/threads/{thread_id}/approve`.
pub async fn approve(State(state): State<AppState>, Path(thread_id): Path<String>, Json(request): Json<ApprovalRequest>) -> Result<Response, ApiError> {
    let thread_id = ThreadId::parse(&thread_id)
        .ok_or_else(|| ApiError(bestbox_core::CoreError::InternalError(format!("malformed thread_id: {thread_id}"))))?;
    let turn_id = TurnId::parse(&request.turn_id)
        .ok_or_else(|| ApiError(bestbox_core::CoreError::InternalError(format!("malformed turn_id: {}", request.turn_id))))?;

    let outcome = state.runtime.approve_turn(thread_id, turn_id, request.approved, &bestbox_runtime::NullObserver).await?;
    Ok(Json(outcome_to_response(outcome)).into_response())
}
