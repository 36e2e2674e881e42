//! `GET /v1/threads/{thread_id}` — thread status and its turn history
//! (spec §6).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use bestbox_core::ids::ThreadId;
use bestbox_core::model::ThreadStatus;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// One turn in a thread's history, as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct TurnSummaryDto {
    /// Turn id.
    pub turn_id: String,
    /// Raw input text that opened the turn.
    pub input: String,
    /// Specialist that handled (or is handling) the turn.
    pub agent: String,
    /// Number of tool calls executed so far.
    pub tool_call_count: u32,
    /// Final answer, once the turn completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// Response body for `GET /v1/threads/{thread_id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadDto {
    /// Thread id.
    pub thread_id: String,
    /// Lifecycle status.
    pub status: &'static str,
    /// Every turn recorded against this thread, oldest first.
    pub turns: Vec<TurnSummaryDto>,
}

fn status_label(status: ThreadStatus) -> &'static str {
    match status {
        ThreadStatus::Active => "active",
        ThreadStatus::Interrupted => "interrupted",
        ThreadStatus::Complete => "complete",
        ThreadStatus::Failed => "failed",
    }
}

/// Handles `GET /v1/threads/{thread_id}`.
pub async fn get_thread(State(state): State<AppState>, Path(thread_id): Path<String>) -> Result<impl IntoResponse, ApiError> {
    let thread_id = ThreadId::parse(&thread_id)
        .ok_or_else(|| ApiError(bestbox_core::CoreError::InternalError(format!("malformed thread_id: {thread_id}"))))?;

    let (thread, turns) = state.runtime.get_thread(thread_id).await?;

    let turns = turns
        .into_iter()
        .map(|turn| TurnSummaryDto {
            turn_id: turn.turn_id.to_string(),
            input: turn.input_text,
            agent: turn.current_agent.as_str().to_owned(),
            tool_call_count: turn.tool_call_count,
            answer: turn.final_answer,
        })
        .collect();

    Ok(Json(ThreadDto { thread_id: thread.thread_id.to_string(), status: status_label(thread.status), turns }))
}
