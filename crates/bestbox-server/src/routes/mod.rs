//! HTTP surface routes (spec §6).

pub mod approve;
pub mod chat;
pub mod threads;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full `axum` router: `/v1/chat/completions`,
/// `/v1/threads/{thread_id}`, `/v1/threads/{thread_id}/approve`.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/v1/chat/completions", post(chat::chat_completions))
        .route("/v1/threads/:thread_id", get(threads::get_thread))
        .route("/v1/threads/:thread_id/approve", post(approve::approve))
        .with_state(state)
}
