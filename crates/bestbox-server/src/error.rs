//! Maps [`CoreError`] (spec §7) to the HTTP status codes spec §6 assigns,
//! with a JSON error body. Never includes a stack trace or internal detail
//! beyond the error's own message (spec §7 "user-visible messages never
//! include stack traces").

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bestbox_core::CoreError;
use bestbox_runtime::RuntimeError;
use serde::Serialize;

/// Wraps a [`CoreError`] so it can be returned directly from an axum handler.
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        Self(error)
    }
}

impl From<RuntimeError> for ApiError {
    fn from(error: RuntimeError) -> Self {
        Self(error.to_core_error())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let kind = match &self.0 {
            CoreError::PermissionDenied { .. } => "permission_denied",
            CoreError::ContextOverflow { .. } => "context_overflow",
            CoreError::ResourceBusy { .. } => "resource_busy",
            CoreError::CheckpointConflict { .. } => "checkpoint_conflict",
            CoreError::DeadlineExceeded { .. } => "deadline_exceeded",
            CoreError::UpstreamUnavailable(_) => "upstream_unavailable",
            CoreError::InternalError(_) => "internal_error",
        };
        (status, Json(ErrorBody { error: kind, message: self.0.to_string() })).into_response()
    }
}
