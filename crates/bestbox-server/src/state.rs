//! Shared axum state: the one [`AgentRuntime`] a deployment builds at
//! startup, plus the resolved auth secret.

use std::sync::Arc;

use bestbox_runtime::AgentRuntime;

/// State handed to every route handler. Cheap to clone: both fields are
/// reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// The orchestrator every route drives.
    pub runtime: Arc<AgentRuntime>,
    /// The expected bearer token, if the deployment configured one.
    pub api_key: Option<Arc<str>>,
}
