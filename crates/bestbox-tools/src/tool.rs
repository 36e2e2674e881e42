//! The [`Tool`] trait every catalog entry implements.

use async_trait::async_trait;
use bestbox_core::model::{ToolSpec, UserContext};
use serde_json::Value;

use crate::outcome::ToolOutcome;

/// One LLM-callable operation (spec §4.2).
///
/// Implementations only handle the actual dispatch; permission
/// enforcement and the write-class approval interrupt are handled once,
/// centrally, by [`crate::registry::ToolRegistry::invoke`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// This tool's declarative description.
    fn spec(&self) -> &ToolSpec;

    /// Execute the tool. Only called once permission has already been
    /// checked and, for write-class tools, approval has already been
    /// granted.
    async fn invoke(&self, args: Value, user_context: &UserContext) -> ToolOutcome;

    /// Human-readable summary of what this invocation would do, shown in
    /// the approval UI for write-class tools. Default: tool name + args.
    fn approval_summary(&self, args: &Value) -> String {
        format!("{}({args})", self.spec().name)
    }
}
