//! [`ToolRegistry`]: the catalog built at startup, and the single place
//! permission checks and the write-class approval interrupt happen.

use std::collections::HashMap;

use bestbox_core::ids::ToolCallId;
use bestbox_core::model::{SideEffectClass, ToolSpec, UserContext};
use serde_json::Value;

use crate::outcome::{ApprovalEnvelope, ErrorKind, ToolOutcome};
use crate::tool::Tool;

/// name → tool lookup, built once at startup from a static `ToolSpec` list
/// per domain (spec §4.2 "added detail").
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Register one tool, keyed by its declared name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.spec().name.clone(), tool);
    }

    /// Look up a registered tool's spec, for LLM tool-definition export.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(AsRef::as_ref)
    }

    /// Every registered tool's spec, for building the LLM-visible tool list.
    pub fn all_specs(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tools.values().map(|tool| tool.spec())
    }

    /// Invoke `name` with `args` on behalf of `user_context` (spec §4.2's
    /// invocation contract): checks `permission_tag` first, then either
    /// dispatches (read-class) or returns a [`ToolOutcome::PendingApproval`]
    /// (write-class) without ever calling the tool's `invoke`.
    pub async fn invoke(&self, name: &str, args: Value, user_context: &UserContext) -> ToolOutcome {
        let Some(tool) = self.get(name) else {
            return ToolOutcome::err(ErrorKind::OperationUnsupported, format!("no such tool: {name}"));
        };

        let spec = tool.spec();
        if let Some(tag) = &spec.permission_tag {
            if !user_context.has_permission(tag) {
                return ToolOutcome::err(ErrorKind::PermissionDenied, format!("missing permission '{tag}' for tool '{name}'"));
            }
        }

        if spec.side_effect_class == SideEffectClass::Write {
            return ToolOutcome::PendingApproval(ApprovalEnvelope { tool_call_id: ToolCallId::new(), tool_name: name.to_owned(), args: args.clone(), summary: tool.approval_summary(&args) });
        }

        tool.invoke(args, user_context).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use bestbox_core::model::PermissionTag;

    use super::*;

    struct StubTool {
        spec: ToolSpec,
    }

    #[async_trait]
    impl Tool for StubTool {
        fn spec(&self) -> &ToolSpec {
            &self.spec
        }

        async fn invoke(&self, _args: Value, _user_context: &UserContext) -> ToolOutcome {
            ToolOutcome::ok(serde_json::json!({"done": true}))
        }
    }

    fn ctx(permissions: &[&str]) -> UserContext {
        UserContext { user_id: "u1".to_owned(), org_id: None, roles: Vec::new(), permissions: permissions.iter().map(|p| PermissionTag::new(*p)).collect::<HashSet<_>>() }
    }

    fn registry_with(side_effect_class: SideEffectClass, permission_tag: Option<PermissionTag>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(StubTool { spec: ToolSpec { name: "do_thing".to_owned(), description: "does a thing".to_owned(), arg_schema: serde_json::json!({}), permission_tag, side_effect_class } }));
        registry
    }

    #[tokio::test]
    async fn permission_denied_without_calling_tool() {
        let registry = registry_with(SideEffectClass::Read, Some(PermissionTag::new("erp:read")));
        let outcome = registry.invoke("do_thing", serde_json::json!({}), &ctx(&[])).await;
        assert!(matches!(outcome, ToolOutcome::Err { error_kind: ErrorKind::PermissionDenied, .. }));
    }

    #[tokio::test]
    async fn read_class_tool_executes_inline_when_authorized() {
        let registry = registry_with(SideEffectClass::Read, Some(PermissionTag::new("erp:read")));
        let outcome = registry.invoke("do_thing", serde_json::json!({}), &ctx(&["erp:read"])).await;
        assert!(matches!(outcome, ToolOutcome::Ok { .. }));
    }

    #[tokio::test]
    async fn write_class_tool_never_executes_inline() {
        let registry = registry_with(SideEffectClass::Write, None);
        let outcome = registry.invoke("do_thing", serde_json::json!({"x": 1}), &ctx(&[])).await;
        match outcome {
            ToolOutcome::PendingApproval(envelope) => assert_eq!(envelope.tool_name, "do_thing"),
            other => panic!("expected PendingApproval, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_unsupported() {
        let registry = ToolRegistry::new();
        let outcome = registry.invoke("missing", serde_json::json!({}), &ctx(&[])).await;
        assert!(matches!(outcome, ToolOutcome::Err { error_kind: ErrorKind::OperationUnsupported, .. }));
    }
}
