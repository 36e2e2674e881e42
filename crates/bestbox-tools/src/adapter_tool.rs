//! [`AdapterTool`]: a tool backed directly by a C1 backend adapter
//! operation.

use std::sync::Arc;

use async_trait::async_trait;
use bestbox_adapters::{AdapterError, AdapterRegistry};
use bestbox_core::model::{ToolSpec, UserContext};
use serde_json::Value;

use crate::outcome::{ErrorKind, ToolOutcome};
use crate::tool::Tool;

/// Wraps one `(domain, operation)` pair behind a [`Tool`], dispatching
/// through the shared [`AdapterRegistry`].
pub struct AdapterTool {
    spec: ToolSpec,
    domain: String,
    operation: String,
    adapters: Arc<AdapterRegistry>,
}

impl AdapterTool {
    /// Build a tool that dispatches `operation` on `domain`'s adapter.
    #[must_use]
    pub fn new(spec: ToolSpec, domain: impl Into<String>, operation: impl Into<String>, adapters: Arc<AdapterRegistry>) -> Self {
        Self { spec, domain: domain.into(), operation: operation.into(), adapters }
    }
}

#[async_trait]
impl Tool for AdapterTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: Value, _user_context: &UserContext) -> ToolOutcome {
        match self.adapters.query(&self.domain, &self.operation, &args).await {
            Ok(data) => ToolOutcome::ok(data),
            Err(AdapterError::BackendUnavailable(message)) => ToolOutcome::err(ErrorKind::BackendUnavailable, message),
            Err(AdapterError::OperationUnsupported(message)) => ToolOutcome::err(ErrorKind::OperationUnsupported, message),
            Err(AdapterError::BackendError { code, message }) => ToolOutcome::err(ErrorKind::BackendError, format!("[{code}] {message}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bestbox_adapters::AdapterRegistry;
    use bestbox_config::IntegrationSection;
    use bestbox_core::model::{PermissionTag, SideEffectClass};

    use super::*;

    fn demo_tool() -> AdapterTool {
        let mut integrations = HashMap::new();
        integrations.insert("erp".to_owned(), IntegrationSection { backend: "demo-stub".to_owned(), url: String::new(), auth_env: None, allowlist: vec!["count_purchase_orders".to_owned()] });
        let adapters = Arc::new(AdapterRegistry::build(&integrations));
        let spec = ToolSpec {
            name: "erp_count_purchase_orders".to_owned(),
            description: "Count purchase orders matching a filter".to_owned(),
            arg_schema: serde_json::json!({"type": "object"}),
            permission_tag: Some(PermissionTag::new("erp:read")),
            side_effect_class: SideEffectClass::Read,
        };
        AdapterTool::new(spec, "erp", "count_purchase_orders", adapters)
    }

    fn test_user_context() -> UserContext {
        UserContext { user_id: "u1".to_owned(), org_id: None, roles: Vec::new(), permissions: std::collections::HashSet::new() }
    }

    #[tokio::test]
    async fn dispatches_through_adapter_registry() {
        let tool = demo_tool();
        let ctx = test_user_context();
        let outcome = tool.invoke(serde_json::json!({"vendor": "V-001"}), &ctx).await;
        match outcome {
            ToolOutcome::Ok { data } => assert_eq!(data["count"], 3),
            other => panic!("expected Ok, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsupported_operation_maps_to_error_kind() {
        let tool = demo_tool();
        let ctx = test_user_context();
        let outcome = AdapterTool::new(tool.spec.clone(), "erp", "delete_all", tool.adapters.clone()).invoke(serde_json::json!({}), &ctx).await;
        match outcome {
            ToolOutcome::Err { error_kind, .. } => assert_eq!(error_kind, ErrorKind::OperationUnsupported),
            other => panic!("expected Err, got {other:?}"),
        }
    }
}
