//! The offline demo-stub backend (`backend = "demo-stub"` in config).
//!
//! Always available, never calls out over the network. Used for
//! deployments without a live ERP/CRM/IT/OA backend wired up yet, and for
//! exercising the tool-call path in tests without a mock HTTP server.
//! Returns small, deterministic canned records keyed by `domain.operation`.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::adapter::BackendAdapter;
use crate::error::{AdapterError, AdapterResult};

/// Offline fallback adapter; canned responses, always "available".
pub struct DemoStubAdapter {
    domain: String,
    allowlist: Vec<String>,
}

impl DemoStubAdapter {
    /// Build a demo adapter for `domain`, serving exactly `allowlist`'s
    /// operations (an empty allowlist serves every operation this stub
    /// knows a canned response for).
    #[must_use]
    pub fn new(domain: impl Into<String>, allowlist: Vec<String>) -> Self {
        Self { domain: domain.into(), allowlist }
    }

    fn canned(&self, operation: &str, params: &Value) -> Option<Value> {
        let key = format!("{}.{operation}", self.domain);
        match key.as_str() {
            "erp.count_purchase_orders" => Some(json!({ "count": 3, "vendor": params.get("vendor"), "status": params.get("status") })),
            "erp.get_purchase_order" => Some(json!({ "po_number": params.get("po_number").cloned().unwrap_or(json!("PO-0001")), "status": "open", "line_items": 4 })),
            "crm.lookup_account" => Some(json!({ "account_id": "ACC-1001", "name": "Demo Customer", "tier": "gold" })),
            "crm.list_open_cases" => Some(json!({ "cases": [] })),
            "it.get_ticket_status" => Some(json!({ "ticket_id": params.get("ticket_id").cloned().unwrap_or(json!("IT-001")), "status": "in_progress" })),
            "oa.send_email" => Some(json!({ "queued": true })),
            "oa.draft_email" => Some(json!({ "draft_id": "DRAFT-1", "subject": params.get("subject") })),
            "mold.search_mold_kb" => Some(json!({ "passages": [] })),
            "finance.summary" => Some(json!({ "revenue": 0, "note": "demo stub has no finance data" })),
            _ => None,
        }
    }
}

#[async_trait]
impl BackendAdapter for DemoStubAdapter {
    fn domain(&self) -> &str {
        &self.domain
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn declared_operations(&self) -> &[String] {
        &self.allowlist
    }

    async fn query(&self, operation: &str, params: &Value) -> AdapterResult<Value> {
        if !self.allowlist.is_empty() && !self.allowlist.iter().any(|op| op == operation) {
            return Err(AdapterError::OperationUnsupported(operation.to_owned()));
        }
        self.canned(operation, params).ok_or_else(|| AdapterError::OperationUnsupported(operation.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_canned_record_for_known_operation() {
        let adapter = DemoStubAdapter::new("erp", vec![]);
        let result = adapter.query("count_purchase_orders", &json!({"vendor": "V-001"})).await.unwrap();
        assert_eq!(result["count"], 3);
    }

    #[tokio::test]
    async fn unknown_operation_is_unsupported() {
        let adapter = DemoStubAdapter::new("erp", vec![]);
        let err = adapter.query("delete_everything", &json!({})).await.unwrap_err();
        assert!(matches!(err, AdapterError::OperationUnsupported(_)));
    }

    #[tokio::test]
    async fn allowlist_restricts_operations() {
        let adapter = DemoStubAdapter::new("erp", vec!["count_purchase_orders".to_owned()]);
        let err = adapter.query("get_purchase_order", &json!({})).await.unwrap_err();
        assert!(matches!(err, AdapterError::OperationUnsupported(_)));
    }
}
