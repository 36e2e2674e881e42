//! Builds the shared [`ToolRegistry`] (spec §4.2) and the per-specialist
//! tool catalog (spec §4.6) that bounds what each agent's `llm_tools` list
//! contains.

use std::sync::Arc;

use bestbox_adapters::AdapterRegistry;
use bestbox_core::model::{AgentName, PermissionTag, SideEffectClass, ToolSpec};
use bestbox_retriever::HybridRetriever;
use bestbox_tools::{AdapterTool, KbSearchTool, ToolRegistry};
use serde_json::json;

fn spec(name: &str, description: &str, arg_schema: serde_json::Value, permission_tag: Option<&str>, side_effect_class: SideEffectClass) -> ToolSpec {
    ToolSpec { name: name.to_owned(), description: description.to_owned(), arg_schema, permission_tag: permission_tag.map(PermissionTag::new), side_effect_class }
}

/// Build the runtime's tool registry: one [`AdapterTool`] per declared C1
/// operation, plus the mold domain's [`KbSearchTool`] (spec §4.3 and §4.6's
/// `finance.summary` permission-denial scenario, wired under the `Erp`
/// specialist since `finance` isn't its own graph node).
#[must_use]
pub fn build(adapters: Arc<AdapterRegistry>, mold_retriever: Arc<HybridRetriever>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Box::new(AdapterTool::new(
        spec("erp_count_purchase_orders", "Count purchase orders matching an optional vendor/status filter", json!({"type": "object", "properties": {"vendor": {"type": "string"}, "status": {"type": "string"}}}), Some("erp:read"), SideEffectClass::Read),
        "erp",
        "count_purchase_orders",
        adapters.clone(),
    )));
    registry.register(Box::new(AdapterTool::new(
        spec("erp_get_purchase_order", "Fetch a purchase order by id", json!({"type": "object", "properties": {"po_id": {"type": "string"}}, "required": ["po_id"]}), Some("erp:read"), SideEffectClass::Read),
        "erp",
        "get_purchase_order",
        adapters.clone(),
    )));
    registry.register(Box::new(AdapterTool::new(
        spec("erp_finance_summary", "Summarize financial totals for a period", json!({"type": "object", "properties": {"period": {"type": "string"}}}), Some("finance:read"), SideEffectClass::Read),
        "finance",
        "summary",
        adapters.clone(),
    )));

    registry.register(Box::new(AdapterTool::new(
        spec("crm_lookup_account", "Look up an account by name or id", json!({"type": "object", "properties": {"account": {"type": "string"}}, "required": ["account"]}), Some("crm:read"), SideEffectClass::Read),
        "crm",
        "lookup_account",
        adapters.clone(),
    )));
    registry.register(Box::new(AdapterTool::new(
        spec("crm_list_open_cases", "List open cases for an account", json!({"type": "object", "properties": {"account": {"type": "string"}}}), Some("crm:read"), SideEffectClass::Read),
        "crm",
        "list_open_cases",
        adapters.clone(),
    )));

    registry.register(Box::new(AdapterTool::new(
        spec("it_get_ticket_status", "Get the current status of an IT ticket", json!({"type": "object", "properties": {"ticket_id": {"type": "string"}}, "required": ["ticket_id"]}), Some("it:read"), SideEffectClass::Read),
        "it",
        "get_ticket_status",
        adapters.clone(),
    )));

    registry.register(Box::new(AdapterTool::new(
        spec("oa_draft_email", "Draft an email without sending it", json!({"type": "object", "properties": {"to": {"type": "string"}, "subject": {"type": "string"}, "body": {"type": "string"}}, "required": ["to", "subject", "body"]}), Some("oa:read"), SideEffectClass::Read),
        "oa",
        "draft_email",
        adapters.clone(),
    )));
    registry.register(Box::new(AdapterTool::new(
        spec("oa_send_email", "Send an email on the user's behalf", json!({"type": "object", "properties": {"to": {"type": "string"}, "subject": {"type": "string"}, "body": {"type": "string"}}, "required": ["to", "subject", "body"]}), Some("oa:write"), SideEffectClass::Write),
        "oa",
        "send_email",
        adapters,
    )));

    registry.register(Box::new(KbSearchTool::new(
        spec("mold_search_kb", "Search the mold defect knowledge base", json!({"type": "object", "properties": {"query": {"type": "string"}}, "required": ["query"]}), None, SideEffectClass::Read),
        "mold",
        mold_retriever,
    )));

    registry
}

/// The tool names visible to `agent`'s model calls (spec §4.6: each
/// specialist only sees its own domain's tools, plus `Erp` additionally
/// seeing the finance summary tool).
#[must_use]
pub fn tools_for(agent: AgentName) -> &'static [&'static str] {
    match agent {
        AgentName::Erp => &["erp_count_purchase_orders", "erp_get_purchase_order", "erp_finance_summary"],
        AgentName::Crm => &["crm_lookup_account", "crm_list_open_cases"],
        AgentName::It => &["it_get_ticket_status"],
        AgentName::Oa => &["oa_draft_email", "oa_send_email"],
        AgentName::Mold => &["mold_search_kb"],
        AgentName::Router | AgentName::Finish => &[],
    }
}
