//! System prompts for the router and each specialist (spec §4).

use bestbox_core::model::AgentName;

/// The router's system prompt. Instructs the model to emit exactly
/// `{"next": "<agent>"}` naming one of the enumerated specialists, nothing
/// else — [`crate::router::decide`] parses this literally and falls back to
/// the lexicon heuristic when it can't.
#[must_use]
pub fn router_prompt() -> String {
    let names: Vec<&'static str> = AgentName::specialists().iter().map(AgentName::as_str).collect();
    format!(
        "You are the routing supervisor for a multi-domain support assistant. \
         Read the user's message and decide which single specialist should handle it. \
         Valid specialists: {}. \
         Respond with exactly one JSON object and nothing else: {{\"next\": \"<specialist>\"}}.",
        names.join(", ")
    )
}

/// The system prompt handed to `agent`'s tool-calling loop. Router and
/// Finish are never executed directly, so they fall back to a description
/// that only ever appears in logs or error messages.
#[must_use]
pub fn specialist_prompt(agent: AgentName) -> &'static str {
    match agent {
        AgentName::Erp => {
            "You are the ERP specialist. You answer questions about purchase orders, \
             vendors, and financial summaries using the erp_* tools. Cite the tool \
             result you relied on. If the user asks something outside ERP/finance, say \
             you cannot help with that."
        }
        AgentName::Crm => {
            "You are the CRM specialist. You answer questions about accounts, contacts, \
             and open cases using the crm_* tools. Cite the tool result you relied on."
        }
        AgentName::It => {
            "You are the IT operations specialist. You answer questions about ticket \
             status and incidents using the it_* tools. Cite the tool result you \
             relied on."
        }
        AgentName::Oa => {
            "You are the office automation specialist. You draft and, once approved, \
             send email on the user's behalf using the oa_* tools. Never claim an email \
             was sent unless the corresponding tool call succeeded."
        }
        AgentName::Mold => {
            "You are the injection-mold troubleshooting specialist. You diagnose \
             molding defects (flow marks, short shots, sink marks, warpage) using the \
             mold_search_kb tool and cite the passage numbers (e.g. [C1]) you used."
        }
        AgentName::Router | AgentName::Finish => "",
    }
}
