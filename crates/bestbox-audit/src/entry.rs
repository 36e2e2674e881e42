//! Audit entry types (spec §4.9).

use bestbox_core::ids::{ThreadId, Timestamp, TurnId};
use serde::{Deserialize, Serialize};

/// The kind of event an [`AuditEntry`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A turn was opened.
    TurnStart,
    /// A tool was invoked.
    ToolCall,
    /// A turn finalized (`done` or `failed`).
    TurnEnd,
    /// A post-hoc rating arrived for a turn.
    Rating,
}

/// One append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Turn this entry concerns.
    pub turn_id: TurnId,
    /// Thread the turn belongs to.
    pub thread_id: ThreadId,
    /// Identity of the caller.
    pub user_id: String,
    /// Organization the caller belongs to, if any.
    pub org_id: Option<String>,
    /// What kind of event this is.
    pub event_type: AuditEventType,
    /// Event-specific structured payload.
    pub payload: serde_json::Value,
    /// When the event was recorded.
    pub timestamp: Timestamp,
}

impl AuditEntry {
    /// Record a turn opening.
    #[must_use]
    pub fn turn_start(turn_id: TurnId, thread_id: ThreadId, user_id: impl Into<String>, org_id: Option<String>, input_text: &str) -> Self {
        Self {
            turn_id,
            thread_id,
            user_id: user_id.into(),
            org_id,
            event_type: AuditEventType::TurnStart,
            payload: serde_json::json!({ "input_text": input_text }),
            timestamp: Timestamp::now(),
        }
    }

    /// Record a tool invocation and its outcome.
    #[must_use]
    pub fn tool_call(
        turn_id: TurnId,
        thread_id: ThreadId,
        user_id: impl Into<String>,
        org_id: Option<String>,
        tool_name: &str,
        args: &serde_json::Value,
        ok: bool,
        summary: &str,
    ) -> Self {
        Self {
            turn_id,
            thread_id,
            user_id: user_id.into(),
            org_id,
            event_type: AuditEventType::ToolCall,
            payload: serde_json::json!({
                "tool_name": tool_name,
                "args": args,
                "ok": ok,
                "summary": summary,
            }),
            timestamp: Timestamp::now(),
        }
    }

    /// Record a turn finalizing.
    #[must_use]
    pub fn turn_end(
        turn_id: TurnId,
        thread_id: ThreadId,
        user_id: impl Into<String>,
        org_id: Option<String>,
        status: &str,
        tool_call_count: u32,
    ) -> Self {
        Self {
            turn_id,
            thread_id,
            user_id: user_id.into(),
            org_id,
            event_type: AuditEventType::TurnEnd,
            payload: serde_json::json!({
                "status": status,
                "tool_call_count": tool_call_count,
            }),
            timestamp: Timestamp::now(),
        }
    }

    /// Record a rating arriving for a (possibly long-completed) turn.
    #[must_use]
    pub fn rating(turn_id: TurnId, thread_id: ThreadId, user_id: impl Into<String>, org_id: Option<String>, good: bool) -> Self {
        Self {
            turn_id,
            thread_id,
            user_id: user_id.into(),
            org_id,
            event_type: AuditEventType::Rating,
            payload: serde_json::json!({ "good": good }),
            timestamp: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_start_carries_input_text() {
        let entry = AuditEntry::turn_start(TurnId::new(), ThreadId::new(), "u1", None, "hello");
        assert_eq!(entry.event_type, AuditEventType::TurnStart);
        assert_eq!(entry.payload["input_text"], "hello");
    }

    #[test]
    fn tool_call_carries_outcome() {
        let entry = AuditEntry::tool_call(
            TurnId::new(),
            ThreadId::new(),
            "u1",
            Some("org1".to_owned()),
            "erp.count_purchase_orders",
            &serde_json::json!({"vendor": "V-001"}),
            true,
            "3",
        );
        assert_eq!(entry.payload["ok"], true);
        assert_eq!(entry.org_id.as_deref(), Some("org1"));
    }
}
