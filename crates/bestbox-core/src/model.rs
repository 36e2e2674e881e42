//! Core data model: threads, turns, messages, tool specs (spec §3).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ids::{ThreadId, ToolCallId, Timestamp, TurnId};

/// A permission tag attached to a tool (`erp:read`, `finance:read`, ...).
///
/// Deliberately a plain string newtype rather than a closed enum: the set of
/// permission tags is deployment-defined (integrations are configured per
/// site), not fixed at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTag(pub String);

impl PermissionTag {
    /// Construct from any string-like value.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

impl std::fmt::Display for PermissionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PermissionTag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity, roles, and organization context a request is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    /// Stable user identifier (from the calling application's auth layer).
    pub user_id: String,
    /// Organization the user belongs to, for payload-filter isolation in C3.
    pub org_id: Option<String>,
    /// Role labels, informational only (authorization runs on `permissions`).
    pub roles: Vec<String>,
    /// Permission tags granted to this caller.
    pub permissions: HashSet<PermissionTag>,
}

impl UserContext {
    /// True if the caller holds the given permission tag.
    #[must_use]
    pub fn has_permission(&self, tag: &PermissionTag) -> bool {
        self.permissions.contains(tag)
    }
}

/// Lifecycle status of a [`Thread`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    /// Accepting new turns.
    Active,
    /// Parked on an `awaiting_human` interrupt.
    Interrupted,
    /// No further turns expected; retained per policy.
    Complete,
    /// Ended on an unrecoverable error.
    Failed,
}

/// A conversation: an ordered sequence of [`Turn`]s sharing context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    /// Opaque thread identifier.
    pub thread_id: ThreadId,
    /// Identity the thread is scoped to.
    pub user_context: UserContext,
    /// Creation time.
    pub created_at: Timestamp,
    /// Current lifecycle status.
    pub status: ThreadStatus,
    /// Turn ids belonging to this thread, in order.
    pub turn_ids: Vec<TurnId>,
}

impl Thread {
    /// Start a new, empty thread for the given caller.
    #[must_use]
    pub fn new(user_context: UserContext) -> Self {
        Self {
            thread_id: ThreadId::new(),
            user_context,
            created_at: Timestamp::now(),
            status: ThreadStatus::Active,
            turn_ids: Vec::new(),
        }
    }
}

/// Human or automated quality rating left on a completed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// Marked helpful.
    Good,
    /// Marked unhelpful.
    Bad,
}

/// One request/response exchange within a [`Thread`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Opaque turn identifier.
    pub turn_id: TurnId,
    /// Owning thread.
    pub thread_id: ThreadId,
    /// Raw user input text that opened the turn.
    pub input_text: String,
    /// Turn start time.
    pub started_at: Timestamp,
    /// Turn completion time, once finalized.
    pub ended_at: Option<Timestamp>,
    /// Specialist node currently (or finally) handling the turn.
    pub current_agent: AgentName,
    /// Number of tool calls executed so far this turn.
    pub tool_call_count: u32,
    /// Final assistant answer, once produced.
    pub final_answer: Option<String>,
    /// Optional post-hoc rating.
    pub rating: Option<Rating>,
}

impl Turn {
    /// Open a new turn on a thread.
    #[must_use]
    pub fn new(thread_id: ThreadId, input_text: impl Into<String>) -> Self {
        Self {
            turn_id: TurnId::new(),
            thread_id,
            input_text: input_text.into(),
            started_at: Timestamp::now(),
            ended_at: None,
            current_agent: AgentName::Router,
            tool_call_count: 0,
            final_answer: None,
            rating: None,
        }
    }

    /// Whether the turn has hit its configured tool-call ceiling.
    #[must_use]
    pub fn at_tool_call_limit(&self, max_tool_calls_per_turn: u32) -> bool {
        self.tool_call_count >= max_tool_calls_per_turn
    }
}

/// Graph node names (spec §4.6): the router, one specialist per domain, and
/// the terminal sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentName {
    /// Supervisor node that selects a specialist.
    Router,
    /// ERP domain specialist.
    Erp,
    /// CRM domain specialist.
    Crm,
    /// IT operations domain specialist.
    It,
    /// Office automation domain specialist.
    Oa,
    /// Mold troubleshooting knowledge-base domain specialist.
    Mold,
    /// Terminal sink node.
    Finish,
}

impl AgentName {
    /// Parse a router decision string (`{"next": "<agent_name>"}`) into a
    /// known specialist. Returns `None` for anything outside the enumerated
    /// set, including `router` and `finish` which are not valid routing
    /// targets.
    #[must_use]
    pub fn parse_specialist(s: &str) -> Option<Self> {
        match s {
            "erp" => Some(Self::Erp),
            "crm" => Some(Self::Crm),
            "it" => Some(Self::It),
            "oa" => Some(Self::Oa),
            "mold" => Some(Self::Mold),
            _ => None,
        }
    }

    /// All specialist domains (excludes `router` and `finish`).
    #[must_use]
    pub fn specialists() -> &'static [Self] {
        &[Self::Erp, Self::Crm, Self::It, Self::Oa, Self::Mold]
    }

    /// Lowercase name, matching the routing JSON and config key vocabulary.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Router => "router",
            Self::Erp => "erp",
            Self::Crm => "crm",
            Self::It => "it",
            Self::Oa => "oa",
            Self::Mold => "mold",
            Self::Finish => "finish",
        }
    }
}

impl std::fmt::Display for AgentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One step of a structured reasoning trace emitted alongside a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReasoningStep {
    /// Internal reasoning text, stripped from the user-visible answer.
    Think { text: String },
    /// A tool dispatch.
    Act { tool_name: String, tool_call_id: ToolCallId },
    /// A tool result observation.
    Observe { tool_call_id: ToolCallId, summary: String },
    /// Final answer synthesis tokens.
    Answer { text: String },
}

/// Role of a [`Message`] within a thread's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// End-user input.
    User,
    /// Model output.
    Assistant,
    /// Result of a tool invocation, fed back to the model.
    ToolResult,
    /// System / digest / instruction content.
    System,
}

/// One immutable item in a thread's message history (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Which role produced this message.
    pub role: MessageRole,
    /// Text content.
    pub content: String,
    /// Name of the tool this message concerns, if any.
    pub tool_name: Option<String>,
    /// Arguments passed to the tool, if this is a tool invocation record.
    pub tool_args: Option<serde_json::Value>,
    /// Identifier correlating a tool call with its result.
    pub tool_call_id: Option<ToolCallId>,
    /// Structured think/act/observe/answer trace, if captured.
    pub reasoning_trace: Vec<ReasoningStep>,
    /// Append timestamp; messages are immutable once appended.
    pub created_at: Timestamp,
}

impl Message {
    /// Construct a plain user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_name: None,
            tool_args: None,
            tool_call_id: None,
            reasoning_trace: Vec::new(),
            created_at: Timestamp::now(),
        }
    }

    /// Construct a plain assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_name: None,
            tool_args: None,
            tool_call_id: None,
            reasoning_trace: Vec::new(),
            created_at: Timestamp::now(),
        }
    }

    /// Construct a system-tagged message (persona, digest, corrective prompt).
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            tool_name: None,
            tool_args: None,
            tool_call_id: None,
            reasoning_trace: Vec::new(),
            created_at: Timestamp::now(),
        }
    }

    /// Construct a tool-result message correlated to a prior tool call.
    #[must_use]
    pub fn tool_result(tool_call_id: ToolCallId, tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::ToolResult,
            content: content.into(),
            tool_name: Some(tool_name.into()),
            tool_args: None,
            tool_call_id: Some(tool_call_id),
            reasoning_trace: Vec::new(),
            created_at: Timestamp::now(),
        }
    }
}

/// Side-effect classification of a tool (spec §3, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffectClass {
    /// Safe to execute inline once permission-checked.
    Read,
    /// Requires an `awaiting_human` approval interrupt before execution.
    Write,
}

/// Declarative description of one LLM-callable operation (spec §3, §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique tool name, as presented to the LLM.
    pub name: String,
    /// Natural-language description.
    pub description: String,
    /// JSON Schema describing the tool's arguments.
    pub arg_schema: serde_json::Value,
    /// Permission tag required to invoke this tool, if any.
    pub permission_tag: Option<PermissionTag>,
    /// Whether invocation is safe to run inline or requires approval.
    pub side_effect_class: SideEffectClass,
}

/// In-memory per-turn agent state (spec §3).
///
/// `messages` only ever grows within a turn; compaction across turns is the
/// responsibility of the turn context manager, not this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    /// Append-only message history.
    pub messages: Vec<Message>,
    /// Node currently handling the turn.
    pub current_agent: AgentName,
    /// Tool calls executed so far this turn.
    pub tool_call_count: u32,
    /// Identity context for permission checks.
    pub user_context: UserContext,
    /// Retrieved passages keyed by domain, accumulated across tool calls.
    pub retrieved_context: HashMap<String, serde_json::Value>,
    /// Whether the specialist has already been issued its one corrective
    /// re-prompt this turn after an unrepairable tool-call JSON response
    /// (spec §4.4 point 2). Checkpointed so a crash/resume doesn't grant a
    /// second one.
    #[serde(default)]
    pub tool_json_reprompted: bool,
}

impl AgentState {
    /// Start fresh per-turn state for a new turn.
    #[must_use]
    pub fn new(user_context: UserContext) -> Self {
        Self {
            messages: Vec::new(),
            current_agent: AgentName::Router,
            tool_call_count: 0,
            user_context,
            retrieved_context: HashMap::new(),
            tool_json_reprompted: false,
        }
    }

    /// Append a message, preserving the monotonic-growth invariant.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_name_parses_specialists_only() {
        assert_eq!(AgentName::parse_specialist("erp"), Some(AgentName::Erp));
        assert_eq!(AgentName::parse_specialist("router"), None);
        assert_eq!(AgentName::parse_specialist("finish"), None);
        assert_eq!(AgentName::parse_specialist("bogus"), None);
    }

    #[test]
    fn turn_tracks_tool_call_limit() {
        let mut turn = Turn::new(ThreadId::new(), "hello");
        assert!(!turn.at_tool_call_limit(10));
        turn.tool_call_count = 10;
        assert!(turn.at_tool_call_limit(10));
    }

    #[test]
    fn user_context_permission_check() {
        let mut permissions = HashSet::new();
        permissions.insert(PermissionTag::new("erp:read"));
        let ctx = UserContext {
            user_id: "u1".into(),
            org_id: None,
            roles: vec![],
            permissions,
        };
        assert!(ctx.has_permission(&PermissionTag::new("erp:read")));
        assert!(!ctx.has_permission(&PermissionTag::new("finance:read")));
    }
}
