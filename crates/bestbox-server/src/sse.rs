//! [`SseObserver`]: bridges [`TurnObserver`]'s synchronous callback into the
//! server-sent-event stream spec §6 describes (`{text?, reasoning_step?,
//! done?}` deltas).

use bestbox_core::model::ReasoningStep;
use bestbox_runtime::TurnObserver;
use serde::Serialize;
use tokio::sync::mpsc;

/// One SSE delta, matching spec §6's streaming shape.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatDelta {
    /// Final-answer synthesis tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// A think/act/observe step, rendered as a short human-readable label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_step: Option<String>,
    /// Set on the terminal event only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

/// Forwards each [`ReasoningStep`] the engine produces to an unbounded
/// channel as soon as it's known, rather than buffering the whole turn.
/// Bridges a sync callback ([`TurnObserver::on_step`]) into an async
/// stream the axum handler can drain concurrently with `run_turn`.
pub struct SseObserver {
    sender: mpsc::UnboundedSender<ChatDelta>,
}

impl SseObserver {
    /// Pair a fresh observer with the receiver its deltas are sent to.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ChatDelta>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl TurnObserver for SseObserver {
    fn on_step(&self, step: &ReasoningStep) {
        let delta = match step {
            ReasoningStep::Think { text } => ChatDelta { reasoning_step: Some(format!("thinking: {text}")), ..ChatDelta::default() },
            ReasoningStep::Act { tool_name, .. } => ChatDelta { reasoning_step: Some(format!("calling {tool_name}")), ..ChatDelta::default() },
            ReasoningStep::Observe { summary, .. } => ChatDelta { reasoning_step: Some(format!("observed: {summary}")), ..ChatDelta::default() },
            ReasoningStep::Answer { text } => ChatDelta { text: Some(text.clone()), ..ChatDelta::default() },
        };
        // The receiver may already be gone if the client disconnected
        // mid-turn; the turn itself still runs to completion and
        // checkpoints, it just has nobody left to stream to.
        let _ = self.sender.send(delta);
    }
}
