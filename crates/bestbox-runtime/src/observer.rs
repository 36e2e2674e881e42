//! Streaming emission hook (spec §4.6: think/act/observe/answer ordering).
//!
//! The engine calls into a [`TurnObserver`] as soon as each reasoning step
//! is known, rather than buffering a turn's whole trace before returning.
//! `bestbox-server` implements this trait over an SSE sender; tests and
//! offline callers can use [`NullObserver`].

use bestbox_core::model::ReasoningStep;

/// Receives reasoning steps as a turn progresses, in emission order.
pub trait TurnObserver: Send + Sync {
    /// A new step was produced.
    fn on_step(&self, step: &ReasoningStep);
}

/// An observer that discards every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl TurnObserver for NullObserver {
    fn on_step(&self, _step: &ReasoningStep) {}
}
