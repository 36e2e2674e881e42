//! Router decision parsing and the deterministic lexicon fallback (spec
//! §4.6).
//!
//! The router issues a single low-temperature, tool-free completion
//! constrained (by prompt, not by schema — quantized local models don't
//! reliably honor `response_format`) to `{"next": "<agent>"}`. Two
//! consecutive parse failures fall back to a lexicon heuristic rather than
//! retrying indefinitely, since a model that can't produce valid JSON twice
//! in a row isn't going to on a third try either.

use std::sync::Arc;

use bestbox_core::model::AgentName;
use bestbox_llm::{LlmProvider, Message};
use bestbox_retriever::Lexicon;
use serde::Deserialize;

use crate::persona;

/// Router decisions are attempted this many times before falling back.
const MAX_PARSE_ATTEMPTS: u32 = 2;

#[derive(Deserialize)]
struct RouterDecision {
    next: String,
}

/// Decide which specialist should own a turn's opening message.
///
/// Tries [`MAX_PARSE_ATTEMPTS`] router completions; the first one that
/// parses to a known specialist wins. If every attempt either fails
/// outright or names something other than an enumerated specialist, falls
/// back to `mold` when `user_text` matched a domain-lexicon term (spec's
/// Open Question 2 resolution, see `DESIGN.md`), otherwise to `erp` as the
/// deployment's highest-traffic domain.
pub async fn decide(router_llm: &Arc<dyn LlmProvider>, lexicon: &Lexicon, user_text: &str) -> AgentName {
    let system = persona::router_prompt();
    let messages = [Message::user(user_text)];

    for _attempt in 0..MAX_PARSE_ATTEMPTS {
        let response = match router_llm.complete(&messages, &[], &system).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%error, "router completion failed");
                continue;
            }
        };
        let Some(text) = response.message.text() else { continue };
        if let Some(agent) = parse_decision(text) {
            return agent;
        }
        tracing::warn!(raw = %text, "router response did not parse to a known specialist");
    }

    fallback(lexicon, user_text)
}

fn parse_decision(text: &str) -> Option<AgentName> {
    let trimmed = text.trim();
    let decision: RouterDecision = serde_json::from_str(trimmed).ok()?;
    AgentName::parse_specialist(decision.next.trim())
}

fn fallback(lexicon: &Lexicon, user_text: &str) -> AgentName {
    if lexicon.matches(user_text) {
        AgentName::Mold
    } else {
        AgentName::Erp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_decision() {
        assert_eq!(parse_decision(r#"{"next": "crm"}"#), Some(AgentName::Crm));
    }

    #[test]
    fn rejects_router_and_finish_as_targets() {
        assert_eq!(parse_decision(r#"{"next": "router"}"#), None);
        assert_eq!(parse_decision(r#"{"next": "finish"}"#), None);
    }

    #[test]
    fn fallback_prefers_mold_on_lexicon_match() {
        let lexicon = Lexicon::mold_defaults();
        assert_eq!(fallback(&lexicon, "we keep seeing flow mark defects"), AgentName::Mold);
        assert_eq!(fallback(&lexicon, "what's our open PO count"), AgentName::Erp);
    }
}
