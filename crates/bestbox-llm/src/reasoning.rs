//! Reasoning-preamble stripping (spec §4.4 point 1).
//!
//! Some quantized/local models prefix their answer with free-form chain-of-
//! thought wrapped in a canonical separator (`<think>...</think>` or
//! `<reasoning>...</reasoning>`) before the user-visible answer. This module
//! classifies streamed text deltas as either `reasoning` (surfaced as a
//! `think` [`crate::types::StreamEvent::ReasoningDelta`], never shown to the
//! end user) or ordinary visible text, without needing the whole message
//! buffered up front.

const OPEN_TAGS: &[&str] = &["<think>", "<reasoning>"];
const CLOSE_TAGS: &[&str] = &["</think>", "</reasoning>"];

/// Longest tag byte length, used to size the lookback buffer kept around a
/// potential split point so a tag straddling two deltas is still detected.
fn max_tag_len() -> usize {
    OPEN_TAGS.iter().chain(CLOSE_TAGS).map(|t| t.len()).max().unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Haven't yet decided whether the message opens with a preamble.
    Sniffing,
    /// Inside a `<think>`/`<reasoning>` block.
    InPreamble,
    /// Past any preamble (or none was present); everything is visible text.
    Visible,
}

/// Text classified by [`ReasoningFilter::push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// User-visible answer text.
    Text(String),
    /// Internal reasoning, not shown to the user.
    Reasoning(String),
}

/// Streaming classifier. Feed it text deltas in order via [`Self::push`];
/// call [`Self::finish`] once the stream ends to flush anything still
/// buffered (e.g. a preamble that was never closed).
#[derive(Debug, Default)]
pub struct ReasoningFilter {
    state: State,
    buffer: String,
}

impl Default for State {
    fn default() -> Self {
        Self::Sniffing
    }
}

impl ReasoningFilter {
    /// Start a fresh filter for a new message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next text delta, returning zero or more classified chunks in
    /// order.
    pub fn push(&mut self, delta: &str) -> Vec<Classified> {
        if delta.is_empty() {
            return Vec::new();
        }
        match self.state {
            State::Visible => vec![Classified::Text(delta.to_owned())],
            State::Sniffing => {
                self.buffer.push_str(delta);
                self.advance_sniffing()
            }
            State::InPreamble => {
                self.buffer.push_str(delta);
                self.advance_preamble()
            }
        }
    }

    /// Flush any buffered content once the stream has ended. A preamble that
    /// was opened but never closed is emitted as reasoning, not silently
    /// dropped — it still gets recorded in the trace, just never surfaces as
    /// an answer.
    pub fn finish(&mut self) -> Vec<Classified> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let remainder = std::mem::take(&mut self.buffer);
        match self.state {
            State::InPreamble => vec![Classified::Reasoning(remainder)],
            _ => vec![Classified::Text(remainder)],
        }
    }

    fn advance_sniffing(&mut self) -> Vec<Classified> {
        let trimmed_start = self.buffer.trim_start();
        for tag in OPEN_TAGS {
            if let Some(rest) = trimmed_start.strip_prefix(tag) {
                let rest = rest.to_owned();
                self.buffer.clear();
                self.state = State::InPreamble;
                self.buffer.push_str(&rest);
                return self.advance_preamble();
            }
        }
        // Still possibly a prefix of a tag (after leading whitespace) — keep
        // buffering rather than guess wrong.
        let could_still_match = OPEN_TAGS.iter().any(|tag| tag.starts_with(trimmed_start) || trimmed_start.starts_with(tag));
        if could_still_match && trimmed_start.len() < max_tag_len() {
            return Vec::new();
        }
        // No preamble: everything buffered so far (and hereafter) is visible.
        self.state = State::Visible;
        let flushed = std::mem::take(&mut self.buffer);
        vec![Classified::Text(flushed)]
    }

    fn advance_preamble(&mut self) -> Vec<Classified> {
        for tag in CLOSE_TAGS {
            if let Some(pos) = self.buffer.find(tag) {
                let mut out = Vec::new();
                let reasoning = self.buffer[..pos].to_owned();
                if !reasoning.is_empty() {
                    out.push(Classified::Reasoning(reasoning));
                }
                let after = self.buffer[pos + tag.len()..].to_owned();
                self.buffer.clear();
                self.state = State::Visible;
                if !after.is_empty() {
                    out.push(Classified::Text(after));
                }
                return out;
            }
        }
        // No closing tag yet: emit everything except a lookback tail long
        // enough to still catch a tag split across two deltas.
        let lookback = max_tag_len().saturating_sub(1);
        if self.buffer.len() > lookback {
            let split_at = find_char_boundary_from_end(&self.buffer, lookback);
            let ready = self.buffer[..split_at].to_owned();
            self.buffer = self.buffer[split_at..].to_owned();
            if ready.is_empty() {
                return Vec::new();
            }
            return vec![Classified::Reasoning(ready)];
        }
        Vec::new()
    }
}

/// Find the largest byte index `<= len - keep` that falls on a UTF-8
/// character boundary, so we never split a multi-byte character (CJK
/// reasoning text is common — spec example 2).
fn find_char_boundary_from_end(s: &str, keep: usize) -> usize {
    let target = s.len().saturating_sub(keep);
    let mut idx = target;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(deltas: &[&str]) -> Vec<Classified> {
        let mut filter = ReasoningFilter::new();
        let mut out = Vec::new();
        for d in deltas {
            out.extend(filter.push(d));
        }
        out.extend(filter.finish());
        out
    }

    #[test]
    fn no_preamble_is_all_visible() {
        let out = run(&["Hello, ", "world!"]);
        assert_eq!(out, vec![Classified::Text("Hello, ".to_owned()), Classified::Text("world!".to_owned())]);
    }

    #[test]
    fn single_chunk_preamble_splits_cleanly() {
        let out = run(&["<think>let me consider</think>The answer is 3."]);
        assert_eq!(
            out,
            vec![
                Classified::Reasoning("let me consider".to_owned()),
                Classified::Text("The answer is 3.".to_owned()),
            ]
        );
    }

    #[test]
    fn preamble_split_across_deltas() {
        let out = run(&["<thi", "nk>thinking", " more</thi", "nk>answer"]);
        let joined_reasoning: String = out
            .iter()
            .filter_map(|c| match c {
                Classified::Reasoning(s) => Some(s.as_str()),
                Classified::Text(_) => None,
            })
            .collect();
        let joined_text: String = out
            .iter()
            .filter_map(|c| match c {
                Classified::Text(s) => Some(s.as_str()),
                Classified::Reasoning(_) => None,
            })
            .collect();
        assert_eq!(joined_reasoning, "thinking more");
        assert_eq!(joined_text, "answer");
    }

    #[test]
    fn unclosed_preamble_is_flushed_as_reasoning_on_finish() {
        let mut filter = ReasoningFilter::new();
        let mut out = filter.push("<think>never closes");
        out.extend(filter.finish());
        assert_eq!(out, vec![Classified::Reasoning("never closes".to_owned())]);
    }
}
