//! Bounded recovery for malformed tool-call argument JSON (spec §4.4 point 2).
//!
//! Quantized local models occasionally emit tool-call arguments with a
//! trailing comma, an unterminated string, or a truncated array/object when
//! generation is cut off at a token limit. [`repair`] tries a small, fixed
//! sequence of textual fixups — never a full JSON parser rewrite — and
//! re-parses after each one. Three attempts, in increasing aggressiveness;
//! if none produce valid JSON the caller treats the tool call as absent.

use serde_json::Value;

/// Maximum repair attempts before giving up (spec §4.4: "up to 3 attempts").
pub const MAX_ATTEMPTS: u32 = 3;

/// Attempt to parse `raw` as JSON, applying up to [`MAX_ATTEMPTS`] bounded
/// textual repairs if the raw text doesn't parse as-is.
///
/// Returns the parsed value and the number of repair attempts it took (`0`
/// if `raw` parsed without any repair).
#[must_use]
pub fn repair(raw: &str) -> Option<(Value, u32)> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Some((value, 0));
    }

    let mut candidate = raw.trim().to_owned();
    for attempt in 1..=MAX_ATTEMPTS {
        candidate = apply_fixup(&candidate, attempt);
        if let Ok(value) = serde_json::from_str(&candidate) {
            return Some((value, attempt));
        }
    }
    None
}

/// Apply one fixup pass, escalating in aggressiveness by attempt number.
fn apply_fixup(text: &str, attempt: u32) -> String {
    let mut s = text.to_owned();
    if attempt >= 1 {
        s = drop_trailing_commas(&s);
    }
    if attempt >= 2 {
        s = close_unterminated_string(&s);
    }
    if attempt >= 3 {
        s = balance_brackets(&s);
    }
    s
}

/// Remove a trailing comma that immediately precedes a closing `}` or `]`.
fn drop_trailing_commas(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                i += 1;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

/// If the text ends mid-string (odd number of unescaped quotes), close it.
fn close_unterminated_string(s: &str) -> String {
    let mut in_string = false;
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ => {}
        }
    }
    if in_string {
        format!("{s}\"")
    } else {
        s.to_owned()
    }
}

/// Drop any trailing garbage after the last structurally-complete position,
/// then balance unmatched `{`/`[` by appending the matching closers.
fn balance_brackets(s: &str) -> String {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut last_good_end = 0usize;

    for (idx, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => stack.push(c),
            '}' if !in_string => {
                if stack.last() == Some(&'{') {
                    stack.pop();
                }
            }
            ']' if !in_string => {
                if stack.last() == Some(&'[') {
                    stack.pop();
                }
            }
            _ => {}
        }
        if !in_string {
            last_good_end = idx + c.len_utf8();
        }
    }

    let mut truncated = s[..last_good_end].to_owned();
    if in_string {
        truncated.push('"');
    }
    while let Some(open) = stack.pop() {
        truncated.push(if open == '{' { '}' } else { ']' });
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_json_needs_no_repair() {
        let (value, attempts) = repair(r#"{"vendor":"V-001"}"#).unwrap();
        assert_eq!(attempts, 0);
        assert_eq!(value["vendor"], "V-001");
    }

    #[test]
    fn trailing_comma_is_repaired() {
        let (value, attempts) = repair(r#"{"vendor":"V-001","status":"open",}"#).unwrap();
        assert!(attempts >= 1);
        assert_eq!(value["status"], "open");
    }

    #[test]
    fn truncated_array_is_balanced() {
        let (value, attempts) = repair(r#"{"items":["a","b""#).unwrap();
        assert!(attempts >= 1);
        assert_eq!(value["items"][0], "a");
    }

    #[test]
    fn unterminated_string_is_closed() {
        let (value, _attempts) = repair(r#"{"query":"披锋怎么解决"#).unwrap();
        assert_eq!(value["query"], "披锋怎么解决");
    }

    #[test]
    fn unrecoverable_garbage_gives_up() {
        assert!(repair("not json at all {{{").is_none());
    }
}
