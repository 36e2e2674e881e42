//! Small stateless helpers shared across crates.

/// Truncate a string to at most `max_bytes`, ensuring the cut falls on a
/// UTF-8 character boundary. Returns the original string if already short
/// enough.
#[must_use]
pub fn truncate_to_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        #[allow(clippy::arithmetic_side_effects)]
        {
            end -= 1;
        }
    }
    &s[..end]
}

/// Byte-pair-compatible token count heuristic (spec §4.5): roughly 4 bytes
/// per token for non-CJK text, 1.5 characters per token for CJK text. Mixed
/// strings are estimated by splitting into CJK and non-CJK runs.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn estimate_tokens(text: &str) -> usize {
    let mut cjk_chars = 0usize;
    let mut non_cjk_bytes = 0usize;
    for ch in text.chars() {
        if is_cjk(ch) {
            cjk_chars += 1;
        } else {
            non_cjk_bytes += ch.len_utf8();
        }
    }
    let cjk_tokens = (cjk_chars as f64 / 1.5).ceil();
    let non_cjk_tokens = (non_cjk_bytes as f64 / 4.0).ceil();
    (cjk_tokens + non_cjk_tokens) as usize
}

fn is_cjk(ch: char) -> bool {
    matches!(
        ch as u32,
        0x4E00..=0x9FFF   // CJK Unified Ideographs
        | 0x3400..=0x4DBF // CJK Extension A
        | 0x3040..=0x309F // Hiragana
        | 0x30A0..=0x30FF // Katakana
        | 0xAC00..=0xD7AF // Hangul Syllables
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_truncation() {
        assert_eq!(truncate_to_boundary("hello world", 5), "hello");
    }

    #[test]
    fn multibyte_boundary() {
        let s = "café";
        assert_eq!(truncate_to_boundary(s, 4), "caf");
        assert_eq!(truncate_to_boundary(s, 5), "café");
    }

    #[test]
    fn estimate_tokens_ascii() {
        // 16 bytes / 4 = 4 tokens
        assert_eq!(estimate_tokens("0123456789012345"), 4);
    }

    #[test]
    fn estimate_tokens_cjk_heavier_per_char() {
        let cjk = estimate_tokens("披锋怎么解决");
        let ascii_same_char_count = estimate_tokens("aaaaaa");
        assert!(cjk > ascii_same_char_count);
    }
}
