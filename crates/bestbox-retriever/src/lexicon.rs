//! Query preprocessing: domain synonym expansion (spec §4.3 step 1).

use std::collections::HashMap;

/// A small per-domain synonym table (e.g. defect-term aliases for `mold`).
///
/// Built once at startup from config or a static table; expansion is a pure
/// lookup, never a network call, so preprocessing never fails.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    synonyms: HashMap<String, Vec<String>>,
}

impl Lexicon {
    /// Build a lexicon from an explicit term → synonyms map.
    #[must_use]
    pub fn new(synonyms: HashMap<String, Vec<String>>) -> Self {
        Self { synonyms }
    }

    /// The built-in defect-term lexicon for the `mold` domain (spec §1
    /// scenario 2: "flow marks" ~ "流痕").
    #[must_use]
    pub fn mold_defaults() -> Self {
        let mut synonyms = HashMap::new();
        synonyms.insert("flow mark".to_owned(), vec!["流痕".to_owned(), "flow line".to_owned()]);
        synonyms.insert("流痕".to_owned(), vec!["flow mark".to_owned(), "flow line".to_owned()]);
        synonyms.insert("short shot".to_owned(), vec!["incomplete fill".to_owned(), "充填不足".to_owned()]);
        synonyms.insert("sink mark".to_owned(), vec!["缩痕".to_owned()]);
        synonyms.insert("warpage".to_owned(), vec!["翘曲".to_owned(), "warping".to_owned()]);
        Self::new(synonyms)
    }

    /// True if `query` contains any term (or any of its aliases) known to
    /// this lexicon. Used by the router's deterministic fallback (spec
    /// §4.6: a second parse failure defaults to `mold` when the query
    /// matched a domain-lexicon term).
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let lowered = query.to_lowercase();
        self.synonyms.iter().any(|(term, aliases)| lowered.contains(&term.to_lowercase()) || aliases.iter().any(|alias| lowered.contains(&alias.to_lowercase())))
    }

    /// Expand `query` with any known synonyms, appended space-separated so
    /// the original terms still dominate sparse scoring.
    #[must_use]
    pub fn expand(&self, query: &str) -> String {
        let mut expanded = query.to_owned();
        for (term, aliases) in &self.synonyms {
            if query.to_lowercase().contains(&term.to_lowercase()) {
                for alias in aliases {
                    expanded.push(' ');
                    expanded.push_str(alias);
                }
            }
        }
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_term_with_cjk_alias() {
        let lexicon = Lexicon::mold_defaults();
        let expanded = lexicon.expand("why do we see flow mark defects");
        assert!(expanded.contains("流痕"));
    }

    #[test]
    fn leaves_unknown_query_untouched_except_identity() {
        let lexicon = Lexicon::mold_defaults();
        let expanded = lexicon.expand("totally unrelated query");
        assert_eq!(expanded, "totally unrelated query");
    }

    #[test]
    fn matches_known_term_and_its_alias() {
        let lexicon = Lexicon::mold_defaults();
        assert!(lexicon.matches("we keep seeing flow mark defects"));
        assert!(lexicon.matches("客户反馈有翘曲问题"));
        assert!(!lexicon.matches("what is our vendor payment terms"));
    }
}
