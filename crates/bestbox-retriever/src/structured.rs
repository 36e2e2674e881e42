//! Optional structured-query fusion (spec §4.3 step 4).
//!
//! If a query is classifiable as structured — a count or a filter by a
//! known attribute — a deterministic query is produced from a small
//! templated catalog and executed against a [`StructuredSource`], whose
//! rows are merged in alongside the vector hits.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RetrieverResult;

/// A deterministic structured query produced by [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredQuery {
    /// The templated query text (e.g. a `SELECT count(*) ...` string),
    /// recorded verbatim in the audit log for reproducibility.
    pub query_text: String,
    /// The attribute this query filters by, if any (`part`, `material`,
    /// `severity`).
    pub filter_attribute: Option<String>,
}

/// Executes a [`StructuredQuery`] against whatever structured store backs
/// this domain (SurrealDB, a SQL warehouse, ...).
#[async_trait]
pub trait StructuredSource: Send + Sync {
    /// Run `query` and return its rows as JSON objects.
    async fn execute(&self, query: &StructuredQuery) -> RetrieverResult<Vec<Value>>;
}

/// A source with nothing behind it; used when a deployment has no
/// structured catalog wired up. Always returns zero rows rather than an
/// error, matching the "degraded, not failed" posture of this pipeline
/// stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStructuredSource;

#[async_trait]
impl StructuredSource for NullStructuredSource {
    async fn execute(&self, _query: &StructuredQuery) -> RetrieverResult<Vec<Value>> {
        Ok(Vec::new())
    }
}

const COUNT_MARKERS: [&str; 3] = ["how many", "count of", "number of"];
const FILTER_ATTRIBUTES: [&str; 3] = ["part", "material", "severity"];

/// Classify `query` as structured (a count or an attribute filter) and, if
/// so, produce the deterministic query template for it.
///
/// Never fails: a query that doesn't match any known template simply
/// classifies as unstructured (`None`).
#[must_use]
pub fn classify(query: &str, domain: &str) -> Option<StructuredQuery> {
    let lowered = query.to_lowercase();
    let is_count = COUNT_MARKERS.iter().any(|marker| lowered.contains(marker));
    let filter_attribute = FILTER_ATTRIBUTES.iter().find(|attribute| lowered.contains(**attribute)).map(|attribute| (*attribute).to_owned());

    if !is_count && filter_attribute.is_none() {
        return None;
    }

    let query_text = match (&filter_attribute, is_count) {
        (Some(attribute), true) => format!("SELECT {attribute}, count(*) FROM {domain}_defects GROUP BY {attribute}"),
        (Some(attribute), false) => format!("SELECT * FROM {domain}_defects WHERE {attribute} IS NOT NULL"),
        (None, true) => format!("SELECT count(*) FROM {domain}_defects"),
        (None, false) => unreachable!("classify returns None unless at least one branch matched"),
    };

    Some(StructuredQuery { query_text, filter_attribute })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_query_classifies_as_structured() {
        let query = classify("how many defects occurred last month", "mold").unwrap();
        assert!(query.query_text.contains("count(*)"));
    }

    #[test]
    fn attribute_filter_classifies_as_structured() {
        let query = classify("show defects by severity", "mold").unwrap();
        assert_eq!(query.filter_attribute.as_deref(), Some("severity"));
    }

    #[test]
    fn freeform_question_is_unstructured() {
        assert!(classify("why does the part warp near the gate", "mold").is_none());
    }

    #[tokio::test]
    async fn null_source_returns_no_rows() {
        let query = classify("how many defects", "mold").unwrap();
        let rows = NullStructuredSource.execute(&query).await.unwrap();
        assert!(rows.is_empty());
    }
}
