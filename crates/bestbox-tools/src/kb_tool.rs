//! [`KbSearchTool`]: a tool backed by the C3 hybrid retriever.

use std::sync::Arc;

use async_trait::async_trait;
use bestbox_core::model::{ToolSpec, UserContext};
use bestbox_retriever::{HybridRetriever, RetrievalQuery};
use serde_json::Value;

use crate::outcome::{ErrorKind, ToolOutcome};
use crate::tool::Tool;

/// Knowledge-base search tool for one domain, backed by
/// [`HybridRetriever::retrieve`].
pub struct KbSearchTool {
    spec: ToolSpec,
    domain: String,
    retriever: Arc<HybridRetriever>,
}

impl KbSearchTool {
    /// Build a KB search tool for `domain`.
    #[must_use]
    pub fn new(spec: ToolSpec, domain: impl Into<String>, retriever: Arc<HybridRetriever>) -> Self {
        Self { spec, domain: domain.into(), retriever }
    }
}

#[async_trait]
impl Tool for KbSearchTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, args: Value, user_context: &UserContext) -> ToolOutcome {
        let Some(query_text) = args.get("query").and_then(Value::as_str) else {
            return ToolOutcome::err(ErrorKind::InvalidArguments, "missing required string argument 'query'");
        };

        let query = RetrievalQuery { text: query_text.to_owned(), domain: self.domain.clone(), org_id: user_context.org_id.clone() };
        let outcome = self.retriever.retrieve(&query).await;

        let data = serde_json::json!({
            "passages": outcome.passages,
            "degraded": outcome.degraded,
        });
        ToolOutcome::ok(data)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bestbox_core::model::SideEffectClass;
    use bestbox_retriever::{HybridRetriever, InMemoryVectorStore, Lexicon, VectorStore};

    use super::*;

    #[tokio::test]
    async fn missing_query_argument_is_invalid() {
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
        let retriever = Arc::new(HybridRetriever::new(store, None, None, Lexicon::mold_defaults()));
        let spec = ToolSpec { name: "mold_search_kb".to_owned(), description: "Search the mold defect KB".to_owned(), arg_schema: serde_json::json!({"type": "object"}), permission_tag: None, side_effect_class: SideEffectClass::Read };
        let tool = KbSearchTool::new(spec, "mold", retriever);
        let ctx = UserContext { user_id: "u1".to_owned(), org_id: None, roles: Vec::new(), permissions: std::collections::HashSet::new() };

        let outcome = tool.invoke(serde_json::json!({}), &ctx).await;
        assert!(matches!(outcome, ToolOutcome::Err { error_kind: ErrorKind::InvalidArguments, .. }));
    }

    #[tokio::test]
    async fn empty_corpus_search_succeeds_with_empty_passages() {
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
        let retriever = Arc::new(HybridRetriever::new(store, None, None, Lexicon::mold_defaults()));
        let spec = ToolSpec { name: "mold_search_kb".to_owned(), description: "Search the mold defect KB".to_owned(), arg_schema: serde_json::json!({"type": "object"}), permission_tag: None, side_effect_class: SideEffectClass::Read };
        let tool = KbSearchTool::new(spec, "mold", retriever);
        let ctx = UserContext { user_id: "u1".to_owned(), org_id: None, roles: Vec::new(), permissions: std::collections::HashSet::new() };

        let outcome = tool.invoke(serde_json::json!({"query": "flow mark"}), &ctx).await;
        match outcome {
            ToolOutcome::Ok { data } => assert!(data["passages"].as_array().unwrap().is_empty()),
            other => panic!("expected Ok, got {other:?}"),
        }
    }
}
