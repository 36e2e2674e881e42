//! [`RerankClient`]: thin HTTP client over the deployment's reranker endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{RetrieverError, RetrieverResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Re-scores a set of candidate passages against a query.
pub struct RerankClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl RerankClient {
    /// Build a client against `endpoint`, requesting scores from `model`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self { client: Client::builder().timeout(REQUEST_TIMEOUT).build().unwrap_or_default(), endpoint: endpoint.into(), model: model.into(), api_key }
    }

    /// Score `documents` against `query`; returns one score per input
    /// document, in the same order.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::RerankUnavailable`] on any transport,
    /// HTTP, or decode failure, or if the response has the wrong length.
    pub async fn rerank(&self, query: &str, documents: &[&str]) -> RetrieverResult<Vec<f32>> {
        let request = RerankRequest { model: &self.model, query, documents };
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|error| RetrieverError::RerankUnavailable(error.to_string()))?;
        if !response.status().is_success() {
            return Err(RetrieverError::RerankUnavailable(format!("HTTP {}", response.status())));
        }

        let body: RerankResponse = response.json().await.map_err(|error| RetrieverError::RerankUnavailable(format!("invalid response body: {error}")))?;
        if body.results.len() != documents.len() {
            return Err(RetrieverError::RerankUnavailable("result count mismatch".to_owned()));
        }

        let mut scores = vec![0.0; documents.len()];
        for result in body.results {
            if let Some(slot) = scores.get_mut(result.index) {
                *slot = result.relevance_score;
            }
        }
        Ok(scores)
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [&'a str],
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[derive(Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}
