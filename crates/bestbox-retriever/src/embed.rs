//! [`EmbeddingClient`]: thin HTTP client over the deployment's embeddings
//! endpoint, grounded on `bestbox-llm`'s OpenAI-compatible HTTP conventions.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{RetrieverError, RetrieverResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Produces normalized dense embedding vectors for text.
pub struct EmbeddingClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl EmbeddingClient {
    /// Build a client against `endpoint`, requesting embeddings from `model`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self { client: Client::builder().timeout(REQUEST_TIMEOUT).build().unwrap_or_default(), endpoint: endpoint.into(), model: model.into(), api_key }
    }

    /// Embed a single piece of text into a 1024-d normalized vector.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::EmbeddingUnavailable`] on any transport,
    /// HTTP, or decode failure.
    pub async fn embed(&self, text: &str) -> RetrieverResult<Vec<f32>> {
        let request = EmbedRequest { model: &self.model, input: text };
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|error| RetrieverError::EmbeddingUnavailable(error.to_string()))?;
        if !response.status().is_success() {
            return Err(RetrieverError::EmbeddingUnavailable(format!("HTTP {}", response.status())));
        }

        let body: EmbedResponse = response.json().await.map_err(|error| RetrieverError::EmbeddingUnavailable(format!("invalid response body: {error}")))?;
        let vector = body.data.into_iter().next().map(|d| d.embedding).ok_or_else(|| RetrieverError::EmbeddingUnavailable("empty embeddings response".to_owned()))?;
        Ok(normalize(vector))
    }
}

fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_produces_unit_vector() {
        let normalized = normalize(vec![3.0, 4.0]);
        let norm: f32 = normalized.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn normalize_leaves_zero_vector_untouched() {
        assert_eq!(normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }
}
