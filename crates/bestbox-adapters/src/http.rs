//! HTTP-backed adapters for the "modern" and "legacy" backend families.
//!
//! Both families are driven by the same [`HttpBackendAdapter`]; only the
//! request/response wire shape differs, selected by [`WireStyle`]. A
//! deployment wires this up by setting `integrations.<domain>.backend` to
//! one of `erp-modern`, `erp-legacy`, `crm-modern`, `it-modern`, `oa-modern`
//! in config — see [`WireStyle::for_backend`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::adapter::BackendAdapter;
use crate::error::{AdapterError, AdapterResult};

/// Default per-request timeout for backend calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The two wire conventions observed across deployed backend families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireStyle {
    /// `{"op": ..., "params": ...}` request; bare JSON object response.
    Modern,
    /// `{"operation": ..., "parameters": ...}` request; response wrapped in
    /// `{"result": ...}` on success or `{"error": {"code", "message"}}` on
    /// failure.
    Legacy,
}

impl WireStyle {
    /// Infer the wire convention from a config `backend` string
    /// (`"erp-modern"`, `"crm-legacy"`, ...). Defaults to [`WireStyle::Modern`]
    /// for any family not explicitly suffixed `-legacy`.
    #[must_use]
    pub fn for_backend(backend: &str) -> Self {
        if backend.ends_with("-legacy") {
            WireStyle::Legacy
        } else {
            WireStyle::Modern
        }
    }
}

/// Adapter for a live ERP/CRM/IT/OA backend reached over HTTP.
pub struct HttpBackendAdapter {
    domain: String,
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    allowlist: Vec<String>,
    wire: WireStyle,
}

impl HttpBackendAdapter {
    /// Build an adapter for `domain`, speaking `wire` against `base_url`,
    /// serving only operations in `allowlist`.
    #[must_use]
    pub fn new(domain: impl Into<String>, base_url: impl Into<String>, auth_token: Option<String>, allowlist: Vec<String>, wire: WireStyle) -> Self {
        Self {
            domain: domain.into(),
            client: Client::builder().timeout(REQUEST_TIMEOUT).build().unwrap_or_default(),
            base_url: base_url.into(),
            auth_token,
            allowlist,
            wire,
        }
    }

    fn build_request(&self, operation: &str, params: &Value) -> (String, Value) {
        match self.wire {
            WireStyle::Modern => (self.base_url.clone(), json!({ "op": operation, "params": params })),
            WireStyle::Legacy => (self.base_url.clone(), json!({ "operation": operation, "parameters": params })),
        }
    }

    fn unwrap_response(&self, body: Value) -> AdapterResult<Value> {
        match self.wire {
            WireStyle::Modern => {
                if let Some(error) = body.get("error") {
                    return Err(backend_error(error));
                }
                Ok(body)
            }
            WireStyle::Legacy => {
                if let Some(error) = body.get("error") {
                    return Err(backend_error(error));
                }
                Ok(body.get("result").cloned().unwrap_or(body))
            }
        }
    }
}

fn backend_error(error: &Value) -> AdapterError {
    let code = error.get("code").and_then(Value::as_str).unwrap_or("unknown").to_owned();
    let message = error.get("message").and_then(Value::as_str).unwrap_or("backend returned an error").to_owned();
    AdapterError::BackendError { code, message }
}

#[async_trait]
impl BackendAdapter for HttpBackendAdapter {
    fn domain(&self) -> &str {
        &self.domain
    }

    async fn is_available(&self) -> bool {
        self.client.get(&self.base_url).send().await.is_ok_and(|response| response.status().is_success() || response.status().as_u16() == 404)
    }

    fn declared_operations(&self) -> &[String] {
        &self.allowlist
    }

    async fn query(&self, operation: &str, params: &Value) -> AdapterResult<Value> {
        if !self.allowlist.iter().any(|op| op == operation) {
            return Err(AdapterError::OperationUnsupported(operation.to_owned()));
        }

        let (url, payload) = self.build_request(operation, params);
        let mut request = self.client.post(url).json(&payload);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|error| AdapterError::BackendUnavailable(error.to_string()))?;
        if !response.status().is_success() {
            return Err(AdapterError::BackendUnavailable(format!("HTTP {}", response.status())));
        }

        let body: Value = response.json().await.map_err(|error| AdapterError::BackendUnavailable(format!("invalid response body: {error}")))?;
        self.unwrap_response(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_style_defaults_to_modern() {
        assert_eq!(WireStyle::for_backend("erp-modern"), WireStyle::Modern);
        assert_eq!(WireStyle::for_backend("crm-legacy"), WireStyle::Legacy);
        assert_eq!(WireStyle::for_backend("it-modern"), WireStyle::Modern);
    }

    #[test]
    fn modern_response_passes_through_body() {
        let adapter = HttpBackendAdapter::new("erp", "http://localhost", None, vec![], WireStyle::Modern);
        let result = adapter.unwrap_response(json!({"count": 3})).unwrap();
        assert_eq!(result["count"], 3);
    }

    #[test]
    fn legacy_response_unwraps_result_field() {
        let adapter = HttpBackendAdapter::new("crm", "http://localhost", None, vec![], WireStyle::Legacy);
        let result = adapter.unwrap_response(json!({"result": {"account_id": "A1"}})).unwrap();
        assert_eq!(result["account_id"], "A1");
    }

    #[test]
    fn legacy_error_field_becomes_backend_error() {
        let adapter = HttpBackendAdapter::new("crm", "http://localhost", None, vec![], WireStyle::Legacy);
        let err = adapter.unwrap_response(json!({"error": {"code": "NOT_FOUND", "message": "no such account"}})).unwrap_err();
        assert!(matches!(err, AdapterError::BackendError { code, .. } if code == "NOT_FOUND"));
    }
}
