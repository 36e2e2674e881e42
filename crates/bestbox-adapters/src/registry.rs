//! [`AdapterRegistry`]: the domain → adapter map built once at startup.

use std::collections::HashMap;
use std::env;

use serde_json::Value;

use bestbox_config::IntegrationSection;

use crate::adapter::BackendAdapter;
use crate::demo::DemoStubAdapter;
use crate::error::{AdapterError, AdapterResult};
use crate::http::{HttpBackendAdapter, WireStyle};

/// Uniform façade the rest of the runtime (C2's tool catalog) calls
/// through, hiding the domain → concrete-adapter lookup.
///
/// Built once at startup from the deployment's `[integrations.<domain>]`
/// config sections (spec §4.1); never mutated afterward.
pub struct AdapterRegistry {
    adapters: HashMap<String, Box<dyn BackendAdapter>>,
}

impl AdapterRegistry {
    /// Construct a registry from the deployment's integration declarations,
    /// instantiating one concrete adapter per domain.
    #[must_use]
    pub fn build(integrations: &HashMap<String, IntegrationSection>) -> Self {
        let adapters = integrations
            .iter()
            .map(|(domain, section)| (domain.clone(), instantiate(domain, section)))
            .collect();
        Self { adapters }
    }

    /// Look up the adapter registered for `domain`.
    #[must_use]
    pub fn get(&self, domain: &str) -> Option<&dyn BackendAdapter> {
        self.adapters.get(domain).map(AsRef::as_ref)
    }

    /// Dispatch `operation` to the adapter registered for `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::BackendUnavailable`] if no adapter is
    /// registered for `domain`, or whatever [`BackendAdapter::query`]
    /// returns otherwise.
    pub async fn query(&self, domain: &str, operation: &str, params: &Value) -> AdapterResult<Value> {
        let adapter = self.get(domain).ok_or_else(|| AdapterError::BackendUnavailable(format!("no adapter configured for domain '{domain}'")))?;
        if !adapter.is_available().await {
            return Err(AdapterError::BackendUnavailable(format!("{domain} backend is currently unreachable")));
        }
        adapter.query(operation, params).await
    }

    /// Every domain this registry has an adapter for.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }
}

fn instantiate(domain: &str, section: &IntegrationSection) -> Box<dyn BackendAdapter> {
    if section.backend == "demo-stub" {
        return Box::new(DemoStubAdapter::new(domain.to_owned(), section.allowlist.clone()));
    }

    let auth_token = section.auth_env.as_deref().and_then(|var| env::var(var).ok());
    let wire = WireStyle::for_backend(&section.backend);
    Box::new(HttpBackendAdapter::new(domain.to_owned(), section.url.clone(), auth_token, section.allowlist.clone(), wire))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_integrations() -> HashMap<String, IntegrationSection> {
        let mut map = HashMap::new();
        map.insert(
            "erp".to_owned(),
            IntegrationSection { backend: "demo-stub".to_owned(), url: String::new(), auth_env: None, allowlist: vec!["count_purchase_orders".to_owned()] },
        );
        map
    }

    #[tokio::test]
    async fn dispatches_to_configured_domain() {
        let registry = AdapterRegistry::build(&demo_integrations());
        let result = registry.query("erp", "count_purchase_orders", &serde_json::json!({})).await.unwrap();
        assert_eq!(result["count"], 3);
    }

    #[tokio::test]
    async fn unknown_domain_is_backend_unavailable() {
        let registry = AdapterRegistry::build(&demo_integrations());
        let err = registry.query("crm", "lookup_account", &serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, AdapterError::BackendUnavailable(_)));
    }

    #[test]
    fn domains_lists_configured_domains() {
        let registry = AdapterRegistry::build(&demo_integrations());
        let domains: Vec<&str> = registry.domains().collect();
        assert_eq!(domains, vec!["erp"]);
    }
}
