//! The [`BackendAdapter`] trait every backend family implements.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AdapterResult;

/// Uniform façade over a heterogeneous backend (spec §4.1): ERP, CRM,
/// IT-ops, or office-automation, modern or legacy, or the offline demo
/// fallback. Every concrete adapter normalizes its responses to the same
/// canonical schema per operation, so the prompts C2 builds don't change
/// when a deployment swaps one backend family for another.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// The domain this adapter instance serves (`erp`, `crm`, `it`, `oa`).
    fn domain(&self) -> &str;

    /// Cheap liveness check; does not guarantee the next `query` succeeds,
    /// but lets the registry fail fast without a network round trip when
    /// the backend is known to be down.
    async fn is_available(&self) -> bool;

    /// Operations this adapter instance is configured to serve (its
    /// deployment allowlist).
    fn declared_operations(&self) -> &[String];

    /// Execute one canonical operation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AdapterError::BackendUnavailable`] if
    /// [`Self::is_available`] is false or the transport call fails,
    /// [`crate::error::AdapterError::OperationUnsupported`] if `operation`
    /// is not in [`Self::declared_operations`], or
    /// [`crate::error::AdapterError::BackendError`] on a remote
    /// application-level error.
    async fn query(&self, operation: &str, params: &Value) -> AdapterResult<Value>;
}
