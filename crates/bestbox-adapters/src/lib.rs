#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! `BestBox` backend adapter registry (C1) — a uniform façade over
//! heterogeneous ERP/CRM/IT-ops/office-automation backends, modern or
//! legacy, plus an offline demo-stub fallback.
//!
//! The rest of the runtime never speaks a backend's native wire protocol
//! directly; it calls [`AdapterRegistry::query`] with a domain and a
//! canonical operation name, and gets back a normalized JSON record or an
//! [`AdapterError`] that C2 folds into the model-visible error envelope.

pub mod adapter;
pub mod demo;
pub mod error;
pub mod http;
pub mod registry;

pub use adapter::BackendAdapter;
pub use demo::DemoStubAdapter;
pub use error::{AdapterError, AdapterResult};
pub use http::{HttpBackendAdapter, WireStyle};
pub use registry::AdapterRegistry;
