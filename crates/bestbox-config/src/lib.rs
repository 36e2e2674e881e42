#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Unified configuration for the `BestBox` agent orchestration runtime.
//!
//! A single [`Config`] type consolidates the recognized keys from spec §6:
//! LLM endpoint selection, per-turn limits, retriever tuning, integration
//! adapters, GPU device declarations, checkpoint GC, and logging.
//!
//! # Precedence
//!
//! `BestBox` is a single on-premise deployment rather than a per-user dev
//! tool, so layering is a simple chain rather than a multi-tier merge:
//!
//! 1. Embedded defaults (`Config::default()`)
//! 2. A single TOML config file (optional)
//! 3. Environment variable overrides (secrets and endpoint overrides only)
//!
//! Secrets are never read directly from the config file — only the *name* of
//! an environment variable is stored (`auth_env`), matching spec §6's
//! "secrets referenced by environment variable name only; never inline."

/// Configuration error types.
pub mod error;
/// File/env loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Post-load validation.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl Config {
    /// Load configuration: defaults, then an optional TOML file, then
    /// environment variable overrides, then validation.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is malformed or the merged
    /// configuration fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(path)
    }
}
