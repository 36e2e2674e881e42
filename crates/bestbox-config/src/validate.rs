//! Configuration validation (spec §0.3, run once after load).

use std::collections::HashSet;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

const KNOWN_ADAPTER_BACKENDS: &[&str] = &[
    "erp-modern",
    "erp-legacy",
    "crm-modern",
    "it-modern",
    "oa-modern",
    "demo-stub",
];

const KNOWN_GPU_CLASSES: &[&str] = &["llm-primary", "ocr-vl"];

/// Validate a fully-merged configuration.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] describing the first violation found:
/// unknown adapter backend, fusion weights that don't sum to ~1.0, or
/// duplicate GPU device IDs.
pub fn validate(config: &Config) -> ConfigResult<()> {
    for (domain, integration) in &config.integrations {
        if !KNOWN_ADAPTER_BACKENDS.contains(&integration.backend.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "integrations.{domain}.backend: unknown adapter backend {:?}",
                integration.backend
            )));
        }
    }

    let w = &config.retriever.weights;
    if (w.dense + w.sparse - 1.0).abs() > 1e-6 {
        return Err(ConfigError::Invalid(format!(
            "retriever.weights.dense + sparse must sum to 1.0, got {} + {} = {}",
            w.dense,
            w.sparse,
            w.dense + w.sparse
        )));
    }
    if !(0.0..=1.0).contains(&w.vector_vs_structured) {
        return Err(ConfigError::Invalid(format!(
            "retriever.weights.vector_vs_structured must be in [0, 1], got {}",
            w.vector_vs_structured
        )));
    }

    let mut seen_ids = HashSet::new();
    for device in &config.gpu.devices {
        if !seen_ids.insert(device.id.clone()) {
            return Err(ConfigError::Invalid(format!(
                "gpu.devices: duplicate device id {:?}",
                device.id
            )));
        }
        for class in &device.classes {
            if !KNOWN_GPU_CLASSES.contains(&class.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "gpu.devices[{:?}]: unknown resource class {:?}",
                    device.id, class
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GpuDeviceSection, IntegrationSection};

    #[test]
    fn default_config_is_valid() {
        validate(&Config::default()).unwrap();
    }

    #[test]
    fn unknown_adapter_backend_rejected() {
        let mut config = Config::default();
        config.integrations.insert(
            "erp".to_owned(),
            IntegrationSection {
                backend: "sap-r2".to_owned(),
                ..Default::default()
            },
        );
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("unknown adapter backend")));
    }

    #[test]
    fn weights_not_summing_to_one_rejected() {
        let mut config = Config::default();
        config.retriever.weights.dense = 0.9;
        config.retriever.weights.sparse = 0.9;
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("sum to 1.0")));
    }

    #[test]
    fn duplicate_gpu_device_ids_rejected() {
        let mut config = Config::default();
        config.gpu.devices = vec![
            GpuDeviceSection {
                id: "gpu0".to_owned(),
                classes: vec!["llm-primary".to_owned()],
            },
            GpuDeviceSection {
                id: "gpu0".to_owned(),
                classes: vec!["ocr-vl".to_owned()],
            },
        ];
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("duplicate device id")));
    }
}
