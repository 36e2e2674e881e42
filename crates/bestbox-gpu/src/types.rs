//! GPU resource classification (spec §4.8).

use serde::{Deserialize, Serialize};

/// The two resource classes that contend for a GPU's exclusive lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpuClass {
    /// The primary LLM inference job on this GPU.
    LlmPrimary,
    /// A vision-language OCR escalation job (spec §4.8 escalation flow).
    OcrVl,
}

impl GpuClass {
    /// Wire-format name, matching `gpu.devices[].classes` config entries.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LlmPrimary => "llm-primary",
            Self::OcrVl => "ocr-vl",
        }
    }
}

impl std::fmt::Display for GpuClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of one GPU's current arbitration state (spec §4.8 `status()`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuStatus {
    /// The GPU this status describes.
    pub gpu_id: String,
    /// Class currently holding the exclusive lock, if any.
    pub holder: Option<GpuClass>,
    /// Number of jobs waiting for this GPU.
    pub queue_depth: usize,
}
