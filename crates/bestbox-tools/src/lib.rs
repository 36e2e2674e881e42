#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! `BestBox` tool catalog (C2) — typed, LLM-callable operations wrapping
//! C1 backend adapters and C3 knowledge search, with centralized
//! permission enforcement and the write-class approval interrupt.

pub mod adapter_tool;
pub mod kb_tool;
pub mod outcome;
pub mod registry;
pub mod tool;

pub use adapter_tool::AdapterTool;
pub use kb_tool::KbSearchTool;
pub use outcome::{ApprovalEnvelope, ErrorKind, ToolOutcome};
pub use registry::ToolRegistry;
pub use tool::Tool;
