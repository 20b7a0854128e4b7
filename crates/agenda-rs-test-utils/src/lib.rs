//! Test helpers shared across Agenda crates.

pub mod clock;
pub mod llm;
pub mod memory;

pub use clock::{date, fixed_clock};
pub use llm::{FailingLLM, FixedChatResponse, ScriptedLLM, ScriptedRequest, tool_call};
pub use memory::{FailingMemory, RecordingMemory};
