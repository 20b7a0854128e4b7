//! Scheduling, date and memory tools exposed to the Agenda model.

pub mod builtins;
pub mod context;
pub mod date;
pub mod dispatch;
pub mod tool;

/// Built-in tool specs.
pub use builtins::builtin_tool_specs;
/// Tool execution context.
pub use context::ToolContext;
/// Date utility and clock abstraction.
pub use date::{Clock, DateError, FixedClock, SystemClock};
/// Tool execution entry points.
pub use dispatch::{ToolOutcome, execute, run_tool_call};
/// Tool invocation union and spec type.
pub use tool::{ToolInvocation, ToolSpec};
