//! Shared value types for Agenda turns, users, and tool failures.

mod tool;
mod turn;

pub use tool::ToolError;
pub use turn::{Turn, TurnRole};

/// Identifier for the user a session and its memories belong to.
pub type UserId = String;
