/// Errors returned by tool parsing and execution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// Tool name is not part of the declared tool set.
    #[error("tool not found: {0}")]
    ToolNotFound(String),
    /// Tool received missing, malformed, or out-of-range arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// Tool execution failed after its arguments were accepted.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl ToolError {
    /// Stable label used in tool-error results sent back to the model.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::ToolNotFound(_) => "tool_not_found",
            ToolError::InvalidArguments(_) => "invalid_arguments",
            ToolError::ExecutionFailed(_) => "execution_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ToolError;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_labels_are_stable() {
        assert_eq!(ToolError::ToolNotFound("x".into()).kind(), "tool_not_found");
        assert_eq!(
            ToolError::InvalidArguments("x".into()).kind(),
            "invalid_arguments"
        );
        assert_eq!(
            ToolError::ExecutionFailed("x".into()).kind(),
            "execution_failed"
        );
    }

    #[test]
    fn display_includes_detail() {
        let err = ToolError::InvalidArguments("duration must be positive".into());
        assert_eq!(
            err.to_string(),
            "invalid arguments: duration must be positive"
        );
    }
}
