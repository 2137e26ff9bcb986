// Tool error taxonomy
//
// Every failure a tool invocation can produce. These are folded back into the
// conversation as user messages and are never fatal to the session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Permission denied for {0}")]
    PermissionDenied(String),

    #[error("Path {0} resolves outside the working directory")]
    PathEscape(String),

    #[error("Path {path} matches ignore pattern {pattern}")]
    Ignored { path: String, pattern: String },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Old content not found in file {0}")]
    ContentNotFound(String),

    #[error("Invalid line range {start}..={end} for file with {line_count} lines")]
    InvalidRange {
        start: i64,
        end: i64,
        line_count: usize,
    },

    #[error("Missing arguments: {0}")]
    MissingArguments(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Command contains potentially dangerous operations and is blocked: {0}")]
    BlockedCommand(String),

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("Unsupported git operation: {0}")]
    UnsupportedOperation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ToolError {
    pub fn missing(what: impl Into<String>) -> Self {
        ToolError::MissingArguments(what.into())
    }

    /// True for failures caused by the gate rather than by the handler
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, ToolError::PermissionDenied(_))
    }
}
