// Tool execution system
//
// Parses tool directives out of model output and runs them against the
// working directory behind a permission gate.

pub mod error;
pub mod executor;
pub mod ignore;
pub mod implementations;
pub mod parser;
pub mod paths;
pub mod patterns;
pub mod permissions;
pub mod prompt;
pub mod registry;
pub mod types;

pub use error::ToolError;
pub use executor::ToolExecutor;
pub use ignore::IgnoreRuleset;
pub use parser::ToolCallParser;
pub use patterns::WildcardPattern;
pub use permissions::{
    PermissionDecision, PermissionGate, PermissionRequest, Prompter, RememberScope,
    SessionPermissions,
};
pub use prompt::ToolPromptFormatter;
pub use registry::{CapabilityEntry, RiskLevel, ToolKind, ToolRegistry};
pub use types::{Arguments, ToolCall, ToolContext, ToolOutput};
