// Capability registry
//
// The fixed set of tools the model may call. Each entry binds a wire name to
// a handler kind, its permission requirement and the docs used to build the
// system prompt. The registry is immutable once built.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::error::ToolError;
use super::implementations;
use super::types::{Arguments, ToolContext, ToolOutput};

/// Handler kinds, dispatched in one place by [`ToolKind::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ReadFile,
    EditFile,
    WriteFile,
    ListDirectory,
    Grep,
    Glob,
    ShellExecute,
    GitOperation,
}

/// Risk annotation shown when asking the user for permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    ReadOnly,
    FileCreation,
    FileModification,
    ShellExecution,
    GitMutation,
}

impl RiskLevel {
    pub fn notice(&self) -> &'static str {
        match self {
            RiskLevel::ReadOnly => "This tool only reads from the working directory.",
            RiskLevel::FileCreation => "This will create or overwrite files on disk.",
            RiskLevel::FileModification => "This will modify an existing file in place.",
            RiskLevel::ShellExecution => {
                "This will run a shell command with your user's privileges."
            }
            RiskLevel::GitMutation => "This may change repository state or contact a remote.",
        }
    }
}

impl ToolKind {
    pub fn risk(&self) -> RiskLevel {
        match self {
            ToolKind::ReadFile | ToolKind::ListDirectory | ToolKind::Grep | ToolKind::Glob => {
                RiskLevel::ReadOnly
            }
            ToolKind::WriteFile => RiskLevel::FileCreation,
            ToolKind::EditFile => RiskLevel::FileModification,
            ToolKind::ShellExecute => RiskLevel::ShellExecution,
            ToolKind::GitOperation => RiskLevel::GitMutation,
        }
    }

    /// Run the handler for this kind
    pub async fn run(&self, args: &Arguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        match self {
            ToolKind::ReadFile => implementations::read::execute(args, ctx),
            ToolKind::EditFile => implementations::edit::execute(args, ctx),
            ToolKind::WriteFile => implementations::write::execute(args, ctx),
            ToolKind::ListDirectory => implementations::ls::execute(args, ctx),
            ToolKind::Grep => implementations::grep::execute(args, ctx),
            ToolKind::Glob => implementations::glob::execute(args, ctx),
            ToolKind::ShellExecute => implementations::bash::execute(args, ctx).await,
            ToolKind::GitOperation => implementations::git::execute(args, ctx).await,
        }
    }
}

/// Documentation for a single tool parameter
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: &'static str,
    pub required: bool,
    pub description: &'static str,
}

const fn param(
    name: &'static str,
    kind: &'static str,
    required: bool,
    description: &'static str,
) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required,
        description,
    }
}

#[derive(Debug, Clone)]
pub struct CapabilityEntry {
    pub name: &'static str,
    pub kind: ToolKind,
    pub requires_permission: bool,
    pub description: &'static str,
    pub parameters: &'static [ParamSpec],
    pub example: &'static str,
}

const ENTRIES: &[CapabilityEntry] = &[
    CapabilityEntry {
        name: "FileReadTool",
        kind: ToolKind::ReadFile,
        requires_permission: false,
        description: "Reads the contents of files",
        parameters: &[param("path", "string", true, "File path relative to the working directory")],
        example: r#"{"path": "src/main.rs"}"#,
    },
    CapabilityEntry {
        name: "FileEditTool",
        kind: ToolKind::EditFile,
        requires_permission: true,
        description: "Edits existing files",
        parameters: &[
            param("path", "string", true, "File to edit"),
            param("oldContent", "string", false, "Exact text to replace (content mode)"),
            param("newContent", "string", false, "Replacement text"),
            param("startLine", "integer", false, "First line to replace, 0-based (line mode)"),
            param("endLine", "integer", false, "Last line to replace, 0-based inclusive (line mode)"),
        ],
        example: r#"{"path": "src/lib.rs", "oldContent": "foo()", "newContent": "bar()"}"#,
    },
    CapabilityEntry {
        name: "FileWriteTool",
        kind: ToolKind::WriteFile,
        requires_permission: true,
        description: "Creates or overwrites files",
        parameters: &[
            param("path", "string", true, "File to write"),
            param("content", "string", true, "Content to write"),
            param("append", "boolean", false, "Append instead of overwriting"),
        ],
        example: r#"{"path": "notes.md", "content": "hello"}"#,
    },
    CapabilityEntry {
        name: "LSTool",
        kind: ToolKind::ListDirectory,
        requires_permission: false,
        description: "Lists directory contents",
        parameters: &[
            param("path", "string", false, "Directory to list, defaults to ."),
            param("recursive", "boolean", false, "Include subdirectories"),
            param("showHidden", "boolean", false, "Include entries starting with ."),
        ],
        example: r#"{"path": "src", "recursive": false}"#,
    },
    CapabilityEntry {
        name: "GrepTool",
        kind: ToolKind::Grep,
        requires_permission: false,
        description: "Searches file contents for patterns",
        parameters: &[
            param("pattern", "string", true, "Text or regex to search for"),
            param("glob", "string", false, "Files to search"),
            param("caseSensitive", "boolean", false, "Match case, defaults to false"),
            param("regex", "boolean", false, "Treat pattern as a regular expression"),
        ],
        example: r#"{"pattern": "TODO", "glob": "**/*.rs"}"#,
    },
    CapabilityEntry {
        name: "GlobTool",
        kind: ToolKind::Glob,
        requires_permission: false,
        description: "Finds files matching patterns",
        parameters: &[
            param("pattern", "string", true, "Glob pattern, e.g. **/*.rs"),
            param("includeHidden", "boolean", false, "Include hidden files"),
            param("onlyDirectories", "boolean", false, "Match directories instead of files"),
        ],
        example: r#"{"pattern": "src/**/*.rs"}"#,
    },
    CapabilityEntry {
        name: "BashTool",
        kind: ToolKind::ShellExecute,
        requires_permission: true,
        description: "Executes shell commands",
        parameters: &[
            param("command", "string", true, "Command to run (no pipes, redirects or chaining)"),
            param("cwd", "string", false, "Directory to run in, relative to the working directory"),
            param("timeout", "integer", false, "Timeout in milliseconds, defaults to 30000"),
        ],
        example: r#"{"command": "cargo test"}"#,
    },
    CapabilityEntry {
        name: "GitTool",
        kind: ToolKind::GitOperation,
        requires_permission: true,
        description: "Performs Git operations",
        parameters: &[
            param(
                "operation",
                "string",
                true,
                "One of status, log, add, commit, push, pull, branch, diff, blame",
            ),
            param("params", "object", false, "Operation parameters"),
        ],
        example: r#"{"operation": "status", "params": {}}"#,
    },
];

/// Name-keyed registry of the available tools
pub struct ToolRegistry {
    entries: HashMap<&'static str, CapabilityEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let entries = ENTRIES.iter().map(|e| (e.name, e.clone())).collect();
        Self { entries }
    }

    pub fn lookup(&self, name: &str) -> Result<&CapabilityEntry, ToolError> {
        self.entries
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Tool names mapped to their descriptions
    pub fn list(&self) -> BTreeMap<&'static str, &'static str> {
        self.entries
            .values()
            .map(|e| (e.name, e.description))
            .collect()
    }

    /// Entries in declaration order, for prompt building
    pub fn definitions(&self) -> Vec<&CapabilityEntry> {
        ENTRIES
            .iter()
            .filter_map(|e| self.entries.get(e.name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityEntry {
    /// JSON schema-like description of the parameters
    pub fn parameters_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for p in self.parameters {
            properties.insert(
                p.name.to_string(),
                serde_json::json!({ "type": p.kind, "description": p.description }),
            );
            if p.required {
                required.push(Value::String(p.name.to_string()));
            }
        }
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}
