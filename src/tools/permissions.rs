// Permission gate
//
// Decides whether a tool invocation may proceed. Checks, in order:
// permission requirement, session grants, the persisted allow-list, and
// finally the user through a `Prompter`.

use anyhow::Result;
use serde_json::Value;
use std::collections::HashSet;

use super::patterns::compile_all;
use super::registry::{CapabilityEntry, RiskLevel, ToolKind};
use super::types::{Arguments, ToolCall};
use crate::config::{ConfigStore, Scope};

pub const ALLOWED_TOOLS_KEY: &str = "allowedTools";

/// Signatures granted for the lifetime of this session
#[derive(Debug, Default, Clone)]
pub struct SessionPermissions {
    granted: HashSet<String>,
}

impl SessionPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.granted.contains(signature)
    }

    pub fn grant(&mut self, signature: String) {
        self.granted.insert(signature);
    }

    pub fn clear(&mut self) {
        self.granted.clear();
    }

    pub fn len(&self) -> usize {
        self.granted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

/// How long a grant should be remembered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RememberScope {
    /// Until the process exits
    Session,
    /// Appended to the project allow-list
    Project,
    /// This invocation only
    Once,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Deny,
    Grant(RememberScope),
}

/// What the user is being asked to approve
#[derive(Debug, Clone)]
pub struct PermissionRequest {
    pub tool_name: String,
    pub summary: String,
    pub risk: RiskLevel,
    pub signature: String,
}

impl PermissionRequest {
    pub fn new(entry: &CapabilityEntry, arguments: &Arguments, signature: String) -> Self {
        Self {
            tool_name: entry.name.to_string(),
            summary: describe(entry.kind, arguments),
            risk: entry.kind.risk(),
            signature,
        }
    }
}

/// One-line human rendering of an invocation
fn describe(kind: ToolKind, arguments: &Arguments) -> String {
    let arg = |key: &str| match arguments.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    match kind {
        ToolKind::ShellExecute => format!("Run shell command: {}", arg("command")),
        ToolKind::WriteFile => {
            let verb = match arguments.get("append") {
                Some(Value::Bool(true)) => "Append to",
                _ => "Write",
            };
            format!("{} file: {}", verb, arg("path"))
        }
        ToolKind::EditFile => format!("Edit file: {}", arg("path")),
        ToolKind::GitOperation => {
            let params = arguments.get("params").map(|p| p.to_string()).unwrap_or_default();
            format!("Git {} {}", arg("operation"), params).trim_end().to_string()
        }
        _ => format!("{}", Value::Object(arguments.clone())),
    }
}

/// Source of interactive permission answers
pub trait Prompter: Send {
    fn confirm(&mut self, request: &PermissionRequest) -> Result<PermissionDecision>;
}

pub struct PermissionGate {
    session: SessionPermissions,
    config: ConfigStore,
    prompter: Box<dyn Prompter>,
}

impl PermissionGate {
    pub fn new(config: ConfigStore, prompter: Box<dyn Prompter>) -> Self {
        Self {
            session: SessionPermissions::new(),
            config,
            prompter,
        }
    }

    pub fn session(&self) -> &SessionPermissions {
        &self.session
    }

    pub fn clear_session(&mut self) {
        self.session.clear();
    }

    /// True when the persisted allow-list covers `signature`
    fn allow_listed(&self, signature: &str) -> bool {
        let allowed = match self.config.settings() {
            Ok(settings) => settings.allowed_tools,
            Err(e) => {
                tracing::warn!("Failed to read allow-list: {:#}", e);
                return false;
            }
        };
        compile_all(allowed.iter().map(String::as_str))
            .iter()
            .any(|pattern| pattern.matches(signature))
    }

    /// Decide whether `arguments` may be passed to the tool in `entry`
    pub fn authorize(&mut self, entry: &CapabilityEntry, arguments: &Arguments) -> bool {
        if !entry.requires_permission {
            return true;
        }

        let signature = ToolCall::new(entry.name, arguments.clone()).signature();

        if self.session.contains(&signature) {
            tracing::debug!(%signature, "Approved by session grant");
            return true;
        }
        if self.allow_listed(&signature) {
            tracing::debug!(%signature, "Approved by allow-list");
            return true;
        }

        let request = PermissionRequest::new(entry, arguments, signature.clone());
        let decision = match self.prompter.confirm(&request) {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!("Permission prompt failed, denying: {:#}", e);
                PermissionDecision::Deny
            }
        };

        match decision {
            PermissionDecision::Deny => {
                tracing::info!(%signature, "Permission denied");
                false
            }
            PermissionDecision::Grant(RememberScope::Once) => true,
            PermissionDecision::Grant(RememberScope::Session) => {
                self.session.grant(signature);
                true
            }
            PermissionDecision::Grant(RememberScope::Project) => {
                if let Err(e) = self.config.append_to_list(
                    ALLOWED_TOOLS_KEY,
                    Value::String(signature.clone()),
                    Scope::Project,
                ) {
                    tracing::warn!("Failed to persist permission for {}: {:#}", signature, e);
                }
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::registry::ToolRegistry;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct ScriptedPrompter {
        answers: VecDeque<PermissionDecision>,
        asked: Arc<Mutex<Vec<PermissionRequest>>>,
    }

    impl Prompter for ScriptedPrompter {
        fn confirm(&mut self, request: &PermissionRequest) -> Result<PermissionDecision> {
            self.asked.lock().unwrap().push(request.clone());
            Ok(self.answers.pop_front().unwrap_or(PermissionDecision::Deny))
        }
    }

    fn gate(
        dir: &TempDir,
        answers: Vec<PermissionDecision>,
    ) -> (PermissionGate, ConfigStore, Arc<Mutex<Vec<PermissionRequest>>>) {
        let config = ConfigStore::with_paths(
            dir.path().join("global.json"),
            dir.path().join("project.json"),
        );
        let asked = Arc::new(Mutex::new(Vec::new()));
        let prompter = ScriptedPrompter {
            answers: answers.into(),
            asked: asked.clone(),
        };
        (
            PermissionGate::new(config.clone(), Box::new(prompter)),
            config,
            asked,
        )
    }

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_read_only_tools_skip_prompt() {
        let dir = TempDir::new().unwrap();
        let (mut gate, _config, asked) = gate(&dir, vec![]);
        let registry = ToolRegistry::new();
        assert!(gate.authorize(registry.lookup("FileReadTool").unwrap(), &args(json!({"path": "a"}))));
        assert!(asked.lock().unwrap().is_empty());
    }

    #[test]
    fn test_session_grant_is_remembered() {
        let dir = TempDir::new().unwrap();
        let (mut gate, _config, asked) =
            gate(&dir, vec![PermissionDecision::Grant(RememberScope::Session)]);
        let registry = ToolRegistry::new();
        let bash = registry.lookup("BashTool").unwrap();
        let a = args(json!({"command": "ls"}));

        assert!(gate.authorize(bash, &a));
        assert!(gate.authorize(bash, &a));
        assert_eq!(asked.lock().unwrap().len(), 1);

        // A different command is a different signature
        assert!(!gate.authorize(bash, &args(json!({"command": "pwd"}))));
        assert_eq!(asked.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_once_grant_is_not_remembered() {
        let dir = TempDir::new().unwrap();
        let (mut gate, _config, asked) = gate(
            &dir,
            vec![
                PermissionDecision::Grant(RememberScope::Once),
                PermissionDecision::Deny,
            ],
        );
        let registry = ToolRegistry::new();
        let bash = registry.lookup("BashTool").unwrap();
        let a = args(json!({"command": "ls"}));

        assert!(gate.authorize(bash, &a));
        assert!(!gate.authorize(bash, &a));
        assert_eq!(asked.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_wildcard_allow_list() {
        let dir = TempDir::new().unwrap();
        let (mut gate, config, asked) = gate(&dir, vec![]);
        config
            .append_to_list(ALLOWED_TOOLS_KEY, json!("BashTool(*)"), Scope::Project)
            .unwrap();
        let registry = ToolRegistry::new();
        let bash = registry.lookup("BashTool").unwrap();

        assert!(gate.authorize(bash, &args(json!({"command": "cargo test"}))));
        assert!(gate.authorize(bash, &args(json!({"command": "ls (x) [y]", "cwd": "src"}))));
        assert!(asked.lock().unwrap().is_empty());

        // Other tools still prompt
        assert!(!gate.authorize(registry.lookup("GitTool").unwrap(), &args(json!({"operation": "push"}))));
        assert_eq!(asked.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_project_grant_is_persisted() {
        let dir = TempDir::new().unwrap();
        let (mut gate, config, asked) =
            gate(&dir, vec![PermissionDecision::Grant(RememberScope::Project)]);
        let registry = ToolRegistry::new();
        let write = registry.lookup("FileWriteTool").unwrap();
        let a = args(json!({"path": "a.txt", "content": "x"}));

        assert!(gate.authorize(write, &a));
        assert_eq!(
            config.settings().unwrap().allowed_tools,
            vec![r#"FileWriteTool({"content":"x","path":"a.txt"})"#]
        );

        // A fresh session consults the persisted grant
        gate.clear_session();
        assert!(gate.authorize(write, &a));
        assert_eq!(asked.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_request_rendering() {
        let dir = TempDir::new().unwrap();
        let (mut gate, _config, asked) = gate(&dir, vec![PermissionDecision::Deny]);
        let registry = ToolRegistry::new();
        assert!(!gate.authorize(
            registry.lookup("BashTool").unwrap(),
            &args(json!({"command": "make"}))
        ));

        let asked = asked.lock().unwrap();
        assert_eq!(asked[0].tool_name, "BashTool");
        assert_eq!(asked[0].summary, "Run shell command: make");
        assert_eq!(asked[0].risk, RiskLevel::ShellExecution);
        assert_eq!(asked[0].signature, r#"BashTool({"command":"make"})"#);
    }
}
