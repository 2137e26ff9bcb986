// Tool execution engine
//
// Looks a directive up in the registry, passes it through the permission
// gate and dispatches it to its handler.

use tracing::{debug, error, info, instrument};

use super::error::ToolError;
use super::permissions::PermissionGate;
use super::registry::ToolRegistry;
use super::types::{ToolCall, ToolContext, ToolOutput};

pub struct ToolExecutor {
    registry: ToolRegistry,
    context: ToolContext,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, context: ToolContext) -> Self {
        Self { registry, context }
    }

    /// Execute a single directive
    #[instrument(skip(self, call, gate), fields(tool = %call.name))]
    pub async fn execute(
        &self,
        call: &ToolCall,
        gate: &mut PermissionGate,
    ) -> Result<ToolOutput, ToolError> {
        let entry = self.registry.lookup(&call.name)?;

        if !gate.authorize(entry, &call.arguments) {
            return Err(ToolError::PermissionDenied(call.name.clone()));
        }
        debug!("Tool execution allowed");

        match entry.kind.run(&call.arguments, &self.context).await {
            Ok(output) => {
                info!("Tool executed successfully");
                Ok(output)
            }
            Err(e) => {
                error!("Tool execution failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn context(&self) -> &ToolContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::tools::ignore::IgnoreRuleset;
    use crate::tools::permissions::{PermissionDecision, PermissionRequest, Prompter};
    use serde_json::json;
    use tempfile::TempDir;

    struct AlwaysDeny;

    impl Prompter for AlwaysDeny {
        fn confirm(&mut self, _request: &PermissionRequest) -> anyhow::Result<PermissionDecision> {
            Ok(PermissionDecision::Deny)
        }
    }

    fn setup() -> (TempDir, ToolExecutor, PermissionGate) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "contents").unwrap();
        let executor = ToolExecutor::new(
            ToolRegistry::new(),
            ToolContext::new(dir.path(), IgnoreRuleset::default()),
        );
        let gate = PermissionGate::new(
            ConfigStore::with_paths(dir.path().join("g.json"), dir.path().join("p.json")),
            Box::new(AlwaysDeny),
        );
        (dir, executor, gate)
    }

    fn call(name: &str, value: serde_json::Value) -> ToolCall {
        ToolCall::new(name, value.as_object().cloned().unwrap())
    }

    #[tokio::test]
    async fn test_execute_tool_success() {
        let (_dir, executor, mut gate) = setup();
        let output = executor
            .execute(&call("FileReadTool", json!({"path": "a.txt"})), &mut gate)
            .await
            .unwrap();
        assert_eq!(output.as_text(), Some("contents"));
    }

    #[tokio::test]
    async fn test_execute_tool_not_found() {
        let (_dir, executor, mut gate) = setup();
        let result = executor
            .execute(&call("nonexistent", json!({})), &mut gate)
            .await;
        assert!(matches!(result, Err(ToolError::UnknownTool(_))));
    }

    #[tokio::test]
    async fn test_execute_tool_permission_denied() {
        let (dir, executor, mut gate) = setup();
        let result = executor
            .execute(
                &call("FileWriteTool", json!({"path": "b.txt", "content": "x"})),
                &mut gate,
            )
            .await;
        assert!(matches!(result, Err(ToolError::PermissionDenied(_))));
        assert!(!dir.path().join("b.txt").exists());
    }

    #[tokio::test]
    async fn test_execute_tool_execution_failure() {
        let (_dir, executor, mut gate) = setup();
        let result = executor
            .execute(&call("FileReadTool", json!({"path": "missing.txt"})), &mut gate)
            .await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }
}
