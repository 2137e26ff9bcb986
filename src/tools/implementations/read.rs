// FileReadTool - reads file contents from the working directory

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::tools::error::ToolError;
use crate::tools::types::{Arguments, ArgumentsExt, ToolContext, ToolOutput};

pub fn execute(args: &Arguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    let requested = args.required_str("path")?;
    let path = ctx.resolve_unignored(requested)?;
    read_file(&path, requested).map(ToolOutput::Text)
}

/// Read an already resolved path, mapping a missing file to `NotFound`
pub(crate) fn read_file(path: &Path, display: &str) -> Result<String, ToolError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ToolError::NotFound(display.to_string())),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ignore::IgnoreRuleset;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ToolContext) {
        let dir = TempDir::new().unwrap();
        let ctx = ToolContext::new(dir.path(), IgnoreRuleset::new(["node_modules", "*.secret"]));
        (dir, ctx)
    }

    fn args(value: serde_json::Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_read_existing_file() {
        let (dir, ctx) = setup();
        fs::write(dir.path().join("hello.txt"), "Hello, World!\n").unwrap();

        let output = execute(&args(json!({"path": "hello.txt"})), &ctx).unwrap();
        assert_eq!(output.as_text(), Some("Hello, World!\n"));
    }

    #[test]
    fn test_read_nonexistent_file() {
        let (_dir, ctx) = setup();
        let result = execute(&args(json!({"path": "missing.txt"})), &ctx);
        assert!(matches!(result, Err(ToolError::NotFound(p)) if p == "missing.txt"));
    }

    #[test]
    fn test_read_outside_working_dir() {
        let (_dir, ctx) = setup();
        let result = execute(&args(json!({"path": "../../etc/passwd"})), &ctx);
        assert!(matches!(result, Err(ToolError::PathEscape(_))));
    }

    #[test]
    fn test_read_ignored_path() {
        let (dir, ctx) = setup();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(dir.path().join("api.secret"), "x").unwrap();

        let result = execute(&args(json!({"path": "node_modules/pkg/index.js"})), &ctx);
        assert!(matches!(result, Err(ToolError::Ignored { .. })));
        let result = execute(&args(json!({"path": "api.secret"})), &ctx);
        assert!(matches!(result, Err(ToolError::Ignored { .. })));
    }

    #[test]
    fn test_read_missing_path_argument() {
        let (_dir, ctx) = setup();
        let result = execute(&args(json!({})), &ctx);
        assert!(matches!(result, Err(ToolError::MissingArguments(_))));
    }
}
