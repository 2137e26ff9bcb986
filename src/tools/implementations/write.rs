// FileWriteTool - creates, overwrites or appends to files

use std::fs::{self, OpenOptions};
use std::io::Write;

use crate::tools::error::ToolError;
use crate::tools::types::{Arguments, ArgumentsExt, ToolContext, ToolOutput};

pub fn execute(args: &Arguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    let requested = args.required_str("path")?;
    let content = args.required_str("content")?;
    let append = args.optional_bool("append")?.unwrap_or(false);

    let path = ctx.resolve_unignored(requested)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    if append {
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(content.as_bytes())?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "Appended to file");
        Ok(ToolOutput::Text(format!("Content appended to {}", requested)))
    } else {
        fs::write(&path, content)?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote file");
        Ok(ToolOutput::Text(format!("File {} created successfully", requested)))
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
        let ctx = ToolContext::new(dir.path(), IgnoreRuleset::new([".git"]));
        (dir, ctx)
    }

    fn args(value: serde_json::Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let (dir, ctx) = setup();
        let output = execute(
            &args(json!({"path": "a/b/c.txt", "content": "hello"})),
            &ctx,
        )
        .unwrap();

        assert_eq!(output.as_text(), Some("File a/b/c.txt created successfully"));
        assert_eq!(fs::read_to_string(dir.path().join("a/b/c.txt")).unwrap(), "hello");
    }

    #[test]
    fn test_write_overwrites() {
        let (dir, ctx) = setup();
        fs::write(dir.path().join("f.txt"), "old").unwrap();
        execute(&args(json!({"path": "f.txt", "content": "new"})), &ctx).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), "new");
    }

    #[test]
    fn test_append() {
        let (dir, ctx) = setup();
        fs::write(dir.path().join("log.txt"), "one\n").unwrap();
        let output = execute(
            &args(json!({"path": "log.txt", "content": "two\n", "append": true})),
            &ctx,
        )
        .unwrap();

        assert_eq!(output.as_text(), Some("Content appended to log.txt"));
        assert_eq!(
            fs::read_to_string(dir.path().join("log.txt")).unwrap(),
            "one\ntwo\n"
        );
    }

    #[test]
    fn test_write_outside_working_dir() {
        let (_dir, ctx) = setup();
        let result = execute(
            &args(json!({"path": "../../etc/passwd", "content": "x"})),
            &ctx,
        );
        assert!(matches!(result, Err(ToolError::PathEscape(_))));
    }

    #[test]
    fn test_write_ignored_path() {
        let (dir, ctx) = setup();
        let result = execute(&args(json!({"path": ".git/config", "content": "x"})), &ctx);
        assert!(matches!(result, Err(ToolError::Ignored { .. })));
        assert!(!dir.path().join(".git").exists());
    }

    #[test]
    fn test_write_requires_content() {
        let (_dir, ctx) = setup();
        let result = execute(&args(json!({"path": "x.txt"})), &ctx);
        assert!(matches!(result, Err(ToolError::MissingArguments(_))));
    }
}
