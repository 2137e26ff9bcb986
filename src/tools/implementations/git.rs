// GitTool - runs a fixed set of git operations through the `git` binary

use serde_json::{Map, Value};
use std::path::Path;
use tokio::process::Command;

use crate::tools::error::ToolError;
use crate::tools::types::{Arguments, ArgumentsExt, ToolContext, ToolOutput};

const DEFAULT_LOG_COUNT: i64 = 10;
const DEFAULT_REMOTE: &str = "origin";
const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitOperation {
    Status,
    Log,
    Add,
    Commit,
    Push,
    Pull,
    Branch,
    Diff,
    Blame,
}

impl GitOperation {
    pub fn parse(name: &str) -> Result<Self, ToolError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "status" => Ok(Self::Status),
            "log" => Ok(Self::Log),
            "add" => Ok(Self::Add),
            "commit" => Ok(Self::Commit),
            "push" => Ok(Self::Push),
            "pull" => Ok(Self::Pull),
            "branch" => Ok(Self::Branch),
            "diff" => Ok(Self::Diff),
            "blame" => Ok(Self::Blame),
            _ => Err(ToolError::UnsupportedOperation(name.to_string())),
        }
    }
}

/// A `.git` entry in `dir` or any ancestor
pub fn is_repository(dir: &Path) -> bool {
    dir.ancestors().any(|d| d.join(".git").exists())
}

pub async fn execute(args: &Arguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    let operation = args.required_str("operation")?;
    let params: Map<String, Value> = match args.get("params") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(ToolError::InvalidArgument(format!(
                "params must be an object, got {}",
                other
            )))
        }
    };

    let root = ctx.working_dir();
    if !is_repository(root) {
        return Err(ToolError::NotARepository(root.display().to_string()));
    }

    let op = GitOperation::parse(operation)?;
    let argv = build_args(op, &params, ctx)?;

    let output = run_git(root, &argv).await?;

    let text = match op {
        GitOperation::Add => {
            let status = run_git(root, &["status".to_string()]).await?;
            format!("Files staged.\n{}", status)
        }
        GitOperation::Branch => match (
            params.optional_str("create")?,
            params.optional_str("checkout")?,
        ) {
            (Some(name), _) => format!("Created and switched to branch {}", name),
            (None, Some(name)) => format!("Switched to branch {}", name),
            (None, None) => output,
        },
        _ => output,
    };

    Ok(ToolOutput::Text(text))
}

/// Argument vector for `git`, validated before anything runs
fn build_args(
    op: GitOperation,
    params: &Map<String, Value>,
    ctx: &ToolContext,
) -> Result<Vec<String>, ToolError> {
    let mut argv: Vec<String> = Vec::new();
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    match op {
        GitOperation::Status => argv.push("status".into()),
        GitOperation::Log => {
            let count = params.optional_i64("maxCount")?.unwrap_or(DEFAULT_LOG_COUNT).max(1);
            argv.extend(owned(&["log", "--date=short", "--pretty=format:%h %ad %an %s"]));
            argv.push(format!("--max-count={}", count));
        }
        GitOperation::Add => {
            argv.push("add".into());
            match params.optional_str_list("files")? {
                Some(files) if !files.is_empty() => {
                    argv.push("--".into());
                    argv.extend(checked_files(files, ctx)?);
                }
                _ if params.optional_bool("all")? == Some(true) => argv.push("--all".into()),
                _ => return Err(ToolError::missing("params.files")),
            }
        }
        GitOperation::Commit => {
            let message = params
                .optional_str("message")?
                .filter(|m| !m.trim().is_empty())
                .ok_or_else(|| ToolError::missing("params.message"))?;
            argv.extend(owned(&["commit", "-m", message]));
        }
        GitOperation::Push | GitOperation::Pull => {
            let verb = if op == GitOperation::Push { "push" } else { "pull" };
            argv.push(verb.to_string());
            argv.extend(params.optional_str_list("options")?.unwrap_or_default());
            argv.push(params.optional_str("remote")?.unwrap_or(DEFAULT_REMOTE).to_string());
            argv.push(params.optional_str("branch")?.unwrap_or(DEFAULT_BRANCH).to_string());
        }
        GitOperation::Branch => {
            if let Some(name) = params.optional_str("create")? {
                argv.extend(owned(&["checkout", "-b", name]));
            } else if let Some(name) = params.optional_str("checkout")? {
                argv.extend(owned(&["checkout", name]));
            } else {
                argv.extend(owned(&["branch", "--list"]));
            }
        }
        GitOperation::Diff => {
            argv.push("diff".into());
            argv.push(params.optional_str("from")?.unwrap_or("HEAD").to_string());
            if let Some(to) = params.optional_str("to")? {
                argv.push(to.to_string());
            }
            if let Some(files) = params.optional_str_list("files")? {
                argv.push("--".into());
                argv.extend(checked_files(files, ctx)?);
            }
        }
        GitOperation::Blame => {
            let file = params
                .optional_str("file")?
                .ok_or_else(|| ToolError::missing("params.file"))?;
            argv.extend(owned(&["blame", "--"]));
            argv.extend(checked_files(vec![file.to_string()], ctx)?);
        }
    }

    Ok(argv)
}

fn checked_files(files: Vec<String>, ctx: &ToolContext) -> Result<Vec<String>, ToolError> {
    for file in &files {
        ctx.resolve(file)?;
    }
    Ok(files)
}

async fn run_git(root: &Path, argv: &[String]) -> Result<String, ToolError> {
    tracing::debug!(args = ?argv, "Running git");

    let output = Command::new("git")
        .args(argv)
        .current_dir(root)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ToolError::ExecutionFailed(format!("Failed to run git: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ToolError::ExecutionFailed(format!(
            "Git operation failed: {}",
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ignore::IgnoreRuleset;
    use serde_json::json;
    use tempfile::TempDir;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    /// Directory that looks like a repository without needing git installed
    fn fake_repo() -> (TempDir, ToolContext) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let ctx = ToolContext::new(dir.path(), IgnoreRuleset::default());
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_not_a_repository() {
        let dir = TempDir::new().unwrap();
        let ctx = ToolContext::new(dir.path(), IgnoreRuleset::default());
        let result = execute(&args(json!({"operation": "status"})), &ctx).await;
        assert!(matches!(result, Err(ToolError::NotARepository(_))));
    }

    #[tokio::test]
    async fn test_unsupported_operation() {
        let (_dir, ctx) = fake_repo();
        let result = execute(&args(json!({"operation": "rebase"})), &ctx).await;
        assert!(matches!(result, Err(ToolError::UnsupportedOperation(op)) if op == "rebase"));
    }

    #[tokio::test]
    async fn test_commit_requires_message() {
        let (_dir, ctx) = fake_repo();
        let result = execute(&args(json!({"operation": "commit", "params": {}})), &ctx).await;
        assert!(matches!(result, Err(ToolError::MissingArguments(_))));
    }

    #[tokio::test]
    async fn test_blame_rejects_outside_paths() {
        let (_dir, ctx) = fake_repo();
        let result = execute(
            &args(json!({"operation": "blame", "params": {"file": "../../etc/passwd"}})),
            &ctx,
        )
        .await;
        assert!(matches!(result, Err(ToolError::PathEscape(_))));
    }

    #[test]
    fn test_operation_names_are_case_insensitive() {
        assert_eq!(GitOperation::parse("STATUS").unwrap(), GitOperation::Status);
        assert_eq!(GitOperation::parse("Log").unwrap(), GitOperation::Log);
    }

    #[test]
    fn test_build_args_defaults() {
        let (_dir, ctx) = fake_repo();
        let argv = build_args(GitOperation::Push, &Map::new(), &ctx).unwrap();
        assert_eq!(argv, vec!["push", "origin", "main"]);

        let argv = build_args(GitOperation::Log, &Map::new(), &ctx).unwrap();
        assert!(argv.contains(&"--max-count=10".to_string()));

        let argv = build_args(GitOperation::Diff, &Map::new(), &ctx).unwrap();
        assert_eq!(argv, vec!["diff", "HEAD"]);
    }

    #[test]
    fn test_add_stages_everything_only_when_asked() {
        let (_dir, ctx) = fake_repo();
        for params in [Map::new(), args(json!({"all": false})), args(json!({"files": []}))] {
            assert!(matches!(
                build_args(GitOperation::Add, &params, &ctx),
                Err(ToolError::MissingArguments(ref what)) if what == "params.files"
            ));
        }

        let argv = build_args(GitOperation::Add, &args(json!({"all": true})), &ctx).unwrap();
        assert_eq!(argv, vec!["add", "--all"]);

        let params = args(json!({"files": "src/lib.rs"}));
        let argv = build_args(GitOperation::Add, &params, &ctx).unwrap();
        assert_eq!(argv, vec!["add", "--", "src/lib.rs"]);
    }

    #[test]
    fn test_build_args_branch() {
        let (_dir, ctx) = fake_repo();
        let params = args(json!({"create": "feature"}));
        assert_eq!(
            build_args(GitOperation::Branch, &params, &ctx).unwrap(),
            vec!["checkout", "-b", "feature"]
        );
        assert_eq!(
            build_args(GitOperation::Branch, &Map::new(), &ctx).unwrap(),
            vec!["branch", "--list"]
        );
    }

    #[test]
    fn test_repository_detection_walks_ancestors() {
        let (dir, _ctx) = fake_repo();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        assert!(is_repository(&nested));
    }
}
