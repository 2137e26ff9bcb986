// BashTool - executes shell commands
//
// Commands are screened against a fixed blocklist before anything is spawned.
// This is a best-effort filter, not a sandbox.

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::tools::error::ToolError;
use crate::tools::types::{Arguments, ArgumentsExt, ToolContext, ToolOutput};

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Destructive deletes, redirection, piping and chaining
const BLOCKED_OPERATORS: &[&str] = &[
    "rm -rf /", "rm -rf *", "rm -rf ~", ">>", ">", "|", ";", "&&", "||", "&",
];

static NETWORK_FETCHER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(wget|curl|nc|ncat|netcat)\b").expect("Failed to compile fetcher regex")
});

static RECURSIVE_RM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*rm\s+(-\S*[rRf]\S*|--recursive|--force)\b.*/")
        .expect("Failed to compile rm regex")
});

static FETCH_TO_SHELL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(curl|wget)\b.*\|\s*(ba)?sh\b").expect("Failed to compile fetch regex")
});

/// Why `command` is refused, if it is
pub fn blocked_reason(command: &str) -> Option<String> {
    if let Some(op) = BLOCKED_OPERATORS.iter().find(|op| command.contains(*op)) {
        return Some(format!("contains `{}`", op));
    }
    if let Some(m) = NETWORK_FETCHER_REGEX.find(command) {
        return Some(format!("uses network tool `{}`", m.as_str()));
    }
    if RECURSIVE_RM_REGEX.is_match(command) {
        return Some("recursive or forced rm on a path".to_string());
    }
    if FETCH_TO_SHELL_REGEX.is_match(command) {
        return Some("pipes a download into a shell".to_string());
    }
    None
}

pub async fn execute(args: &Arguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    let command = args.required_str("command")?;
    let timeout_ms = match args.optional_i64("timeout")? {
        Some(ms) if ms > 0 => ms as u64,
        Some(ms) => {
            return Err(ToolError::InvalidArgument(format!(
                "timeout must be positive, got {}",
                ms
            )))
        }
        None => DEFAULT_TIMEOUT_MS,
    };

    if let Some(reason) = blocked_reason(command) {
        tracing::warn!(command, reason = %reason, "Blocked shell command");
        return Err(ToolError::BlockedCommand(format!("{} ({})", command, reason)));
    }

    let cwd = match args.optional_str("cwd")? {
        Some(requested) => ctx.resolve(requested)?,
        None => ctx.working_dir().to_path_buf(),
    };

    tracing::debug!(command, cwd = %cwd.display(), timeout_ms, "Running shell command");

    let child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(&cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ToolError::ExecutionFailed(format!("Failed to spawn {}: {}", command, e)))?;

    let output = match tokio::time::timeout(Duration::from_millis(timeout_ms), child.wait_with_output()).await {
        Ok(result) => result.map_err(|e| ToolError::ExecutionFailed(e.to_string()))?,
        Err(_) => {
            return Err(ToolError::ExecutionFailed(format!(
                "{} timed out after {} ms",
                command, timeout_ms
            )))
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        return Err(ToolError::ExecutionFailed(format!(
            "Command failed: {} (exit {})\n{}",
            command,
            code,
            stderr.trim_end()
        )));
    }

    Ok(ToolOutput::Text(format_output(&stdout, &stderr)))
}

/// Success output, surfacing stderr as warnings when present
pub fn format_output(stdout: &str, stderr: &str) -> String {
    if stderr.trim().is_empty() {
        stdout.to_string()
    } else {
        format!(
            "Command executed with warnings:\n{}\nOutput:\n{}",
            stderr, stdout
        )
    }
}
