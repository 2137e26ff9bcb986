// GrepTool - searches file contents for patterns
//
// Candidate files come from the glob handler and are read through the read
// handler, so the same containment and ignore rules apply. Files that cannot
// be read (binary, permissions) are skipped.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use super::glob::{self, GlobOptions};
use super::read::read_file;
use crate::tools::error::ToolError;
use crate::tools::types::{Arguments, ArgumentsExt, ToolContext, ToolOutput};

pub const DEFAULT_GLOB: &str = "**/*.{rs,toml,js,jsx,ts,tsx,py,md,txt,json}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrepMatch {
    pub file: String,
    pub line: usize,
    pub content: String,
}

pub fn execute(args: &Arguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    let pattern = args.required_str("pattern")?;
    let file_glob = args.optional_str("glob")?.unwrap_or(DEFAULT_GLOB);
    let case_sensitive = args.optional_bool("caseSensitive")?.unwrap_or(false);
    let use_regex = args.optional_bool("regex")?.unwrap_or(false);

    let source = if use_regex {
        pattern.to_string()
    } else {
        regex::escape(pattern)
    };
    let matcher: Regex = RegexBuilder::new(&source)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| ToolError::InvalidArgument(format!("Invalid regex pattern {}: {}", pattern, e)))?;

    let files = glob::find(ctx, file_glob, GlobOptions::default())?;

    let mut results = Vec::new();
    for file in files {
        let contents = match ctx
            .resolve_unignored(&file)
            .and_then(|path| read_file(&path, &file))
        {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(file = %file, "Skipping unreadable file: {}", e);
                continue;
            }
        };

        for (index, line) in contents.lines().enumerate() {
            if matcher.is_match(line) {
                results.push(GrepMatch {
                    file: file.clone(),
                    line: index + 1,
                    content: line.trim().to_string(),
                });
            }
        }
    }

    let value = serde_json::to_value(results)
        .map_err(|e| ToolError::ExecutionFailed(format!("Failed to serialize matches: {}", e)))?;
    Ok(ToolOutput::Json(value))
}
