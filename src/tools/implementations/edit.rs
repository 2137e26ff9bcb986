// FileEditTool - in-place edits by content match or by line range
//
// Content mode replaces the first occurrence of `oldContent`.
// Line mode replaces lines `startLine..=endLine` (0-based).
// The file is only written once the edit is known to apply.

use std::fs;

use super::read::read_file;
use crate::tools::error::ToolError;
use crate::tools::types::{Arguments, ArgumentsExt, ToolContext, ToolOutput};

enum EditMode<'a> {
    Content { old: &'a str, new: &'a str },
    Lines { start: i64, end: i64, new: Option<&'a str> },
}

fn select_mode(args: &Arguments) -> Result<EditMode<'_>, ToolError> {
    let old = args.optional_str("oldContent")?.filter(|s| !s.is_empty());
    let new = args.optional_str("newContent")?;
    let start = args.optional_i64("startLine")?;
    let end = args.optional_i64("endLine")?;

    match (old, start, end) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(ToolError::missing(
            "either oldContent/newContent or startLine/endLine, not both",
        )),
        (Some(old), None, None) => {
            let new = new.ok_or_else(|| ToolError::missing("newContent"))?;
            Ok(EditMode::Content { old, new })
        }
        (None, Some(start), Some(end)) => Ok(EditMode::Lines { start, end, new }),
        (None, Some(_), None) => Err(ToolError::missing("endLine")),
        (None, None, Some(_)) => Err(ToolError::missing("startLine")),
        (None, None, None) => Err(ToolError::missing(
            "oldContent and newContent, or startLine and endLine",
        )),
    }
}

pub fn execute(args: &Arguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    let requested = args.required_str("path")?;
    let mode = select_mode(args)?;
    let path = ctx.resolve(requested)?;

    let content = read_file(&path, requested)?;

    let updated = match mode {
        EditMode::Content { old, new } => {
            if !content.contains(old) {
                return Err(ToolError::ContentNotFound(requested.to_string()));
            }
            content.replacen(old, new, 1)
        }
        EditMode::Lines { start, end, new } => replace_lines(&content, start, end, new)?,
    };

    fs::write(&path, updated)?;
    tracing::debug!(path = %path.display(), "Edited file");

    Ok(ToolOutput::Text(format!("File {} updated successfully", requested)))
}

fn replace_lines(content: &str, start: i64, end: i64, new: Option<&str>) -> Result<String, ToolError> {
    let lines: Vec<&str> = content.split('\n').collect();
    let line_count = lines.len();

    let valid = start >= 0 && start <= end && (end as usize) < line_count;
    if !valid {
        return Err(ToolError::InvalidRange {
            start,
            end,
            line_count,
        });
    }
    let (start, end) = (start as usize, end as usize);

    let mut result: Vec<&str> = Vec::with_capacity(line_count);
    result.extend_from_slice(&lines[..start]);
    if let Some(new) = new.filter(|s| !s.is_empty()) {
        result.extend(new.split('\n'));
    }
    result.extend_from_slice(&lines[end + 1..]);

    Ok(result.join("\n"))
}
