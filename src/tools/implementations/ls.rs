// LSTool - lists directory contents

use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::tools::error::ToolError;
use crate::tools::types::{Arguments, ArgumentsExt, ToolContext, ToolOutput};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
}

pub fn execute(args: &Arguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    let requested = args.optional_str("path")?.unwrap_or(".");
    let recursive = args.optional_bool("recursive")?.unwrap_or(false);
    let show_hidden = args.optional_bool("showHidden")?.unwrap_or(false);

    let dir = ctx.resolve(requested)?;
    if dir != ctx.working_dir() {
        ctx.check_ignored(&dir)?;
    }

    match fs::metadata(&dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(ToolError::InvalidArgument(format!(
                "{} is not a directory",
                requested
            )))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ToolError::NotFound(requested.to_string()))
        }
        Err(e) => return Err(e.into()),
    }

    let entries = list_dir(ctx, &dir, "", recursive, show_hidden)?;
    let value = serde_json::to_value(entries)
        .map_err(|e| ToolError::ExecutionFailed(format!("Failed to serialize listing: {}", e)))?;
    Ok(ToolOutput::Json(value))
}

/// One level's entries first, then each subdirectory's listing when recursive
fn list_dir(
    ctx: &ToolContext,
    dir: &Path,
    prefix: &str,
    recursive: bool,
    show_hidden: bool,
) -> Result<Vec<DirEntry>, ToolError> {
    let mut level = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if !show_hidden && name.starts_with('.') {
            continue;
        }
        if ctx.ignore.is_ignored(&ctx.relative(&entry.path())) {
            continue;
        }

        let is_directory = entry.file_type()?.is_dir();
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", prefix, name)
        };
        level.push(DirEntry {
            name,
            path,
            is_directory,
        });
    }
    level.sort_by(|a, b| a.name.cmp(&b.name));

    if !recursive {
        return Ok(level);
    }

    let mut all = level.clone();
    for sub in level.iter().filter(|e| e.is_directory) {
        let children = list_dir(ctx, &dir.join(&sub.name), &sub.path, recursive, show_hidden)?;
        all.extend(children);
    }
    Ok(all)
}
