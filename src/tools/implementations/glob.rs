// GlobTool - finds files matching glob patterns

use globset::{GlobBuilder, GlobMatcher};
use walkdir::WalkDir;

use crate::tools::error::ToolError;
use crate::tools::types::{Arguments, ArgumentsExt, ToolContext, ToolOutput};

#[derive(Debug, Clone, Copy, Default)]
pub struct GlobOptions {
    pub include_hidden: bool,
    pub only_directories: bool,
}

pub fn execute(args: &Arguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    let pattern = args.required_str("pattern")?;
    let options = GlobOptions {
        include_hidden: args.optional_bool("includeHidden")?.unwrap_or(false),
        only_directories: args.optional_bool("onlyDirectories")?.unwrap_or(false),
    };

    let matches = find(ctx, pattern, options)?;
    Ok(ToolOutput::Json(serde_json::Value::from(matches)))
}

fn compile(pattern: &str) -> Result<GlobMatcher, ToolError> {
    let pattern = pattern.trim_start_matches("./");
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| ToolError::InvalidArgument(format!("Invalid glob pattern {}: {}", pattern, e)))
}

/// Relative paths under the working directory matching `pattern`, sorted
pub(crate) fn find(
    ctx: &ToolContext,
    pattern: &str,
    options: GlobOptions,
) -> Result<Vec<String>, ToolError> {
    let matcher = compile(pattern)?;
    let root = ctx.working_dir();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            (options.include_hidden || !hidden) && !ctx.ignore.is_ignored(&ctx.relative(entry.path()))
        });

    let mut matches = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let is_dir = entry.file_type().is_dir();
        if is_dir != options.only_directories {
            continue;
        }

        let relative = ctx.relative(entry.path());
        if matcher.is_match(&relative) {
            matches.push(relative);
        }
    }

    Ok(matches)
}
