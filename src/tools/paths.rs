// Path containment for tool arguments
//
// Every path a handler touches is resolved against the working directory and
// must stay inside it. Resolution is lexical; symlinks are not followed.

use std::path::{Component, Path, PathBuf};

use super::error::ToolError;

/// Collapse `.` and `..` components without touching the filesystem
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolve `requested` against `working_dir`, rejecting anything outside it
pub fn resolve_within(working_dir: &Path, requested: &str) -> Result<PathBuf, ToolError> {
    let root = normalize(working_dir);
    let resolved = normalize(&root.join(requested));

    if resolved.starts_with(&root) {
        Ok(resolved)
    } else {
        Err(ToolError::PathEscape(requested.to_string()))
    }
}

/// `/`-separated path of `path` relative to `root`, used for ignore matching
/// and for the paths reported back to the model
pub fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
