// Core types for tool execution
//
// Directives parsed out of model text, the context handlers run in, and the
// argument accessors shared by every handler.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::error::ToolError;
use super::ignore::IgnoreRuleset;

/// Arguments of a directive, always a JSON object
pub type Arguments = Map<String, Value>;

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Arguments,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Validate a parsed JSON value as a directive.
    ///
    /// Requires a non-empty string `name` and an object `arguments`.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut object) = value else {
            return None;
        };
        let name = match object.remove("name")? {
            Value::String(name) if !name.trim().is_empty() => name,
            _ => return None,
        };
        match object.remove("arguments")? {
            Value::Object(arguments) => Some(Self { name, arguments }),
            _ => None,
        }
    }

    /// Canonical key for this (name, arguments) pair: `Name(<json>)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, canonical_json(&Value::Object(self.arguments.clone())))
    }
}

/// Serialize a value with object keys sorted at every level and no whitespace
pub fn canonical_json(value: &Value) -> String {
    fn sorted(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let mut out = Map::new();
                for key in keys {
                    out.insert(key.clone(), sorted(&map[key]));
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
            other => other.clone(),
        }
    }

    sorted(value).to_string()
}

/// Everything a handler needs besides its arguments
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub working_dir: PathBuf,
    pub ignore: IgnoreRuleset,
}

impl ToolContext {
    pub fn new(working_dir: impl Into<PathBuf>, ignore: IgnoreRuleset) -> Self {
        Self {
            working_dir: super::paths::normalize(&working_dir.into()),
            ignore,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Resolve a requested path, enforcing containment only
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, ToolError> {
        super::paths::resolve_within(&self.working_dir, requested)
    }

    /// Resolve a requested path, enforcing containment and the ignore ruleset
    pub fn resolve_unignored(&self, requested: &str) -> Result<PathBuf, ToolError> {
        let path = self.resolve(requested)?;
        self.check_ignored(&path)?;
        Ok(path)
    }

    pub fn check_ignored(&self, path: &Path) -> Result<(), ToolError> {
        let relative = self.relative(path);
        match self.ignore.matching(&relative) {
            Some(pattern) => Err(ToolError::Ignored {
                path: relative,
                pattern: pattern.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// `/`-separated path relative to the working directory
    pub fn relative(&self, path: &Path) -> String {
        super::paths::relative_display(&self.working_dir, path)
    }
}

/// Successful handler output
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Text(String),
    Json(Value),
}

impl ToolOutput {
    /// Text form appended to the conversation
    pub fn render(&self) -> String {
        match self {
            ToolOutput::Text(text) => text.clone(),
            ToolOutput::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ToolOutput::Json(value) => Some(value),
            ToolOutput::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolOutput::Text(text) => Some(text),
            ToolOutput::Json(_) => None,
        }
    }
}

/// Typed accessors over directive arguments
pub trait ArgumentsExt {
    fn required_str(&self, key: &str) -> Result<&str, ToolError>;
    fn optional_str(&self, key: &str) -> Result<Option<&str>, ToolError>;
    fn optional_bool(&self, key: &str) -> Result<Option<bool>, ToolError>;
    fn optional_i64(&self, key: &str) -> Result<Option<i64>, ToolError>;
    /// A string or an array of strings
    fn optional_str_list(&self, key: &str) -> Result<Option<Vec<String>>, ToolError>;
}

impl ArgumentsExt for Arguments {
    fn required_str(&self, key: &str) -> Result<&str, ToolError> {
        self.optional_str(key)?
            .ok_or_else(|| ToolError::missing(key))
    }

    fn optional_str(&self, key: &str) -> Result<Option<&str>, ToolError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(ToolError::InvalidArgument(format!(
                "`{}` must be a string, got {}",
                key, other
            ))),
        }
    }

    fn optional_bool(&self, key: &str) -> Result<Option<bool>, ToolError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) if s == "true" || s == "false" => Ok(Some(s == "true")),
            Some(other) => Err(ToolError::InvalidArgument(format!(
                "`{}` must be a boolean, got {}",
                key, other
            ))),
        }
    }

    fn optional_i64(&self, key: &str) -> Result<Option<i64>, ToolError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Some)
                .ok_or_else(|| {
                    ToolError::InvalidArgument(format!("`{}` must be an integer", key))
                }),
            Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| {
                ToolError::InvalidArgument(format!("`{}` must be an integer, got {:?}", key, s))
            }),
            Some(other) => Err(ToolError::InvalidArgument(format!(
                "`{}` must be an integer, got {}",
                key, other
            ))),
        }
    }

    fn optional_str_list(&self, key: &str) -> Result<Option<Vec<String>>, ToolError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ToolError::InvalidArgument(format!(
                            "`{}` must contain only strings",
                            key
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(ToolError::InvalidArgument(format!(
                "`{}` must be a string or an array of strings, got {}",
                key, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_signature_is_key_order_independent() {
        let a = ToolCall::new("BashTool", args(json!({"command": "ls", "cwd": "src"})));
        let b = ToolCall::new("BashTool", args(json!({"cwd": "src", "command": "ls"})));
        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.signature(), r#"BashTool({"command":"ls","cwd":"src"})"#);
    }

    #[test]
    fn test_canonical_json_sorts_nested_objects() {
        let value = json!({"b": {"z": 1, "a": [ {"y": 2, "x": 1} ]}, "a": true});
        assert_eq!(canonical_json(&value), r#"{"a":true,"b":{"a":[{"x":1,"y":2}],"z":1}}"#);
    }

    #[test]
    fn test_from_value_validation() {
        assert!(ToolCall::from_value(json!({"name": "LSTool", "arguments": {}})).is_some());
        assert!(ToolCall::from_value(json!({"name": "", "arguments": {}})).is_none());
        assert!(ToolCall::from_value(json!({"name": 3, "arguments": {}})).is_none());
        assert!(ToolCall::from_value(json!({"name": "LSTool", "arguments": "x"})).is_none());
        assert!(ToolCall::from_value(json!({"name": "LSTool"})).is_none());
        assert!(ToolCall::from_value(json!([1, 2])).is_none());
    }

    #[test]
    fn test_argument_accessors() {
        let a = args(json!({
            "path": "a.txt",
            "append": true,
            "startLine": 2,
            "endLine": "4",
            "files": ["a", "b"],
            "file": "c"
        }));
        assert_eq!(a.required_str("path").unwrap(), "a.txt");
        assert!(matches!(
            a.required_str("content"),
            Err(ToolError::MissingArguments(_))
        ));
        assert_eq!(a.optional_bool("append").unwrap(), Some(true));
        assert_eq!(a.optional_i64("startLine").unwrap(), Some(2));
        assert_eq!(a.optional_i64("endLine").unwrap(), Some(4));
        assert_eq!(
            a.optional_str_list("files").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(a.optional_str_list("file").unwrap(), Some(vec!["c".to_string()]));
        assert!(a.optional_bool("path").is_err());
    }

    #[test]
    fn test_tool_output_render() {
        assert_eq!(ToolOutput::Text("hi".into()).render(), "hi");
        let rendered = ToolOutput::Json(json!([{"name": "a"}])).render();
        assert!(rendered.contains("\"name\": \"a\""));
    }
}
