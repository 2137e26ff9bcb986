// Configuration store
// Global (~/.ollama-code/config.json) and project (<cwd>/.ollama-code/config.json)
// JSON documents, merged over built-in defaults with project values winning.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Settings;

pub const CONFIG_DIR: &str = ".ollama-code";
const CONFIG_FILE: &str = "config.json";
const HISTORY_FILE: &str = "history.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// User-wide configuration
    Global,
    /// Working-directory-local configuration
    Project,
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    global_path: PathBuf,
    project_path: PathBuf,
}

impl ConfigStore {
    /// Store rooted at the user's home directory and `working_dir`
    pub fn new(working_dir: &Path) -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(Self::with_paths(
            home.join(CONFIG_DIR).join(CONFIG_FILE),
            working_dir.join(CONFIG_DIR).join(CONFIG_FILE),
        ))
    }

    pub fn with_paths(global_path: PathBuf, project_path: PathBuf) -> Self {
        Self {
            global_path,
            project_path,
        }
    }

    pub fn path(&self, scope: Scope) -> &Path {
        match scope {
            Scope::Global => &self.global_path,
            Scope::Project => &self.project_path,
        }
    }

    /// Prompt history file, kept in the same directory as the global config
    pub fn history_path(&self) -> PathBuf {
        self.global_path
            .parent()
            .map(|dir| dir.join(HISTORY_FILE))
            .unwrap_or_else(|| PathBuf::from(HISTORY_FILE))
    }

    /// Raw contents of one file, empty when it does not exist
    fn load_scope(&self, scope: Scope) -> Result<Map<String, Value>> {
        let path = self.path(scope);
        if !path.exists() {
            return Ok(Map::new());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?
        {
            Value::Object(map) => Ok(map),
            _ => bail!("{} must contain a JSON object", path.display()),
        }
    }

    fn save_scope(&self, scope: Scope, map: &Map<String, Value>) -> Result<()> {
        let path = self.path(scope);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_string_pretty(map).context("Failed to serialize config")?;
        fs::write(&temp_path, json)
            .with_context(|| format!("Failed to write to {}", temp_path.display()))?;

        fs::rename(&temp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            )
        })?;

        tracing::debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Merged view for `scope`.
    ///
    /// `Global` is defaults + global; `Project` additionally layers the
    /// project file on top.
    pub fn list(&self, scope: Scope) -> Result<Map<String, Value>> {
        let mut merged = Settings::defaults_map();
        merged.extend(self.load_scope(Scope::Global)?);
        if scope == Scope::Project {
            merged.extend(self.load_scope(Scope::Project)?);
        }
        Ok(merged)
    }

    pub fn get(&self, key: &str, scope: Scope) -> Result<Option<Value>> {
        Ok(self.list(scope)?.remove(key))
    }

    pub fn set(&self, key: &str, value: Value, scope: Scope) -> Result<()> {
        let mut map = self.load_scope(scope)?;
        map.insert(key.to_string(), value);
        self.save_scope(scope, &map)
    }

    /// Append `value` to the list under `key` in `scope`, skipping duplicates
    pub fn append_to_list(&self, key: &str, value: Value, scope: Scope) -> Result<()> {
        let mut map = self.load_scope(scope)?;
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));

        let Value::Array(items) = entry else {
            bail!("Config key {} is not a list", key);
        };
        if items.contains(&value) {
            return Ok(());
        }
        items.push(value);
        self.save_scope(scope, &map)
    }

    /// Remove `value` from the list under `key` in `scope`
    pub fn remove_from_list(&self, key: &str, value: &Value, scope: Scope) -> Result<bool> {
        let mut map = self.load_scope(scope)?;
        let Some(entry) = map.get_mut(key) else {
            return Ok(false);
        };
        let Value::Array(items) = entry else {
            bail!("Config key {} is not a list", key);
        };

        let before = items.len();
        items.retain(|item| item != value);
        if items.len() == before {
            return Ok(false);
        }
        self.save_scope(scope, &map)?;
        Ok(true)
    }

    /// Typed settings from the project-over-global merge
    pub fn settings(&self) -> Result<Settings> {
        let merged = self.list(Scope::Project)?;
        serde_json::from_value(Value::Object(merged)).context("Invalid configuration value")
    }
}

/// Interpret a command-line value: JSON when it parses, else a plain string
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
