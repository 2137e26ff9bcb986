// Configuration settings
//
// Typed view over the merged global/project configuration. Keys are stored
// in camelCase JSON so hand-edited files read naturally.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "codellama";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Ollama server address
    pub ollama_base_url: String,
    /// Model used for chat completions
    pub ollama_model: String,
    pub theme: String,
    pub verbose: bool,
    /// Persisted permission grants, may contain `*` wildcards
    pub allowed_tools: Vec<String>,
    /// Paths filesystem tools refuse to touch
    pub ignore_patterns: Vec<String>,
    /// Upper bound on tokens generated per response
    pub max_tokens: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ollama_base_url: DEFAULT_BASE_URL.to_string(),
            ollama_model: DEFAULT_MODEL.to_string(),
            theme: "dark".to_string(),
            verbose: false,
            allowed_tools: Vec::new(),
            ignore_patterns: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "node_modules/**".to_string(),
                ".git/**".to_string(),
            ],
            max_tokens: 4096,
        }
    }
}

impl Settings {
    /// Defaults as a JSON map, the base layer of every merged view
    pub fn defaults_map() -> Map<String, Value> {
        match serde_json::to_value(Settings::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.ollama_base_url, "http://localhost:11434");
        assert_eq!(settings.ollama_model, "codellama");
        assert_eq!(settings.max_tokens, 4096);
        assert!(settings.allowed_tools.is_empty());
        assert!(settings.ignore_patterns.contains(&"node_modules".to_string()));
    }

    #[test]
    fn test_camel_case_keys() {
        let map = Settings::defaults_map();
        assert!(map.contains_key("ollamaBaseUrl"));
        assert!(map.contains_key("allowedTools"));
        assert!(map.contains_key("ignorePatterns"));
        assert!(map.contains_key("maxTokens"));
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"ollamaModel": "llama3", "verbose": true}"#).unwrap();
        assert_eq!(settings.ollama_model, "llama3");
        assert!(settings.verbose);
        assert_eq!(settings.ollama_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_unknown_keys_are_tolerated() {
        let settings: Settings = serde_json::from_str(r#"{"customKey": 1}"#).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
