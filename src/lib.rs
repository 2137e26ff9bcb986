// Ollama Code - terminal coding assistant for local Ollama models
// Library exports

pub mod cli;
pub mod config;
pub mod errors; // User-facing error messages
pub mod json_scan; // Incremental JSON object scanning
pub mod ollama; // Ollama HTTP client
pub mod tools; // Tool execution system
