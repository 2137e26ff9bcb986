// User-friendly error messages
//
// Turns model-server and configuration failures into actionable messages
// that guide users toward a fix.

use crate::ollama::NetworkError;

/// Ollama is not listening at the configured address
pub fn connection_refused_error(base_url: &str) -> String {
    format!(
        "Could not connect to Ollama at {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • Ollama is not running\n\
        • Ollama is listening on a different address\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Start the server:\n\
           \x1b[36mollama serve\x1b[0m\n\n\
        2. Point ollama-code at the right address:\n\
           \x1b[36mollama-code config set ollamaBaseUrl http://host:11434 --global\x1b[0m",
        base_url
    )
}

/// The configured model has not been pulled
pub fn model_not_found_error(model_name: &str) -> String {
    format!(
        "Model '{}' not found\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Pull the model:\n\
           \x1b[36mollama pull {}\x1b[0m\n\n\
        2. List installed models:\n\
           \x1b[36m/models\x1b[0m  (inside ollama-code)\n\n\
        3. Choose another model:\n\
           \x1b[36mollama-code config set ollamaModel <name> --global\x1b[0m",
        model_name, model_name
    )
}

/// Config file exists but could not be read as JSON
pub fn config_parse_error(error: &str) -> String {
    format!(
        "Failed to load configuration\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Inspect the files:\n\
           \x1b[36mcat ~/.ollama-code/config.json .ollama-code/config.json\x1b[0m\n\n\
        2. Reset a value:\n\
           \x1b[36mollama-code config set <key> <value>\x1b[0m",
        error
    )
}

/// Best explanation for a failed exchange
pub fn describe_network_error(error: &NetworkError, base_url: &str, model: &str) -> String {
    match error {
        e if e.is_connection_refused() => connection_refused_error(base_url),
        NetworkError::Status { status, body }
            if status.starts_with("404") && body.contains("not found") =>
        {
            model_not_found_error(model)
        }
        NetworkError::Server(message) if message.contains("not found") => {
            model_not_found_error(model)
        }
        other => other.to_string(),
    }
}
