// Slash command parsing

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    Compact,
    Cost,
    Init,
    Models,
    Exit,
    Unknown(String),
}

impl Command {
    /// Parse a `/command` line. Returns `None` for ordinary input.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let rest = trimmed.strip_prefix('/')?;
        let name = rest.split_whitespace().next().unwrap_or_default();

        Some(match name {
            "help" => Command::Help,
            "clear" => Command::Clear,
            "compact" => Command::Compact,
            "cost" => Command::Cost,
            "init" => Command::Init,
            "models" => Command::Models,
            "exit" | "quit" => Command::Exit,
            other => Command::Unknown(other.to_string()),
        })
    }
}

pub fn format_help() -> String {
    r#"Available commands:
  /help     - Show this help message
  /clear    - Clear conversation history
  /compact  - Keep only the most recent messages
  /cost     - Show estimated token usage
  /init     - Generate an OLLAMA_CODE.md project guide
  /models   - List models available on the Ollama server
  /exit     - Exit ollama-code"#
        .to_string()
}
