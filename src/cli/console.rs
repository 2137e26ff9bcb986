// Terminal front-end for the conversation loop
//
// `ConsolePrompter` asks the user to approve tool invocations and
// `ConsoleObserver` renders spinners, responses and tool progress.

use anyhow::Result;
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufRead, Write};
use std::time::Duration;

use super::conversation_loop::LoopObserver;
use crate::errors::describe_network_error;
use crate::ollama::NetworkError;
use crate::tools::{
    PermissionDecision, PermissionRequest, Prompter, RememberScope, ToolCall, ToolError,
    ToolOutput,
};

/// Asks for permission on a line-oriented reader and writer
pub struct ConsolePrompter {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

impl ConsolePrompter {
    pub fn new(input: Box<dyn BufRead + Send>, output: Box<dyn Write + Send>) -> Self {
        Self { input, output }
    }

    /// Prompter bound to the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(
            Box::new(std::io::BufReader::new(std::io::stdin())),
            Box::new(std::io::stdout()),
        )
    }

    /// One trimmed, lower-cased answer. `None` on end of input.
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }
}

impl Prompter for ConsolePrompter {
    fn confirm(&mut self, request: &PermissionRequest) -> Result<PermissionDecision> {
        writeln!(self.output, "\n{}", "Permission Request:".bold())?;
        writeln!(self.output, "{}", request.summary.as_str().cyan())?;
        writeln!(self.output, "{}\n", format!("⚠  {}", request.risk.notice()).yellow())?;

        let granted = matches!(
            self.ask("Grant permission? [y/N] ")?.as_deref(),
            Some("y") | Some("yes")
        );
        if !granted {
            writeln!(self.output, "{}", "Permission denied".red())?;
            return Ok(PermissionDecision::Deny);
        }

        writeln!(self.output, "Remember this decision?")?;
        writeln!(self.output, "  1) Just for this session")?;
        writeln!(self.output, "  2) Save to project config")?;
        writeln!(self.output, "  3) Don't remember")?;
        let scope = match self.ask("Choice [3]: ")?.as_deref() {
            Some("1") | Some("s") | Some("session") => RememberScope::Session,
            Some("2") | Some("p") | Some("project") => RememberScope::Project,
            _ => RememberScope::Once,
        };

        let message = match scope {
            RememberScope::Session => "Permission granted for this session",
            RememberScope::Project => "Permission saved to project config",
            RememberScope::Once => "Permission granted once",
        };
        writeln!(self.output, "{}", message.green())?;
        Ok(PermissionDecision::Grant(scope))
    }
}

/// Renders loop events on the terminal.
///
/// In print mode only response text goes to stdout; tool progress and
/// errors go to stderr and no spinner is drawn.
pub struct ConsoleObserver {
    spinner: Option<ProgressBar>,
    print_mode: bool,
    base_url: String,
    model: String,
}

impl ConsoleObserver {
    pub fn new(print_mode: bool, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            spinner: None,
            print_mode,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn note(&self, text: String) {
        if self.print_mode {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }
}

/// Steady-ticking spinner with `message`
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

impl LoopObserver for ConsoleObserver {
    fn on_request(&mut self) {
        if self.print_mode {
            return;
        }
        self.clear_spinner();
        self.spinner = Some(spinner("Thinking..."));
    }

    fn on_progress(&mut self, _text: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message("Receiving response...");
        }
    }

    fn on_response(&mut self, text: &str) {
        self.clear_spinner();
        if self.print_mode {
            println!("{}", text);
        } else {
            println!("\n{}\n", text);
        }
    }

    fn on_tool_start(&mut self, call: &ToolCall) {
        self.clear_spinner();
        self.note(format!("{}", format!("Executing tool: {}", call.name).dim()));
    }

    fn on_tool_result(&mut self, call: &ToolCall, outcome: &Result<ToolOutput, ToolError>) {
        match outcome {
            Ok(_) => self.note(format!("{}", format!("✓ Tool {} executed", call.name).green())),
            Err(e) => self.note(format!("{}", format!("✗ Tool {} failed: {}", call.name, e).red())),
        }
    }

    fn on_exchange_error(&mut self, error: &NetworkError) {
        self.clear_spinner();
        let message = describe_network_error(error, &self.base_url, &self.model);
        eprintln!("\n{} {}\n", "Error:".red().bold(), message);
    }
}
