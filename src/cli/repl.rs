// Interactive and one-shot front-ends
//
// Wires settings, the Ollama client, the tool executor and the permission
// gate into a `ConversationLoop`, then feeds it from readline or from a
// single query.

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use super::commands::{format_help, Command};
use super::console::{spinner, ConsoleObserver, ConsolePrompter};
use super::conversation::ConversationHistory;
use super::conversation_loop::{ConversationLoop, LoopObserver, LoopState};
use super::input::InputHandler;
use crate::config::{ConfigStore, Settings};
use crate::errors::describe_network_error;
use crate::ollama::{ChatMessage, ChatModel, OllamaClient};
use crate::tools::{
    IgnoreRuleset, PermissionGate, ToolContext, ToolExecutor, ToolPromptFormatter, ToolRegistry,
};

/// File written by `/init`
pub const GUIDE_FILE: &str = "OLLAMA_CODE.md";

/// Upper bound on paths sent to the model by `/init`
const INIT_LISTING_LIMIT: usize = 200;
const INIT_LISTING_DEPTH: usize = 4;

const PROMPT: &str = "ollama> ";

pub struct Repl {
    conversation_loop: ConversationLoop,
    history: ConversationHistory,
    base_url: String,
    input_history: PathBuf,
    exchanges: usize,
}

impl Repl {
    pub fn new(
        conversation_loop: ConversationLoop,
        base_url: impl Into<String>,
        input_history: PathBuf,
    ) -> Self {
        Self {
            conversation_loop,
            history: ConversationHistory::new(),
            base_url: base_url.into(),
            input_history,
            exchanges: 0,
        }
    }

    /// Assemble a session for `working_dir` from the merged settings
    pub fn from_settings(
        settings: &Settings,
        config: ConfigStore,
        working_dir: PathBuf,
        print_mode: bool,
    ) -> Result<Self> {
        let client = OllamaClient::from_settings(settings).context("Failed to create Ollama client")?;
        let model: Arc<dyn ChatModel> = Arc::new(client);

        let registry = ToolRegistry::new();
        let context = ToolContext::new(
            working_dir,
            IgnoreRuleset::new(settings.ignore_patterns.iter()),
        );
        let system_prompt = ToolPromptFormatter::system_prompt(&registry, context.working_dir());
        let executor = ToolExecutor::new(registry, context);
        let input_history = config.history_path();
        let gate = PermissionGate::new(config, Box::new(ConsolePrompter::stdio()));
        let observer: Box<dyn LoopObserver> = Box::new(ConsoleObserver::new(
            print_mode,
            &settings.ollama_base_url,
            &settings.ollama_model,
        ));

        Ok(Self::new(
            ConversationLoop::new(model, executor, gate, system_prompt, observer),
            &settings.ollama_base_url,
            input_history,
        ))
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Answer one query and return; used for `--print` and piped input
    pub async fn run_print(mut self, query: &str) -> Result<()> {
        let model = self.conversation_loop.model().model_name().to_string();
        self.conversation_loop
            .submit(&mut self.history, query)
            .await
            .map_err(|e| anyhow::anyhow!(describe_network_error(&e, &self.base_url, &model)))
    }

    /// Read-eval-print loop until `/exit`, Ctrl+C or Ctrl+D
    pub async fn run_interactive(mut self, initial_query: Option<String>) -> Result<()> {
        println!("{}", "Ollama Code".bold().blue());
        println!(
            "{}",
            format!(
                "Model: {} | {}",
                self.conversation_loop.model().model_name(),
                self.conversation_loop.executor().context().working_dir().display()
            )
            .dim()
        );
        println!("{}\n", "Type /help for commands, /exit to quit".dim());

        let mut input = InputHandler::open(self.input_history.clone())?;

        if let Some(query) = initial_query {
            self.process_query(&query).await;
        }

        while self.conversation_loop.state() != LoopState::Exited {
            let line = match input.read_line(PROMPT) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Input error: {:#}", e);
                    break;
                }
            };

            if line.is_empty() {
                continue;
            }

            match Command::parse(&line) {
                Some(command) => self.handle_command(command).await?,
                None => self.process_query(&line).await,
            }
        }

        if let Err(e) = input.save_history() {
            tracing::warn!("Failed to save history: {:#}", e);
        }
        self.print_session_stats();
        Ok(())
    }

    async fn process_query(&mut self, query: &str) {
        // Failures are already reported by the observer
        if self.conversation_loop.submit(&mut self.history, query).await.is_ok() {
            self.exchanges += 1;
        }
    }

    async fn handle_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Help => println!("\n{}\n", format_help()),
            Command::Clear => {
                self.history.clear();
                println!("{}", "Conversation history cleared".green());
            }
            Command::Compact => {
                let removed = self.history.compact();
                tracing::debug!(removed, "Compacted conversation");
                println!("{}", "Conversation compacted".green());
            }
            Command::Cost => {
                let estimate = self.history.token_estimate();
                println!("\n{}", "Estimated token usage:".bold());
                println!("  Input tokens:  ~{}", estimate.input);
                println!("  Output tokens: ~{}", estimate.output);
                println!("  Total tokens:  ~{}\n", estimate.total());
            }
            Command::Init => self.init_guide().await,
            Command::Models => self.list_models().await,
            Command::Exit => self.conversation_loop.exit(),
            Command::Unknown(name) => {
                println!("{}", format!("Unknown command: /{}", name).yellow());
                println!("{}", "Type /help to see available commands".dim());
            }
        }
        Ok(())
    }

    async fn init_guide(&mut self) {
        let context = self.conversation_loop.executor().context().clone();
        let progress = spinner(&format!("Generating {} guide...", GUIDE_FILE));

        let listing = project_listing(&context, INIT_LISTING_LIMIT);
        let messages = vec![
            ChatMessage::system(
                "You are an expert in code analysis. Create a detailed markdown guide for this project.",
            ),
            ChatMessage::user(format!(
                "Analyze the project below and write a {} guide that explains the project \
                 structure, main components, and provides guidance for contributors.\n\n\
                 Files:\n{}",
                GUIDE_FILE,
                listing.join("\n")
            )),
        ];

        let model = self.conversation_loop.model().clone();
        let guide = match model.chat_completion(&messages, None).await {
            Ok(guide) => guide,
            Err(e) => {
                progress.finish_and_clear();
                let message = describe_network_error(&e, &self.base_url, model.model_name());
                eprintln!("{} {}", "Failed to generate guide:".red(), message);
                return;
            }
        };

        let path = context.working_dir().join(GUIDE_FILE);
        progress.finish_and_clear();
        match std::fs::write(&path, guide) {
            Ok(()) => println!("{}", format!("✓ Generated {}", GUIDE_FILE).green()),
            Err(e) => eprintln!("{} {}: {}", "Failed to write".red(), path.display(), e),
        }
    }

    async fn list_models(&self) {
        let model = self.conversation_loop.model();
        let progress = spinner("Fetching available models...");
        let result = model.list_models().await;
        progress.finish_and_clear();

        match result {
            Ok(models) if models.is_empty() => {
                println!("{}", "No models found. Make sure Ollama is running.".yellow());
                println!(
                    "{}",
                    format!("You can download models with: ollama pull {}", model.model_name()).dim()
                );
            }
            Ok(models) => {
                println!("\n{}", "Available models:".bold());
                for info in models {
                    println!("- {} ({})", info.name.as_str().blue(), info.human_size());
                }
                println!();
            }
            Err(e) => {
                let message = describe_network_error(&e, &self.base_url, model.model_name());
                eprintln!("{} {}", "Failed to fetch models:".red(), message);
            }
        }
    }

    fn print_session_stats(&self) {
        let estimate = self.history.token_estimate();
        println!("\n{}\n", "Goodbye! Thanks for using Ollama Code.".blue());
        println!(
            "{}",
            format!(
                "Session stats:\n- Messages: {} exchanges\n- Input tokens (estimate): {}\n- Output tokens (estimate): {}\n",
                self.exchanges, estimate.input, estimate.output
            )
            .dim()
        );
    }
}

/// Sorted relative paths under the working directory, skipping hidden and
/// ignored entries, at most `limit` long
pub fn project_listing(context: &ToolContext, limit: usize) -> Vec<String> {
    let root = context.working_dir();
    WalkDir::new(root)
        .max_depth(INIT_LISTING_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.path() == root || is_listed(context, entry.path()))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path() != root)
        .take(limit)
        .map(|entry| {
            let relative = context.relative(entry.path());
            if entry.file_type().is_dir() {
                format!("{}/", relative)
            } else {
                relative
            }
        })
        .collect()
}

fn is_listed(context: &ToolContext, path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'));
    !hidden && context.check_ignored(path).is_ok()
}
