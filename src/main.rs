// Ollama Code - terminal coding assistant for local Ollama models
// Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, IsTerminal, Read};

use ollama_code::cli::Repl;
use ollama_code::config::{parse_value, ConfigStore, Scope};
use ollama_code::errors::config_parse_error;

#[derive(Parser, Debug)]
#[command(name = "ollama-code")]
#[command(about = "Terminal coding assistant for locally hosted Ollama models", version)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Query to send; starts an interactive session when omitted
    query: Option<String>,

    /// Print the response and exit instead of starting a session
    #[arg(short, long)]
    print: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show how to update ollama-code
    Update,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print a configuration value
    Get {
        key: String,
        /// Read the global configuration only
        #[arg(short, long)]
        global: bool,
    },
    /// Set a configuration value (parsed as JSON when possible)
    Set {
        key: String,
        value: String,
        /// Write to the global configuration
        #[arg(short, long)]
        global: bool,
    },
    /// Print all configuration values
    List {
        /// Read the global configuration only
        #[arg(short, long)]
        global: bool,
    },
}

fn scope(global: bool) -> Scope {
    if global {
        Scope::Global
    } else {
        Scope::Project
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let working_dir = std::env::current_dir().context("Failed to determine working directory")?;
    let config = ConfigStore::new(&working_dir)?;

    match args.command {
        Some(Command::Config { action }) => {
            init_tracing(args.verbose);
            return run_config(&config, action);
        }
        Some(Command::Update) => {
            println!("To update ollama-code, run:\n  cargo install ollama-code --force");
            return Ok(());
        }
        None => {}
    }

    let settings = config
        .settings()
        .map_err(|e| anyhow::anyhow!(config_parse_error(&format!("{:#}", e))))?;
    init_tracing(args.verbose || settings.verbose);
    tracing::debug!(model = %settings.ollama_model, url = %settings.ollama_base_url, "Starting");

    ctrlc::set_handler(|| {
        println!("\nGoodbye!");
        std::process::exit(130);
    })
    .context("Failed to install Ctrl+C handler")?;

    // Piped stdin becomes the query
    let mut query = args.query;
    let mut print_mode = args.print;
    if query.is_none() && !io::stdin().is_terminal() {
        let mut piped = String::new();
        io::stdin()
            .read_to_string(&mut piped)
            .context("Failed to read query from stdin")?;
        if !piped.trim().is_empty() {
            query = Some(piped.trim().to_string());
            print_mode = true;
        }
    }

    let repl = Repl::from_settings(&settings, config, working_dir, print_mode)?;
    match (print_mode, query) {
        (true, Some(query)) => repl.run_print(&query).await,
        (true, None) => anyhow::bail!("--print requires a query"),
        (false, query) => repl.run_interactive(query).await,
    }
}

fn run_config(config: &ConfigStore, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key, global } => match config.get(&key, scope(global))? {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => println!("{} is not set", key),
        },
        ConfigAction::Set { key, value, global } => {
            let scope = scope(global);
            config.set(&key, parse_value(&value), scope)?;
            println!("Set {} in {}", key, config.path(scope).display());
        }
        ConfigAction::List { global } => {
            let values = config.list(scope(global))?;
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
    }
    Ok(())
}

/// Log to stderr; RUST_LOG overrides the verbosity flag
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "ollama_code=debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();

    // Bridge log crate → tracing (rustyline logs through `log`)
    tracing_log::LogTracer::init().ok();
}
