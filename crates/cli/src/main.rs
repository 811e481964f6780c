//! skydoc CLI
//!
//! Command-line front end for the skydoc agent: one-shot questions with an
//! optional document, and an interactive chat session.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand};
use skydoc_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// skydoc - weather and document question answering
#[derive(Parser, Debug)]
#[command(name = "skydoc")]
#[command(about = "Answer weather questions and questions about your documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "SKYDOC_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (ollama, openai)
    #[arg(short, long, global = true, env = "SKYDOC_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "SKYDOC_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question
    Ask(AskCommand),

    /// Start an interactive chat session
    Chat(ChatCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // The config file flag must be visible before the config is loaded
    if let Some(ref config_path) = cli.config {
        std::env::set_var("SKYDOC_CONFIG", config_path);
    }

    let config = AppConfig::load()?.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );
    config.validate()?;

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::debug!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        "skydoc starting"
    );

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
    };

    if let Err(ref e) = result {
        tracing::error!("Command failed: {}", e);
    }

    result
}
