//! Triage - Multi-Agent Customer Support
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use triage::agent::Orchestrator;
use triage::llm::{LLMProvider, OllamaClient};
use triage::cli::single_shot;
use triage::{Config, Repl};

/// Triage - Multi-Agent Customer Support
#[derive(Parser, Debug)]
#[command(name = "triage")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model for every agent without its own override
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Config file (default: ~/.config/triage/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Turn budget per run
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// Single utterance mode (non-interactive); prints the result as JSON
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Write the effective config to the default location and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) => Config::load_from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load(),
    };

    // Set up logging: RUST_LOG wins, then --debug, then the config file
    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) => EnvFilter::new(filter),
        Err(_) if args.debug => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new(&config.logging.level),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(ref model) = args.model {
        config.models.default = model.clone();
    }

    if let Some(max_iterations) = args.max_iterations {
        config.orchestration.max_iterations = max_iterations;
    }

    config.validate()?;

    if args.init_config {
        let path = config.save()?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let llm: Arc<dyn LLMProvider> = Arc::new(OllamaClient::from_config(&config)?);

    // Single utterance mode
    if let Some(prompt) = args.prompt {
        let orchestrator = Orchestrator::from_config(&config, llm.clone())?;
        let result = single_shot(&orchestrator, llm.as_ref(), &prompt).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(config, llm)?;
    repl.run().await?;

    Ok(())
}
