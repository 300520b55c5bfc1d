//! Triage - Multi-Agent Customer Support
//!
//! Routes a customer utterance through a small set of model-backed agents
//! (intent triage, routing, order actions) and returns one consolidated
//! answer.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: LLM provider abstraction with Ollama implementation
//! - **Tools**: Order plugins and the plugin registry
//! - **Agent**: Roster, turn selection, retry, and the conversation controller
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use triage::agent::Orchestrator;
//! use triage::core::Config;
//! use triage::llm::OllamaClient;
//!
//! #[tokio::main]
//! async fn main() -> triage::Result<()> {
//!     let config = Config::load();
//!     let llm = Arc::new(OllamaClient::from_config(&config)?);
//!     let orchestrator = Orchestrator::from_config(&config, llm)?;
//!
//!     let result = orchestrator.run("What's the status of order 12345?").await;
//!     println!("{}", serde_json::to_string(&result)?);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{Agent, AgentRoster, Orchestrator};
pub use cli::Repl;
pub use core::{Config, Result, RunResult, TriageError};
