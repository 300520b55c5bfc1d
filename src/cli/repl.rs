//! Interactive REPL for Triage
//!
//! Reads customer messages and runs each one through the agents.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::agent::{Orchestrator, RunReport};
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result, RunResult};
use crate::llm::LLMProvider;

/// State shared by the REPL and its commands
pub struct Session {
    /// Configuration the session was started with
    pub config: Config,
    /// Model provider backing the roster
    pub llm: Arc<dyn LLMProvider>,
    /// Conversation controller
    pub orchestrator: Orchestrator,
    /// Report of the most recent run
    pub last_run: Option<RunReport>,
}

impl Session {
    pub fn new(config: Config, llm: Arc<dyn LLMProvider>, orchestrator: Orchestrator) -> Self {
        Self {
            config,
            llm,
            orchestrator,
            last_run: None,
        }
    }
}

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    session: Session,
}

impl Repl {
    /// Create a REPL over the configured roster
    pub fn with_config(config: Config, llm: Arc<dyn LLMProvider>) -> Result<Self> {
        let orchestrator = Orchestrator::from_config(&config, llm.clone())?;
        Ok(Self {
            session: Session::new(config, llm, orchestrator),
        })
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        print!("Initializing...");
        io::stdout().flush()?;

        match self
            .session
            .orchestrator
            .initialize(self.session.llm.as_ref())
            .await
        {
            Ok(()) => println!(" Ready!\n"),
            Err(e) => {
                println!("\n\nInitialization Error: {}\n", e);
                return Ok(());
            }
        }

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("Customer: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            match handle_command(input, &self.session).await {
                Ok(CommandResult::Exit) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(CommandResult::Handled(output)) => {
                    println!("{}\n", output);
                }
                Ok(CommandResult::Continue(utterance)) => {
                    let report = self.session.orchestrator.run_with_report(&utterance).await;
                    match report.result {
                        RunResult::Answer(ref answer) => println!("\nSupport:\n{}\n", answer),
                        RunResult::Failed(ref failure) => {
                            eprintln!("\nError ({}): {}\n", failure.kind, failure.error)
                        }
                    }
                    self.session.last_run = Some(report);
                }
                Err(e) => {
                    eprintln!("Command error: {}\n", e);
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = &self.session.config;
        let roster = self.session.orchestrator.roster();

        println!(
            r#"
╔═══════════════════════════════════════════╗
║                                           ║
║   TRIAGE                                  ║
║   Multi-Agent Customer Support            ║
║                                           ║
╚═══════════════════════════════════════════╝
"#
        );
        println!("Ollama:   {}", config.ollama_url());
        println!("Model:    {}", config.models.default);
        println!(
            "Agents:   {} (entry: {}, routing: {})",
            roster.len(),
            roster.entry_name(),
            roster.routing_name()
        );
        println!();
        println!("Commands: help, agents, status, models, exit");
        println!("───────────────────────────────────────────");
    }
}
