//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::cli::repl::Session;
use crate::core::Result;

/// Result of parsing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Not a command; run it as a customer utterance
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
}

/// Parse and handle special commands
pub async fn handle_command(input: &str, session: &Session) -> Result<CommandResult> {
    let input = input.trim();
    let cmd = input
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase();

    match cmd.as_str() {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "agents" => Ok(CommandResult::Handled(agents_text(session))),

        "status" => Ok(CommandResult::Handled(status_text(session))),

        "models" => {
            let models = session.llm.list_models().await?;
            let output = format!(
                "Available models ({}):\n{}",
                session.llm.name(),
                models
                    .iter()
                    .map(|m| format!("  - {}", m))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
            Ok(CommandResult::Handled(output))
        }

        _ => {
            if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

fn agents_text(session: &Session) -> String {
    let roster = session.orchestrator.roster();
    let mut output = String::from("Agents:\n");

    for agent in roster.agents() {
        let role = if agent.name() == roster.entry_name() {
            " [entry]"
        } else if agent.name() == roster.routing_name() {
            " [routing]"
        } else {
            ""
        };
        output.push_str(&format!(
            "  {}{} ({})\n",
            agent.name(),
            role,
            agent.model().unwrap_or("-")
        ));
        if !agent.description().is_empty() {
            output.push_str(&format!("    {}\n", agent.description()));
        }
    }

    output.trim_end().to_string()
}

fn status_text(session: &Session) -> String {
    let orchestrator = &session.orchestrator;
    let retry = orchestrator.retry_policy();
    let last_run = match session.last_run {
        Some(ref report) => format!(
            "{} ({} attempt(s))",
            report.path.join(" -> "),
            report.run_attempts
        ),
        None => "none".to_string(),
    };

    format!(
        "Triage Status:\n\
         ─────────────────────────────\n\
         Ollama:         {}\n\
         Default model:  {}\n\
         Max turns:      {}\n\
         Run attempts:   {}\n\
         Call attempts:  {}\n\
         Call timeout:   {}s\n\
         Last run:       {}",
        session.config.ollama_url(),
        session.config.models.default,
        orchestrator.max_iterations(),
        orchestrator.max_run_retries(),
        retry.max_attempts,
        retry.timeout.as_secs(),
        last_run
    )
}

/// Generate help text
fn help_text() -> String {
    r#"Triage Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit Triage
  agents           List the agent roster
  status           Show budgets and the last run's path
  models           List available Ollama models

Anything else is sent to the agents as a customer message.

Keyboard Shortcuts:
  Ctrl+D           Exit Triage
─────────────────────────────────────────────"#
        .to_string()
}
