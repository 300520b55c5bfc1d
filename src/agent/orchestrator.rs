//! Conversation controller
//!
//! Drives the turn loop for one customer utterance:
//! select the next speaker, invoke it through the retry wrapper, append its
//! message, check for termination, and repeat within the iteration budget.
//! A failed run is restarted from a fresh history up to the outer bound.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::agent::conversation::ConversationHistory;
use crate::agent::extract::extract_answer;
use crate::agent::loop_state::RunState;
use crate::agent::retry::{invoke_with_retry, RetryPolicy};
use crate::agent::roster::AgentRoster;
use crate::agent::selection::select;
use crate::agent::termination::should_terminate;
use crate::core::config::OrchestrationConfig;
use crate::core::{Answer, Config, Result, RunResult, TriageError};
use crate::llm::LLMProvider;
use crate::tools::PluginRegistry;

/// Outcome of a run together with how it got there
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Answer or failure handed to the caller
    pub result: RunResult,
    /// Agents that spoke in the final attempt, in order
    pub path: Vec<String>,
    /// Whole-run attempts used
    pub run_attempts: u32,
}

/// Multi-agent conversation controller
///
/// Holds only read-only state, so one instance can serve concurrent runs.
pub struct Orchestrator {
    roster: Arc<AgentRoster>,
    max_iterations: usize,
    max_run_retries: u32,
    retry: RetryPolicy,
}

impl Orchestrator {
    /// Create a controller over an existing roster
    pub fn new(roster: Arc<AgentRoster>, config: &OrchestrationConfig) -> Self {
        Self {
            roster,
            max_iterations: config.max_iterations,
            max_run_retries: config.max_run_retries.max(1),
            retry: RetryPolicy::from_config(config),
        }
    }

    /// Build the configured model-backed roster and a controller over it
    pub fn from_config(config: &Config, llm: Arc<dyn LLMProvider>) -> Result<Self> {
        let roster = AgentRoster::from_config(config, llm, &PluginRegistry::new())?;
        Ok(Self::new(Arc::new(roster), &config.orchestration))
    }

    /// Check that every model the roster needs is available
    pub async fn initialize(&self, llm: &dyn LLMProvider) -> Result<()> {
        let available = llm.list_models().await?;
        debug!(provider = llm.name(), models = ?available, "available models");

        for model in self.roster.models() {
            if !llm.is_model_available(model).await? {
                return Err(TriageError::ModelNotFound(model.to_string()));
            }
        }

        info!(agents = self.roster.len(), "roster initialized");
        Ok(())
    }

    /// Run one utterance to completion
    pub async fn run(&self, utterance: &str) -> RunResult {
        self.run_with_report(utterance).await.result
    }

    /// Run one utterance, also reporting the path taken
    pub async fn run_with_report(&self, utterance: &str) -> RunReport {
        let mut last_failure: Option<(TriageError, Vec<String>)> = None;

        for attempt in 1..=self.max_run_retries {
            let mut state = RunState::new(self.max_iterations);
            info!(attempt, max = self.max_run_retries, "starting conversation run");

            match self.run_once(utterance, &mut state).await {
                Ok(answer) => {
                    info!(attempt, path = ?state.path(), "conversation terminated");
                    return RunReport {
                        result: RunResult::Answer(answer),
                        path: state.path(),
                        run_attempts: attempt,
                    };
                }
                Err(e) if !e.is_run_retryable() => {
                    error!(attempt, error = %e, "conversation failed");
                    return RunReport {
                        result: RunResult::failed(&e),
                        path: state.path(),
                        run_attempts: attempt,
                    };
                }
                Err(e) => {
                    warn!(attempt, error = %e, "run failed, discarding history");
                    last_failure = Some((e, state.path()));
                }
            }
        }

        let (last, path) = last_failure.unwrap_or_else(|| {
            (TriageError::Other("no run attempt was made".into()), Vec::new())
        });
        let err = TriageError::RunRetryExhausted {
            attempts: self.max_run_retries,
            last: Box::new(last),
        };
        error!(error = %err, "giving up on conversation");

        RunReport {
            result: RunResult::failed(&err),
            path,
            run_attempts: self.max_run_retries,
        }
    }

    /// One attempt from a fresh history
    async fn run_once(&self, utterance: &str, state: &mut RunState) -> Result<Answer> {
        let mut history = ConversationHistory::new(utterance);

        loop {
            let Some(agent) = select(&self.roster, history.messages()) else {
                debug!(turns = state.iteration, "no next speaker");
                state.terminate();
                break;
            };

            if !state.has_budget() {
                state.fail();
                return Err(TriageError::IterationBudgetExceeded(state.max_iterations));
            }

            state.begin_turn(agent.name());
            let message =
                match invoke_with_retry(agent.as_ref(), history.messages(), &self.retry).await {
                    Ok(message) => message,
                    Err(e) => {
                        state.fail();
                        return Err(e);
                    }
                };

            history.append(message);
            state.end_turn();

            if should_terminate(history.messages()) {
                debug!(agent = agent.name(), turns = state.iteration, "termination flag set");
                state.terminate();
                break;
            }
        }

        let last = history
            .last()
            .ok_or_else(|| TriageError::Other("conversation history is empty".into()))?;
        extract_answer(last).inspect_err(|_| state.fail())
    }

    /// The roster this controller selects from
    pub fn roster(&self) -> &AgentRoster {
        &self.roster
    }

    /// Turn budget per run
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Whole-run attempt bound
    pub fn max_run_retries(&self) -> u32 {
        self.max_run_retries
    }

    /// Per-call retry settings
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }
}
