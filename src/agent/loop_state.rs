//! Turn loop state management
//!
//! Tracks the controller's state machine and the turns taken in one run.

use serde::{Deserialize, Serialize};

/// Phase of the conversation controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Waiting for the selector to pick the next speaker
    AwaitingTurn,
    /// An agent call is in flight
    AgentRunning,
    /// The conversation ended; the last message is final
    Terminated,
    /// The run failed
    Failed,
}

/// State of one run attempt
#[derive(Debug, Clone)]
pub struct RunState {
    /// Current phase
    pub phase: RunPhase,
    /// Completed agent turns
    pub iteration: usize,
    /// Maximum allowed turns
    pub max_iterations: usize,
    /// Turns taken so far
    pub turns: Vec<TurnRecord>,
}

impl RunState {
    /// Create a new run state with the given budget
    pub fn new(max_iterations: usize) -> Self {
        Self {
            phase: RunPhase::AwaitingTurn,
            iteration: 0,
            max_iterations,
            turns: Vec::new(),
        }
    }

    /// Whether another turn fits in the budget
    pub fn has_budget(&self) -> bool {
        self.iteration < self.max_iterations
    }

    /// Move to `AgentRunning` for the named agent
    pub fn begin_turn(&mut self, agent: impl Into<String>) {
        self.phase = RunPhase::AgentRunning;
        self.turns.push(TurnRecord {
            iteration: self.iteration + 1,
            agent: agent.into(),
        });
    }

    /// Record a completed turn and go back to `AwaitingTurn`
    pub fn end_turn(&mut self) {
        self.iteration += 1;
        self.phase = RunPhase::AwaitingTurn;
    }

    /// Move to `Terminated`
    pub fn terminate(&mut self) {
        self.phase = RunPhase::Terminated;
    }

    /// Move to `Failed`
    pub fn fail(&mut self) {
        self.phase = RunPhase::Failed;
    }

    /// Check if the loop ended normally
    pub fn is_terminated(&self) -> bool {
        self.phase == RunPhase::Terminated
    }

    /// Agent names in turn order
    pub fn path(&self) -> Vec<String> {
        self.turns.iter().map(|t| t.agent.clone()).collect()
    }
}

/// One agent turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// 1-based turn number
    pub iteration: usize,
    /// Agent that spoke
    pub agent: String,
}
