//! Agent module - multi-agent conversation control
//!
//! Contains the agent capability, the roster, the pure turn-selection and
//! termination strategies, per-call retry, answer extraction, and the
//! controller that ties them together.

pub mod conversation;
pub mod extract;
pub mod llm_agent;
pub mod loop_state;
pub mod orchestrator;
pub mod retry;
pub mod roster;
pub mod scripted;
pub mod selection;
pub mod termination;

pub use conversation::ConversationHistory;
pub use extract::extract_answer;
pub use llm_agent::{LlmAgent, LlmAgentBuilder};
pub use loop_state::{RunPhase, RunState, TurnRecord};
pub use orchestrator::{Orchestrator, RunReport};
pub use retry::{invoke_with_retry, RetryPolicy};
pub use roster::{Agent, AgentRef, AgentRoster};
pub use scripted::{ScriptStep, ScriptedAgent};
pub use selection::select;
pub use termination::should_terminate;
