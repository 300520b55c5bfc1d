//! Custom error types for Triage
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Triage operations
#[derive(Error, Debug)]
pub enum TriageError {
    /// Agent content is not the expected structured JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// No roster agent matches the requested route
    #[error("Routing error: {0}")]
    Routing(String),

    /// Remote agent call failed after all per-call retries
    #[error("Agent '{agent}' failed after {attempts} attempt(s): {source}")]
    AgentInvocation {
        agent: String,
        attempts: u32,
        #[source]
        source: Box<TriageError>,
    },

    /// Turn loop ran out of iterations without terminating
    #[error("Conversation did not terminate within {0} iterations")]
    IterationBudgetExceeded(usize),

    /// Outer whole-run retry tier exhausted
    #[error("Conversation failed after {attempts} run attempt(s): {last}")]
    RunRetryExhausted {
        attempts: u32,
        #[source]
        last: Box<TriageError>,
    },

    /// Terminal payload carries a discriminator the extractor does not know
    #[error("Unexpected discriminator: {0}")]
    UnexpectedDiscriminator(String),

    /// A single agent call exceeded its time box
    #[error("Agent '{agent}' timed out after {secs}s")]
    Timeout { agent: String, secs: u64 },

    /// Ollama connection or API errors
    #[error("Ollama error: {0}")]
    Ollama(String),

    /// Model not available
    #[error("Model '{0}' not available in Ollama. Run: ollama pull {0}")]
    ModelNotFound(String),

    /// Plugin execution errors
    #[error("Plugin error: {0}")]
    Plugin(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Triage operations
pub type Result<T> = std::result::Result<T, TriageError>;

impl TriageError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a routing error
    pub fn routing(msg: impl Into<String>) -> Self {
        Self::Routing(msg.into())
    }

    /// Create an Ollama error
    pub fn ollama(msg: impl Into<String>) -> Self {
        Self::Ollama(msg.into())
    }

    /// Create a plugin error
    pub fn plugin(msg: impl Into<String>) -> Self {
        Self::Plugin(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::Routing(_) => "routing",
            Self::AgentInvocation { .. } => "agent_invocation",
            Self::IterationBudgetExceeded(_) => "iteration_budget_exceeded",
            Self::RunRetryExhausted { .. } => "run_retry_exhausted",
            Self::UnexpectedDiscriminator(_) => "unexpected_discriminator",
            Self::Timeout { .. } => "timeout",
            Self::Ollama(_) => "ollama",
            Self::ModelNotFound(_) => "model_not_found",
            Self::Plugin(_) => "plugin",
            Self::Config(_) => "config",
            Self::Json(_) => "json",
            Self::Http(_) => "http",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }

    /// Whether retrying the same call can never succeed
    ///
    /// A missing model or a configuration mistake does not heal on retry.
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::Config(_) | Self::ModelNotFound(_) => true,
            Self::AgentInvocation { source, .. } => source.is_permanent(),
            _ => false,
        }
    }

    /// Whether the conversation controller should restart the whole run
    ///
    /// A run that exhausted its iteration budget or ended on a payload with an
    /// unknown discriminator is returned as-is, as is any permanent error,
    /// including one wrapped by a failed agent invocation.
    pub fn is_run_retryable(&self) -> bool {
        if self.is_permanent() {
            return false;
        }
        !matches!(
            self,
            Self::IterationBudgetExceeded(_)
                | Self::UnexpectedDiscriminator(_)
                | Self::RunRetryExhausted { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_invocation_display_carries_cause() {
        let err = TriageError::AgentInvocation {
            agent: "TriageAgent".into(),
            attempts: 3,
            source: Box::new(TriageError::ollama("connection refused")),
        };
        let text = err.to_string();
        assert!(text.contains("TriageAgent"));
        assert!(text.contains("3 attempt"));
        assert!(text.contains("connection refused"));
        assert_eq!(err.kind(), "agent_invocation");
    }

    #[test]
    fn test_run_retryable_classification() {
        assert!(TriageError::parse("bad").is_run_retryable());
        assert!(TriageError::routing("nowhere").is_run_retryable());
        assert!(!TriageError::IterationBudgetExceeded(10).is_run_retryable());
        assert!(!TriageError::UnexpectedDiscriminator("x".into()).is_run_retryable());
    }

    #[test]
    fn test_wrapped_missing_model_is_not_retryable() {
        let wrapped = TriageError::AgentInvocation {
            agent: "TriageAgent".into(),
            attempts: 1,
            source: Box::new(TriageError::ModelNotFound("qwen3:8b".into())),
        };
        assert!(wrapped.is_permanent());
        assert!(!wrapped.is_run_retryable());

        let transient = TriageError::AgentInvocation {
            agent: "TriageAgent".into(),
            attempts: 3,
            source: Box::new(TriageError::ollama("connection refused")),
        };
        assert!(!transient.is_permanent());
        assert!(transient.is_run_retryable());
    }
}
