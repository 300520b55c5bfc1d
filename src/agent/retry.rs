//! Per-call retry with exponential backoff
//!
//! Every agent call is time-boxed. Failures, including timeouts, are
//! retried until the attempt budget runs out, except errors no retry can fix.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::agent::roster::Agent;
use crate::core::config::OrchestrationConfig;
use crate::core::{Message, Result, TriageError};

/// Upper bound on a single backoff delay
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Retry settings for one agent call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay after the first failure; doubles per attempt
    pub base_delay: Duration,
    /// Cap on any single delay
    pub max_delay: Duration,
    /// Time box for one attempt
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: MAX_BACKOFF,
            timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &OrchestrationConfig) -> Self {
        Self {
            max_attempts: config.max_agent_retries.max(1),
            base_delay: config.retry_base_delay(),
            max_delay: MAX_BACKOFF,
            timeout: config.agent_timeout(),
        }
    }

    /// Backoff after failed attempt `attempt` (1-based), with up to 25% jitter
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let base = self
            .base_delay
            .saturating_mul(2u32.pow(exp))
            .min(self.max_delay);

        let jitter_ms = (base.as_millis() / 4) as u64;
        if jitter_ms == 0 {
            return base;
        }
        let jitter = rand::rng().random_range(0..=jitter_ms);
        (base + Duration::from_millis(jitter)).min(self.max_delay)
    }
}

/// Call `agent` with bounded retries
///
/// The returned message is attributed to the agent. After the last failed
/// attempt the error is wrapped in [`TriageError::AgentInvocation`]. A
/// permanent error (see [`TriageError::is_permanent`]) is returned at once.
pub async fn invoke_with_retry(
    agent: &dyn Agent,
    history: &[Message],
    policy: &RetryPolicy,
) -> Result<Message> {
    let attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        debug!(agent = agent.name(), attempt, attempts, "invoking agent");

        let outcome = match tokio::time::timeout(policy.timeout, agent.send(history)).await {
            Ok(result) => result,
            Err(_) => Err(TriageError::Timeout {
                agent: agent.name().to_string(),
                secs: policy.timeout.as_secs(),
            }),
        };

        match outcome {
            Ok(message) => return Ok(Message::agent(agent.name(), message.content)),
            Err(e) if e.is_permanent() => {
                warn!(
                    agent = agent.name(),
                    attempt,
                    error = %e,
                    "agent call cannot succeed, not retrying"
                );
                return Err(e);
            }
            Err(e) => {
                warn!(
                    agent = agent.name(),
                    attempt,
                    attempts,
                    error = %e,
                    "agent call failed"
                );
                last_error = Some(e);
            }
        }

        if attempt < attempts {
            let delay = policy.delay_for(attempt);
            debug!(agent = agent.name(), ?delay, "backing off before retry");
            tokio::time::sleep(delay).await;
        }
    }

    Err(TriageError::AgentInvocation {
        agent: agent.name().to_string(),
        attempts,
        source: Box::new(
            last_error.unwrap_or_else(|| TriageError::Other("no attempt was made".into())),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::scripted::ScriptedAgent;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_delay_grows_and_is_capped() {
        let p = policy(5);
        let first = p.delay_for(1);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(125));
        let third = p.delay_for(3);
        assert!(third >= Duration::from_millis(400) && third <= Duration::from_millis(500));
        assert!(p.delay_for(30) <= Duration::from_secs(5));
    }

    #[test]
    fn test_from_config() {
        let config = OrchestrationConfig::default();
        let p = RetryPolicy::from_config(&config);
        assert_eq!(p.max_attempts, config.max_agent_retries);
        assert_eq!(p.timeout, config.agent_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_failures_then_success() {
        let agent = ScriptedAgent::new("TriageAgent")
            .fail("503")
            .fail("503")
            .reply(r#"{"type": "cqa_result"}"#);

        let message = invoke_with_retry(&agent, &[Message::user("hi")], &policy(3))
            .await
            .unwrap();
        assert!(message.is_from("TriageAgent"));
        assert_eq!(agent.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_carries_last_error() {
        let agent = ScriptedAgent::new("TriageAgent")
            .fail("first")
            .fail("second")
            .fail("third");

        let err = invoke_with_retry(&agent, &[], &policy(3)).await.unwrap_err();
        match err {
            TriageError::AgentInvocation {
                agent: name,
                attempts,
                source,
            } => {
                assert_eq!(name, "TriageAgent");
                assert_eq!(attempts, 3);
                assert_eq!(source.to_string(), "third");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(agent.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_retried() {
        let agent = ScriptedAgent::new("TriageAgent")
            .delayed(Duration::from_secs(10), "{}")
            .reply(r#"{"terminated": "True"}"#);

        let message = invoke_with_retry(&agent, &[], &policy(2)).await.unwrap();
        assert_eq!(message.content, r#"{"terminated": "True"}"#);
        assert_eq!(agent.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_exhaustion() {
        let agent = ScriptedAgent::new("Slow").delayed(Duration::from_secs(10), "{}");

        let err = invoke_with_retry(&agent, &[], &policy(1)).await.unwrap_err();
        let TriageError::AgentInvocation { source, .. } = err else {
            panic!("expected AgentInvocation");
        };
        assert!(matches!(*source, TriageError::Timeout { secs: 2, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_model_is_not_retried() {
        let agent = ScriptedAgent::new("TriageAgent")
            .fail_with(|| TriageError::ModelNotFound("qwen3:8b".into()))
            .reply("{}");

        let err = invoke_with_retry(&agent, &[], &policy(3)).await.unwrap_err();
        assert!(matches!(err, TriageError::ModelNotFound(ref m) if m == "qwen3:8b"));
        assert_eq!(agent.calls(), 1);
    }

    #[test]
    fn test_single_attempt_blocking() {
        let agent = ScriptedAgent::new("A").reply("{}");
        let message =
            tokio_test::block_on(invoke_with_retry(&agent, &[], &policy(1))).unwrap();
        assert_eq!(message.content, "{}");
    }
}
