//! Deterministic in-process agent
//!
//! Replays a fixed queue of replies and failures. Used to drive the
//! controller without a model server.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::agent::roster::Agent;
use crate::core::{Message, Result, TriageError};

/// One scripted reaction to a `send`
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Return this content
    Reply(String),
    /// Fail with this message
    Fail(String),
    /// Fail with the error this builds
    Error(fn() -> TriageError),
    /// Sleep, then return this content
    Delay(Duration, String),
}

/// Agent that follows a script
pub struct ScriptedAgent {
    name: String,
    steps: Mutex<VecDeque<ScriptStep>>,
    fallback: Option<String>,
    calls: AtomicUsize,
    received: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Mutex::new(VecDeque::new()),
            fallback: None,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply
    pub fn reply(self, content: impl Into<String>) -> Self {
        self.push(ScriptStep::Reply(content.into()))
    }

    /// Queue a failure
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(ScriptStep::Fail(message.into()))
    }

    /// Queue a specific error
    pub fn fail_with(self, error: fn() -> TriageError) -> Self {
        self.push(ScriptStep::Error(error))
    }

    /// Queue a reply that arrives after `delay`
    pub fn delayed(self, delay: Duration, content: impl Into<String>) -> Self {
        self.push(ScriptStep::Delay(delay, content.into()))
    }

    /// Reply with `content` once the queue is empty
    pub fn repeating(mut self, content: impl Into<String>) -> Self {
        self.fallback = Some(content.into());
        self
    }

    /// Number of `send` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Histories passed to each `send`, in call order
    pub fn received(&self) -> Vec<Vec<Message>> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn push(self, step: ScriptStep) -> Self {
        self.steps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(step);
        self
    }

    fn next_step(&self) -> Option<ScriptStep> {
        let step = self
            .steps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        step.or_else(|| self.fallback.clone().map(ScriptStep::Reply))
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "scripted"
    }

    async fn send(&self, history: &[Message]) -> Result<Message> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(history.to_vec());

        match self.next_step() {
            Some(ScriptStep::Reply(content)) => Ok(Message::agent(&self.name, content)),
            Some(ScriptStep::Fail(message)) => Err(TriageError::Other(message)),
            Some(ScriptStep::Error(build)) => Err(build()),
            Some(ScriptStep::Delay(delay, content)) => {
                tokio::time::sleep(delay).await;
                Ok(Message::agent(&self.name, content))
            }
            None => Err(TriageError::Other(format!(
                "script for '{}' is exhausted",
                self.name
            ))),
        }
    }
}
