//! Model-backed agents
//!
//! An [`LlmAgent`] renders the conversation behind its system instructions
//! and asks a model for the next message. Leaf agents carry a plugin that the
//! model may call before it answers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::agent::roster::Agent;
use crate::core::{ChatMessage, Message, Result, Role, ToolCall, TriageError};
use crate::llm::{GenerateOptions, LLMProvider, LLMResponse};
use crate::tools::Plugin;

/// Plugin call rounds allowed before the agent must answer
const MAX_TOOL_ROUNDS: usize = 4;

/// An agent whose replies come from a language model
#[derive(Clone)]
pub struct LlmAgent {
    /// Name of this agent
    name: String,
    /// Short description
    description: String,
    /// System prompt defining the agent's role
    instructions: String,
    /// Model to use
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Model provider
    llm: Arc<dyn LLMProvider>,
    /// Capability the model may call
    plugin: Option<Arc<dyn Plugin>>,
}

/// Builder for creating LlmAgents
pub struct LlmAgentBuilder {
    name: String,
    description: String,
    instructions: Option<String>,
    model: Option<String>,
    temperature: f32,
    llm: Option<Arc<dyn LLMProvider>>,
    plugin: Option<Arc<dyn Plugin>>,
}

impl LlmAgentBuilder {
    /// Create a new builder with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            instructions: None,
            model: None,
            temperature: 0.1,
            llm: None,
            plugin: None,
        }
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the system instructions
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Set the model to use
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the model provider
    pub fn llm(mut self, llm: Arc<dyn LLMProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Bind a plugin
    pub fn plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugin = Some(plugin);
        self
    }

    /// Build the LlmAgent
    pub fn build(self) -> Result<LlmAgent> {
        let llm = self.llm.ok_or_else(|| {
            TriageError::config(format!("agent '{}' has no model provider", self.name))
        })?;
        let model = self
            .model
            .ok_or_else(|| TriageError::config(format!("agent '{}' has no model", self.name)))?;

        Ok(LlmAgent {
            instructions: self.instructions.unwrap_or_else(|| {
                format!(
                    "You are a customer support agent named '{}'. Reply with a JSON object.",
                    self.name
                )
            }),
            name: self.name,
            description: self.description,
            model,
            temperature: self.temperature,
            llm,
            plugin: self.plugin,
        })
    }
}

impl LlmAgent {
    /// Create a builder
    pub fn builder(name: impl Into<String>) -> LlmAgentBuilder {
        LlmAgentBuilder::new(name)
    }

    /// Render the history as chat messages from this agent's point of view
    fn render(&self, history: &[Message]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(&self.instructions));

        for message in history {
            match message.role {
                Role::User => messages.push(ChatMessage::user(&message.content)),
                Role::Agent if message.is_from(&self.name) => {
                    messages.push(ChatMessage::assistant(&message.content))
                }
                Role::Agent => messages.push(ChatMessage::user(format!(
                    "[{}]: {}",
                    message.name.as_deref().unwrap_or("agent"),
                    message.content
                ))),
            }
        }

        messages
    }

    fn options(&self, json: bool) -> Option<GenerateOptions> {
        Some(GenerateOptions {
            temperature: Some(self.temperature),
            json,
            ..Default::default()
        })
    }

    /// Ask the model, executing plugin calls until it answers
    async fn complete_with_plugin(
        &self,
        plugin: &dyn Plugin,
        mut messages: Vec<ChatMessage>,
    ) -> Result<LLMResponse> {
        let tools = [plugin.definition().clone()];

        for round in 0..MAX_TOOL_ROUNDS {
            let response = self
                .llm
                .chat_with_tools(&self.model, &messages, &tools, self.options(false))
                .await?;

            if response.tool_calls.is_empty() {
                return Ok(response);
            }

            debug!(
                agent = %self.name,
                round,
                calls = response.tool_calls.len(),
                "model requested plugin calls"
            );

            let mut results = Vec::with_capacity(response.tool_calls.len());
            for call in &response.tool_calls {
                results.push(self.call_plugin(plugin, call)?);
            }

            messages.push(ChatMessage::assistant_tool_calls(response.tool_calls));
            messages.extend(results.into_iter().map(ChatMessage::tool));
        }

        Err(TriageError::plugin(format!(
            "agent '{}' kept calling plugins after {} rounds",
            self.name, MAX_TOOL_ROUNDS
        )))
    }

    fn call_plugin(&self, plugin: &dyn Plugin, call: &ToolCall) -> Result<String> {
        let expected = &plugin.definition().function.name;
        if &call.name != expected {
            return Err(TriageError::plugin(format!(
                "agent '{}' called unknown function '{}' (expected '{}')",
                self.name, call.name, expected
            )));
        }
        plugin.execute(&call.arguments)
    }
}

#[async_trait]
impl Agent for LlmAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn model(&self) -> Option<&str> {
        Some(&self.model)
    }

    async fn send(&self, history: &[Message]) -> Result<Message> {
        let messages = self.render(history);

        let response = match self.plugin {
            Some(ref plugin) => self.complete_with_plugin(plugin.as_ref(), messages).await?,
            None => {
                self.llm
                    .chat(&self.model, &messages, self.options(true))
                    .await?
            }
        };

        if response.is_truncated() {
            warn!(agent = %self.name, "completion hit the token limit");
            return Err(TriageError::ollama(format!(
                "agent '{}' returned a truncated completion",
                self.name
            )));
        }

        let content = response.content.trim();
        if content.is_empty() {
            return Err(TriageError::ollama(format!(
                "agent '{}' returned an empty completion",
                self.name
            )));
        }

        Ok(Message::agent(&self.name, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ChatMessage, ToolDefinition};
    use crate::tools::PluginRegistry;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider that replays canned responses and records requests
    struct CannedProvider {
        responses: Mutex<VecDeque<LLMResponse>>,
        requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl CannedProvider {
        fn new(responses: Vec<LLMResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, messages: &[ChatMessage]) -> Result<LLMResponse> {
            self.requests.lock().unwrap().push(messages.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| TriageError::ollama("no canned response"))
        }
    }

    #[async_trait]
    impl LLMProvider for CannedProvider {
        async fn chat(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            _options: Option<GenerateOptions>,
        ) -> Result<LLMResponse> {
            self.next(messages)
        }

        async fn chat_with_tools(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            _tools: &[ToolDefinition],
            _options: Option<GenerateOptions>,
        ) -> Result<LLMResponse> {
            self.next(messages)
        }

        async fn is_model_available(&self, _model: &str) -> Result<bool> {
            Ok(true)
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(vec!["test".to_string()])
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn text(content: &str) -> LLMResponse {
        LLMResponse {
            content: content.to_string(),
            done_reason: Some("stop".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_builder_requires_provider() {
        let result = LlmAgent::builder("TriageAgent").model("qwen3:8b").build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_send_renders_history() {
        let provider = Arc::new(CannedProvider::new(vec![text(
            r#"{"target_agent": "OrderStatusAgent"}"#,
        )]));
        let agent = LlmAgent::builder("HeadSupportAgent")
            .instructions("route")
            .model("test")
            .llm(provider.clone())
            .build()
            .unwrap();

        let history = vec![
            Message::user("status of 12345?"),
            Message::agent("TriageAgent", r#"{"type": "clu_result"}"#),
        ];
        let reply = agent.send(&history).await.unwrap();
        assert!(reply.is_from("HeadSupportAgent"));

        let requests = provider.requests.lock().unwrap();
        let sent = &requests[0];
        assert_eq!(sent[0].role, "system");
        assert_eq!(sent[1].content, "status of 12345?");
        assert!(sent[2].content.starts_with("[TriageAgent]: "));
    }

    #[tokio::test]
    async fn test_plugin_round_trip() {
        let provider = Arc::new(CannedProvider::new(vec![
            LLMResponse {
                tool_calls: vec![ToolCall::new(
                    "check_order_status",
                    json!({"order_id": "12345"}),
                )],
                ..Default::default()
            },
            text(
                r#"{"response": "Order 12345 is shipped and will arrive in 2-3 days.", "terminated": "True"}"#,
            ),
        ]));
        let plugin = PluginRegistry::new().get("OrderStatusPlugin").unwrap();
        let agent = LlmAgent::builder("OrderStatusAgent")
            .model("test")
            .llm(provider.clone())
            .plugin(plugin)
            .build()
            .unwrap();

        let reply = agent.send(&[Message::user("status?")]).await.unwrap();
        assert!(reply.content.contains("shipped"));

        let requests = provider.requests.lock().unwrap();
        let second = requests[1].last().unwrap();
        assert_eq!(second.role, "tool");
        assert_eq!(
            second.content,
            "Order 12345 is shipped and will arrive in 2-3 days."
        );
    }

    #[tokio::test]
    async fn test_unknown_function_is_an_error() {
        let provider = Arc::new(CannedProvider::new(vec![LLMResponse {
            tool_calls: vec![ToolCall::new("delete_order", json!({}))],
            ..Default::default()
        }]));
        let plugin = PluginRegistry::new().get("OrderStatusPlugin").unwrap();
        let agent = LlmAgent::builder("OrderStatusAgent")
            .model("test")
            .llm(provider)
            .plugin(plugin)
            .build()
            .unwrap();

        let err = agent.send(&[Message::user("status?")]).await.unwrap_err();
        assert!(err.to_string().contains("delete_order"));
    }

    #[tokio::test]
    async fn test_empty_completion_is_an_error() {
        let provider = Arc::new(CannedProvider::new(vec![text("   ")]));
        let agent = LlmAgent::builder("TriageAgent")
            .model("test")
            .llm(provider)
            .build()
            .unwrap();

        assert!(agent.send(&[Message::user("hi")]).await.is_err());
    }
}
