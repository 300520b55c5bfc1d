//! Agent capability and roster
//!
//! An [`Agent`] turns a conversation history into exactly one new message.
//! The [`AgentRoster`] is the fixed, ordered set of agents a run may select
//! from, together with the names of the entry and routing agents.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::llm_agent::LlmAgent;
use crate::core::{Config, Message, Result, TriageError};
use crate::llm::LLMProvider;
use crate::tools::PluginRegistry;

/// A participant in the multi-agent conversation
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique name; routing payloads refer to agents by it
    fn name(&self) -> &str;

    /// Short description
    fn description(&self) -> &str {
        ""
    }

    /// Model the agent runs on, if it is model-backed
    fn model(&self) -> Option<&str> {
        None
    }

    /// Produce the next message given the history so far
    async fn send(&self, history: &[Message]) -> Result<Message>;
}

/// Shared handle to an agent
pub type AgentRef = Arc<dyn Agent>;

/// Fixed set of agents for a conversation
///
/// Immutable after construction and safe to share between concurrent runs.
#[derive(Clone)]
pub struct AgentRoster {
    agents: Vec<AgentRef>,
    entry_agent: String,
    routing_agent: String,
}

impl AgentRoster {
    /// Build a roster, checking names are unique and both fixed roles exist
    pub fn new(
        agents: Vec<AgentRef>,
        entry_agent: impl Into<String>,
        routing_agent: impl Into<String>,
    ) -> Result<Self> {
        let entry_agent = entry_agent.into();
        let routing_agent = routing_agent.into();

        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.name().to_string()) {
                return Err(TriageError::config(format!(
                    "duplicate agent name '{}' in roster",
                    agent.name()
                )));
            }
        }

        for name in [&entry_agent, &routing_agent] {
            if !seen.contains(name) {
                return Err(TriageError::config(format!(
                    "agent '{}' is not in the roster",
                    name
                )));
            }
        }

        Ok(Self {
            agents,
            entry_agent,
            routing_agent,
        })
    }

    /// Build the model-backed roster declared in the configuration
    pub fn from_config(
        config: &Config,
        llm: Arc<dyn LLMProvider>,
        plugins: &PluginRegistry,
    ) -> Result<Self> {
        config.validate()?;

        let mut agents: Vec<AgentRef> = Vec::with_capacity(config.agents.len());
        for spec in &config.agents {
            let mut builder = LlmAgent::builder(&spec.name)
                .description(&spec.description)
                .instructions(&spec.instructions)
                .model(config.model_for(spec))
                .llm(llm.clone());

            if let Some(temperature) = spec.temperature {
                builder = builder.temperature(temperature);
            }

            if let Some(ref plugin_name) = spec.plugin {
                let plugin = plugins.get(plugin_name).ok_or_else(|| {
                    TriageError::config(format!(
                        "agent '{}' uses unknown plugin '{}' (known: {})",
                        spec.name,
                        plugin_name,
                        plugins.names().join(", ")
                    ))
                })?;
                builder = builder.plugin(plugin);
            }

            agents.push(Arc::new(builder.build()?));
        }

        Self::new(
            agents,
            &config.orchestration.entry_agent,
            &config.orchestration.routing_agent,
        )
    }

    /// Look up an agent by exact name
    pub fn get(&self, name: &str) -> Option<&AgentRef> {
        self.agents.iter().find(|a| a.name() == name)
    }

    /// The agent that opens every run
    pub fn entry(&self) -> Option<&AgentRef> {
        self.get(&self.entry_agent)
    }

    /// The second-stage routing agent
    pub fn routing(&self) -> Option<&AgentRef> {
        self.get(&self.routing_agent)
    }

    /// Name of the entry agent
    pub fn entry_name(&self) -> &str {
        &self.entry_agent
    }

    /// Name of the routing agent
    pub fn routing_name(&self) -> &str {
        &self.routing_agent
    }

    /// All agents in registration order
    pub fn agents(&self) -> &[AgentRef] {
        &self.agents
    }

    /// Distinct models used by model-backed agents
    pub fn models(&self) -> Vec<&str> {
        let mut models: Vec<&str> = self.agents.iter().filter_map(|a| a.model()).collect();
        models.sort_unstable();
        models.dedup();
        models
    }

    /// Get agent count
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl std::fmt::Debug for AgentRoster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRoster")
            .field(
                "agents",
                &self.agents.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .field("entry_agent", &self.entry_agent)
            .field("routing_agent", &self.routing_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::scripted::ScriptedAgent;
    use crate::core::config::{HEAD_SUPPORT_AGENT, TRIAGE_AGENT};
    use crate::core::AgentSpec;
    use crate::llm::OllamaClient;

    fn scripted(name: &str) -> AgentRef {
        Arc::new(ScriptedAgent::new(name))
    }

    #[test]
    fn test_roster_lookup_is_exact() {
        let roster = AgentRoster::new(
            vec![scripted("TriageAgent"), scripted("HeadSupportAgent")],
            "TriageAgent",
            "HeadSupportAgent",
        )
        .unwrap();

        assert!(roster.get("TriageAgent").is_some());
        assert!(roster.get("triageagent").is_none());
        assert!(roster.get("TriageAgent ").is_none());
        assert_eq!(roster.entry().unwrap().name(), "TriageAgent");
        assert_eq!(roster.routing().unwrap().name(), "HeadSupportAgent");
    }

    #[test]
    fn test_roster_rejects_missing_roles() {
        let err = AgentRoster::new(vec![scripted("TriageAgent")], "TriageAgent", "Router")
            .unwrap_err();
        assert!(err.to_string().contains("Router"));
    }

    #[test]
    fn test_roster_rejects_duplicates() {
        let result = AgentRoster::new(
            vec![scripted("A"), scripted("A"), scripted("B")],
            "A",
            "B",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config_builds_default_roster() {
        let config = Config::default();
        let llm: Arc<dyn LLMProvider> =
            Arc::new(OllamaClient::with_base_url("http://localhost:11434").unwrap());
        let roster = AgentRoster::from_config(&config, llm, &PluginRegistry::new()).unwrap();

        assert_eq!(roster.len(), 6);
        assert_eq!(roster.entry_name(), TRIAGE_AGENT);
        assert_eq!(roster.routing_name(), HEAD_SUPPORT_AGENT);
        assert_eq!(roster.agents()[0].name(), TRIAGE_AGENT);
        assert_eq!(roster.models(), vec![config.models.default.as_str()]);
    }

    #[test]
    fn test_from_config_binds_discount_plugin() {
        let mut config = Config::default();
        config.agents.push(
            AgentSpec::new("OrderDiscountAgent", "Apply discounts to orders.")
                .with_description("Handles order discounts")
                .with_plugin("OrderDiscountPlugin"),
        );
        let llm: Arc<dyn LLMProvider> =
            Arc::new(OllamaClient::with_base_url("http://localhost:11434").unwrap());

        let roster = AgentRoster::from_config(&config, llm, &PluginRegistry::new()).unwrap();
        assert_eq!(roster.len(), 7);
        assert!(roster.get("OrderDiscountAgent").is_some());
    }

    #[test]
    fn test_from_config_rejects_unknown_plugin() {
        let mut config = Config::default();
        config
            .agents
            .push(AgentSpec::new("GiftCardAgent", "x").with_plugin("GiftCardPlugin"));
        let llm: Arc<dyn LLMProvider> =
            Arc::new(OllamaClient::with_base_url("http://localhost:11434").unwrap());

        let err = AgentRoster::from_config(&config, llm, &PluginRegistry::new()).unwrap_err();
        assert!(err.to_string().contains("GiftCardPlugin"));
    }
}
