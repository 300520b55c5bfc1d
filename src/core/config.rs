//! Configuration management for Triage
//!
//! Supports environment variables, config files, and runtime overrides.
//! The configuration is built once at start-up and handed to the
//! conversation controller; it is never mutated while a run is in flight.
//!
//! Config file location: ~/.config/triage/config.toml

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{Result, TriageError};

/// Name of the default entry (triage) agent
pub const TRIAGE_AGENT: &str = "TriageAgent";
/// Name of the default routing agent
pub const HEAD_SUPPORT_AGENT: &str = "HeadSupportAgent";

/// Main configuration for Triage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ollama configuration
    pub ollama: OllamaConfig,
    /// Model configuration
    pub models: ModelConfig,
    /// Conversation controller budgets
    #[serde(default)]
    pub orchestration: OrchestrationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Ordered agent roster
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentSpec>,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Host address (default: localhost)
    pub host: String,
    /// Port number (default: 11434)
    pub port: u16,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model used by agents that do not name their own
    pub default: String,
}

/// Budgets and fixed roles of the conversation controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationConfig {
    /// Agent that opens every run
    pub entry_agent: String,
    /// Agent that maps a classified intent to an action agent
    pub routing_agent: String,
    /// Maximum turns per run
    /// Default: 10
    pub max_iterations: usize,
    /// Whole-run attempts before giving up
    /// Default: 3
    pub max_run_retries: u32,
    /// Attempts per agent call
    /// Default: 3
    pub max_agent_retries: u32,
    /// Base backoff between agent call attempts, doubled per attempt
    pub retry_base_delay_ms: u64,
    /// Time box for a single agent call
    pub agent_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when RUST_LOG is unset
    pub level: String,
}

/// Declaration of one agent in the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique agent name; routing matches on it exactly
    pub name: String,
    /// Short description shown by the CLI
    #[serde(default)]
    pub description: String,
    /// Model override (falls back to `models.default`)
    #[serde(default)]
    pub model: Option<String>,
    /// System instructions
    pub instructions: String,
    /// Plugin the agent may call
    #[serde(default)]
    pub plugin: Option<String>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl AgentSpec {
    /// Create a spec with instructions and no plugin
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            model: None,
            instructions: instructions.into(),
            plugin: None,
            temperature: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Bind a plugin
    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama: OllamaConfig::default(),
            models: ModelConfig::default(),
            orchestration: OrchestrationConfig::default(),
            logging: LoggingConfig::default(),
            agents: default_agents(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(11434),
            timeout_secs: 120,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default: env::var("TRIAGE_MODEL").unwrap_or_else(|_| "qwen3:8b".to_string()),
        }
    }
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            entry_agent: TRIAGE_AGENT.to_string(),
            routing_agent: HEAD_SUPPORT_AGENT.to_string(),
            max_iterations: 10,
            max_run_retries: env::var("MAX_RUN_RETRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            max_agent_retries: env::var("MAX_AGENT_RETRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            retry_base_delay_ms: 500,
            agent_timeout_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: env::var("TRIAGE_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl OrchestrationConfig {
    /// Per-call time box
    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs)
    }

    /// Base backoff delay
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// The customer-support roster the system ships with
pub fn default_agents() -> Vec<AgentSpec> {
    vec![
        AgentSpec::new(TRIAGE_AGENT, TRIAGE_INSTRUCTIONS).with_description(
            "Chooses between intent classification and question answering",
        ),
        AgentSpec::new(HEAD_SUPPORT_AGENT, HEAD_SUPPORT_INSTRUCTIONS)
            .with_description("Routes a classified intent to the proper action agent"),
        AgentSpec::new("OrderStatusAgent", leaf_instructions("check order status", "check_order_status"))
            .with_description("Checks order status")
            .with_plugin("OrderStatusPlugin"),
        AgentSpec::new("OrderCancelAgent", leaf_instructions("handle order cancellations", "process_cancellation"))
            .with_description("Handles order cancellations")
            .with_plugin("OrderCancellationPlugin"),
        AgentSpec::new("OrderRefundAgent", leaf_instructions("handle order refunds", "process_refund"))
            .with_description("Handles order refunds")
            .with_plugin("OrderRefundPlugin"),
        AgentSpec::new("OrderReturnAgent", leaf_instructions("handle order returns", "process_return"))
            .with_description("Handles order returns")
            .with_plugin("OrderReturnPlugin"),
    ]
}

const TRIAGE_INSTRUCTIONS: &str = r#"You are a triage agent. Your goal is to answer questions and redirect messages according to their intent.
Decide whether the customer asks a question about procedures, policies or FAQs, or wants an action performed on an order.
- For an action request, classify it and return JSON: {"type": "clu_result", "response": {"result": {"prediction": {"topIntent": "<Intent>", "entities": [<entities>]}}}, "terminated": "False"}
  Intents: OrderStatus, OrderCancel, OrderRefund, OrderReturn. Entities have a "category" and a "text".
- For a question, answer it and return JSON: {"type": "cqa_result", "response": {"answers": [{"answer": "<answer>"}]}, "terminated": "True"}
Return only the JSON object."#;

const HEAD_SUPPORT_INSTRUCTIONS: &str = r#"You are a head support agent that routes inquiries to the proper custom agent based on the intent and entities from the triage agent.
You must choose between the following agents:
- OrderStatusAgent: for order status inquiries
- OrderCancelAgent: for order cancellation inquiries
- OrderRefundAgent: for order refund inquiries
- OrderReturnAgent: for order return inquiries
You must return the response in the following format:
{"target_agent": "<AgentName>", "intent": "<IntentName>", "entities": [<List of extracted entities>], "terminated": "False"}
"target_agent" must match one of the agent names above exactly. Do not use any special characters; the response must be a valid JSON object."#;

fn leaf_instructions(task: &str, function: &str) -> String {
    format!(
        r#"You are a customer support agent that can {task}. You must use the `{function}` function to do so.
If the request concerns several orders, call the function once per order and return every result.
You must return the response in the following format:
{{"response": "<result>" or ["<result>", ...], "terminated": "True", "need_more_info": "False"}}
If information required by the function is missing, set "need_more_info" to "True" and ask for it in "response"."#
    )
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("triage")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from the default file location
    pub fn load_from_file() -> Result<Self> {
        Self::load_from_path(&Self::config_file())
    }

    /// Load configuration from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TriageError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| TriageError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| TriageError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to an explicit path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    TriageError::config(format!("Failed to create config dir: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TriageError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| TriageError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Save configuration to the default location and return the path
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file();
        self.save_to_path(&path)?;
        Ok(path)
    }

    /// Check budgets and roster consistency
    pub fn validate(&self) -> Result<()> {
        let orch = &self.orchestration;

        if orch.max_iterations == 0 {
            return Err(TriageError::config("max_iterations must be at least 1"));
        }
        if orch.max_run_retries == 0 {
            return Err(TriageError::config("max_run_retries must be at least 1"));
        }
        if orch.max_agent_retries == 0 {
            return Err(TriageError::config("max_agent_retries must be at least 1"));
        }
        if orch.agent_timeout_secs == 0 {
            return Err(TriageError::config("agent_timeout_secs must be at least 1"));
        }

        let mut seen = HashSet::new();
        for spec in &self.agents {
            if spec.name.trim().is_empty() {
                return Err(TriageError::config("agent names must not be empty"));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(TriageError::config(format!(
                    "duplicate agent name '{}'",
                    spec.name
                )));
            }
        }

        for (role, name) in [
            ("entry_agent", &orch.entry_agent),
            ("routing_agent", &orch.routing_agent),
        ] {
            if !seen.contains(name.as_str()) {
                return Err(TriageError::config(format!(
                    "{} '{}' is not declared in [[agents]]",
                    role, name
                )));
            }
        }

        Ok(())
    }

    /// Get the full Ollama API URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    /// Model used by the given agent spec
    pub fn model_for<'a>(&'a self, spec: &'a AgentSpec) -> &'a str {
        spec.model.as_deref().unwrap_or(&self.models.default)
    }
}
