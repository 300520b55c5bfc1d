//! Shared types used across Triage modules
//!
//! Contains conversation messages, structured agent payloads, run results,
//! and the chat/tool structures exchanged with model providers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{Result, TriageError};

/// Who authored a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The customer
    User,
    /// One of the registered agents
    Agent,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

/// A message in a multi-agent conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author role
    pub role: Role,
    /// Name of the agent that produced the message (agent messages only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free text or a JSON-encoded structured payload
    pub content: String,
    /// Position in the conversation, assigned on append
    pub ordinal: usize,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            name: None,
            content: content.into(),
            ordinal: 0,
        }
    }

    /// Create a new message authored by the named agent
    pub fn agent(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            name: Some(name.into()),
            content: content.into(),
            ordinal: 0,
        }
    }

    /// Whether this message was produced by the given agent
    pub fn is_from(&self, agent_name: &str) -> bool {
        self.role == Role::Agent && self.name.as_deref() == Some(agent_name)
    }

    /// Parse the content as a structured payload
    pub fn payload(&self) -> Result<StructuredPayload> {
        StructuredPayload::parse(&self.content)
    }
}

/// Discriminator value of an entry-agent intent classification result
pub const CLU_RESULT: &str = "clu_result";
/// Discriminator value of an entry-agent direct answer result
pub const CQA_RESULT: &str = "cqa_result";

/// A JSON object produced by an agent
///
/// Entry agents discriminate on `type`, the routing agent on `target_agent`,
/// and leaf agents carry only a `response` body plus flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredPayload(Map<String, Value>);

impl StructuredPayload {
    /// Parse agent content into a payload
    ///
    /// A single surrounding Markdown code fence is tolerated. Anything other
    /// than a JSON object is a parse error.
    pub fn parse(content: &str) -> Result<Self> {
        let body = strip_code_fence(content);
        let value: Value = serde_json::from_str(body)
            .map_err(|e| TriageError::parse(format!("invalid JSON payload: {}", e)))?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(TriageError::parse(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// The `type` discriminator, if present
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// The `target_agent` discriminator, if present
    pub fn target_agent(&self) -> Option<&str> {
        self.0.get("target_agent").and_then(Value::as_str)
    }

    /// The `intent` named by the routing agent
    pub fn intent(&self) -> Option<&str> {
        self.0.get("intent").and_then(Value::as_str)
    }

    /// The `entities` list named by the routing agent
    pub fn entities(&self) -> Option<&Vec<Value>> {
        self.0.get("entities").and_then(Value::as_array)
    }

    /// The result body
    pub fn response(&self) -> Option<&Value> {
        self.0.get("response")
    }

    /// Read a boolean flag, accepting both `true` and `"True"` encodings
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Look up an arbitrary field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Top intent of a classifier payload (`response.result.prediction.topIntent`)
    pub fn top_intent(&self) -> Option<&str> {
        self.response()?
            .pointer("/result/prediction/topIntent")
            .and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for StructuredPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Optional language tag, on its own line or followed by a space
    let body = rest.trim_start();
    let tag_len = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    body[tag_len..].trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// User-facing answer extracted from a terminal payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// A single answer
    Text(String),
    /// One answer per decomposed utterance
    List(Vec<String>),
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Answer::Text(text) => write!(f, "{}", text),
            Answer::List(items) => write!(f, "{}", items.join("\n")),
        }
    }
}

/// Structured failure returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    /// Short machine-readable kind (e.g. `agent_invocation`)
    pub kind: String,
    /// Message of the originating error
    pub error: String,
}

impl From<&TriageError> for RunFailure {
    fn from(err: &TriageError) -> Self {
        Self {
            kind: err.kind().to_string(),
            error: err.to_string(),
        }
    }
}

/// Outcome of one conversation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunResult {
    /// The run reached a terminal answer
    #[serde(rename = "response")]
    Answer(Answer),
    /// The run failed; carries the last error
    #[serde(rename = "error")]
    Failed(RunFailure),
}

impl RunResult {
    /// Build a failed result from an error
    pub fn failed(err: &TriageError) -> Self {
        Self::Failed(RunFailure::from(err))
    }

    /// Whether the run produced an answer
    pub fn is_answer(&self) -> bool {
        matches!(self, RunResult::Answer(_))
    }

    /// The answer, if any
    pub fn answer(&self) -> Option<&Answer> {
        match self {
            RunResult::Answer(answer) => Some(answer),
            RunResult::Failed(_) => None,
        }
    }

    /// The failure, if any
    pub fn failure(&self) -> Option<&RunFailure> {
        match self {
            RunResult::Answer(_) => None,
            RunResult::Failed(failure) => Some(failure),
        }
    }
}

/// A chat message sent to a model provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant, tool)
    pub role: String,
    /// Content of the message
    pub content: String,
    /// Optional tool calls made by the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatMessage {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            tool_calls: None,
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            tool_calls: None,
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
            tool_calls: None,
        }
    }

    /// Create a tool result message
    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: content.into(),
            tool_calls: None,
        }
    }

    /// Create an assistant message that requested tool calls
    pub fn assistant_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: String::new(),
            tool_calls: Some(tool_calls),
        }
    }
}

/// A tool call made by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke
    pub name: String,
    /// JSON arguments for the tool
    pub arguments: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Definition of a tool that can be called by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (always "function" for now)
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function details
    pub function: FunctionDefinition,
}

/// Function definition within a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for the parameters
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}
