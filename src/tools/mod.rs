//! Tools module - capability plugins invoked by leaf agents
//!
//! Each plugin exposes exactly one function to exactly one agent. The
//! controller never calls plugins directly; model-backed agents do.

pub mod orders;
pub mod registry;

use serde_json::Value;

use crate::core::{Result, ToolDefinition, TriageError};

pub use registry::PluginRegistry;

/// A named capability bound to one agent
pub trait Plugin: Send + Sync {
    /// Registry name (e.g. `OrderStatusPlugin`)
    fn name(&self) -> &str;

    /// Function definition advertised to the model
    fn definition(&self) -> &ToolDefinition;

    /// Run the capability with named arguments
    fn execute(&self, args: &Value) -> Result<String>;
}

/// Read a required argument as a string
///
/// Models sometimes send numeric order ids, so numbers are accepted too.
pub(crate) fn required_arg(args: &Value, key: &str, function: &str) -> Result<String> {
    match args.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(TriageError::plugin(format!(
            "{} requires argument '{}'",
            function, key
        ))),
    }
}

/// Read an optional argument as a string
pub(crate) fn optional_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
