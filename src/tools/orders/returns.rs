//! Order return plugin

use serde_json::Value;
use tracing::info;

use super::string_params;
use crate::core::{Result, ToolDefinition};
use crate::tools::{optional_arg, required_arg, Plugin};

const FUNCTION: &str = "process_return";

/// Registers a return for an order
pub struct OrderReturnPlugin {
    definition: ToolDefinition,
}

impl OrderReturnPlugin {
    /// Create a new return plugin
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::function(
                FUNCTION,
                "Process a return for an order",
                string_params(
                    &[
                        ("order_id", "The order number"),
                        ("reason", "Why the customer is returning the order"),
                    ],
                    &["order_id"],
                ),
            ),
        }
    }
}

impl Default for OrderReturnPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for OrderReturnPlugin {
    fn name(&self) -> &str {
        "OrderReturnPlugin"
    }

    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn execute(&self, args: &Value) -> Result<String> {
        let order_id = required_arg(args, "order_id", FUNCTION)?;
        let reason = optional_arg(args, "reason").unwrap_or_else(|| "unspecified".to_string());
        info!(%order_id, %reason, "processing return");
        Ok(format!(
            "Return for order {} has been processed successfully.",
            order_id
        ))
    }
}
