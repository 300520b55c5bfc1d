//! Order cancellation plugin

use serde_json::Value;
use tracing::info;

use super::string_params;
use crate::core::{Result, ToolDefinition};
use crate::tools::{required_arg, Plugin};

const FUNCTION: &str = "process_cancellation";

/// Cancels an order
pub struct OrderCancellationPlugin {
    definition: ToolDefinition,
}

impl OrderCancellationPlugin {
    /// Create a new cancellation plugin
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::function(
                FUNCTION,
                "Process a cancellation for an order",
                string_params(&[("order_id", "The order number")], &["order_id"]),
            ),
        }
    }
}

impl Default for OrderCancellationPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for OrderCancellationPlugin {
    fn name(&self) -> &str {
        "OrderCancellationPlugin"
    }

    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn execute(&self, args: &Value) -> Result<String> {
        let order_id = required_arg(args, "order_id", FUNCTION)?;
        info!(%order_id, "processing cancellation");
        Ok(format!(
            "Cancellation for order {} has been processed successfully.",
            order_id
        ))
    }
}
