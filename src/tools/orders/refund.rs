//! Order refund plugin

use serde_json::Value;
use tracing::info;

use super::string_params;
use crate::core::{Result, ToolDefinition};
use crate::tools::{optional_arg, required_arg, Plugin};

const FUNCTION: &str = "process_refund";

/// Refunds an order
pub struct OrderRefundPlugin {
    definition: ToolDefinition,
}

impl OrderRefundPlugin {
    /// Create a new refund plugin
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::function(
                FUNCTION,
                "Process a refund for an order",
                string_params(
                    &[
                        ("order_id", "The order number"),
                        ("reason", "Why the customer wants a refund"),
                    ],
                    &["order_id"],
                ),
            ),
        }
    }
}

impl Default for OrderRefundPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for OrderRefundPlugin {
    fn name(&self) -> &str {
        "OrderRefundPlugin"
    }

    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn execute(&self, args: &Value) -> Result<String> {
        let order_id = required_arg(args, "order_id", FUNCTION)?;
        let reason = optional_arg(args, "reason").unwrap_or_else(|| "unspecified".to_string());
        info!(%order_id, %reason, "processing refund");
        Ok(format!(
            "Refund for order {} has been processed successfully.",
            order_id
        ))
    }
}
