//! Order status plugin

use serde_json::Value;
use tracing::info;

use super::string_params;
use crate::core::{Result, ToolDefinition};
use crate::tools::{required_arg, Plugin};

const FUNCTION: &str = "check_order_status";

/// Looks up the shipping status of an order
pub struct OrderStatusPlugin {
    definition: ToolDefinition,
}

impl OrderStatusPlugin {
    /// Create a new order status plugin
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::function(
                FUNCTION,
                "Check the status of an order",
                string_params(&[("order_id", "The order number")], &["order_id"]),
            ),
        }
    }
}

impl Default for OrderStatusPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for OrderStatusPlugin {
    fn name(&self) -> &str {
        "OrderStatusPlugin"
    }

    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn execute(&self, args: &Value) -> Result<String> {
        let order_id = required_arg(args, "order_id", FUNCTION)?;
        info!(%order_id, "checking order status");
        Ok(format!(
            "Order {} is shipped and will arrive in 2-3 days.",
            order_id
        ))
    }
}
