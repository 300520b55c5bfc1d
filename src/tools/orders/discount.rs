//! Order discount plugin

use serde_json::Value;
use tracing::info;

use super::string_params;
use crate::core::{Result, ToolDefinition};
use crate::tools::{required_arg, Plugin};

const FUNCTION: &str = "apply_discount";

/// Applies a discount code to an order
pub struct OrderDiscountPlugin {
    definition: ToolDefinition,
}

impl OrderDiscountPlugin {
    /// Create a new discount plugin
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::function(
                FUNCTION,
                "Apply a discount code to an order",
                string_params(
                    &[
                        ("order_id", "The order number"),
                        ("discount_code", "The discount code to apply"),
                    ],
                    &["order_id", "discount_code"],
                ),
            ),
        }
    }
}

impl Default for OrderDiscountPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for OrderDiscountPlugin {
    fn name(&self) -> &str {
        "OrderDiscountPlugin"
    }

    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn execute(&self, args: &Value) -> Result<String> {
        let order_id = required_arg(args, "order_id", FUNCTION)?;
        let code = required_arg(args, "discount_code", FUNCTION)?;
        info!(%order_id, %code, "applying discount");
        Ok(format!(
            "Discount code '{}' has been applied to order {} successfully.",
            code, order_id
        ))
    }
}
