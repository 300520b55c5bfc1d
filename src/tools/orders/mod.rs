//! Order plugins
//!
//! Simulated back-office actions for the customer-support action agents.

mod cancel;
mod discount;
mod refund;
mod returns;
mod status;

pub use cancel::OrderCancellationPlugin;
pub use discount::OrderDiscountPlugin;
pub use refund::OrderRefundPlugin;
pub use returns::OrderReturnPlugin;
pub use status::OrderStatusPlugin;

use serde_json::{json, Value};

/// JSON schema for a function taking string arguments
fn string_params(props: &[(&str, &str)], required: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = props
        .iter()
        .map(|(name, description)| {
            (
                name.to_string(),
                json!({"type": "string", "description": description}),
            )
        })
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
