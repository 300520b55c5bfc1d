//! Plugin registry - resolves plugins by name
//!
//! Agent specs name their plugin; the roster builder looks it up here.

use std::collections::HashMap;
use std::sync::Arc;

use crate::tools::orders::{
    OrderCancellationPlugin, OrderDiscountPlugin, OrderRefundPlugin, OrderReturnPlugin,
    OrderStatusPlugin,
};
use crate::tools::Plugin;

/// Registry of available plugins
#[derive(Clone)]
pub struct PluginRegistry {
    /// Plugins indexed by registry name
    plugins: HashMap<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// Create a registry with the bundled order plugins
    ///
    /// `OrderDiscountPlugin` is registered but no default agent binds it; a
    /// config `[[agents]]` entry can name it.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(OrderStatusPlugin::new()));
        registry.register(Arc::new(OrderCancellationPlugin::new()));
        registry.register(Arc::new(OrderRefundPlugin::new()));
        registry.register(Arc::new(OrderReturnPlugin::new()));
        registry.register(Arc::new(OrderDiscountPlugin::new()));
        registry
    }

    /// Register a plugin under its own name, replacing any previous one
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.insert(plugin.name().to_string(), plugin);
    }

    /// Look up a plugin by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    /// Registered plugin names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_plugins_registered() {
        let registry = PluginRegistry::new();
        assert_eq!(registry.len(), 5);
        assert!(registry.get("OrderStatusPlugin").is_some());
        assert!(registry.get("OrderCancellationPlugin").is_some());
        assert!(registry.get("UnknownPlugin").is_none());
    }

    #[test]
    fn test_order_status_text() {
        let plugin = PluginRegistry::new().get("OrderStatusPlugin").unwrap();
        assert_eq!(plugin.definition().function.name, "check_order_status");
        let out = plugin.execute(&json!({"order_id": "12345"})).unwrap();
        assert_eq!(out, "Order 12345 is shipped and will arrive in 2-3 days.");
    }

    #[test]
    fn test_cancellation_and_refund_text() {
        let registry = PluginRegistry::new();

        let cancel = registry.get("OrderCancellationPlugin").unwrap();
        assert_eq!(
            cancel.execute(&json!({"order_id": "56789"})).unwrap(),
            "Cancellation for order 56789 has been processed successfully."
        );

        let refund = registry.get("OrderRefundPlugin").unwrap();
        assert_eq!(
            refund
                .execute(&json!({"order_id": "0984", "reason": "too small"}))
                .unwrap(),
            "Refund for order 0984 has been processed successfully."
        );
    }

    #[test]
    fn test_discount_requires_code() {
        let discount = PluginRegistry::new().get("OrderDiscountPlugin").unwrap();
        assert!(discount.execute(&json!({"order_id": "1"})).is_err());
        assert_eq!(
            discount
                .execute(&json!({"order_id": "1", "discount_code": "SPRING"}))
                .unwrap(),
            "Discount code 'SPRING' has been applied to order 1 successfully."
        );
    }

    #[test]
    fn test_names_sorted() {
        let registry = PluginRegistry::new();
        let names = registry.names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
