//! Termination check

use crate::core::Message;

/// Whether the latest message ends the conversation
///
/// True when its payload sets `terminated` or `need_more_info`. Unparsable
/// content never terminates.
pub fn should_terminate(history: &[Message]) -> bool {
    history
        .last()
        .and_then(|m| m.payload().ok())
        .map(|p| p.flag("terminated") || p.flag("need_more_info"))
        .unwrap_or(false)
}
