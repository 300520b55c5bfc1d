//! Conversation history for a single run
//!
//! Append-only: messages receive their ordinal on append and are never
//! edited or removed. A fresh history is created for every run attempt.

use crate::core::{Message, Role};

/// Ordered, append-only message log owned by one run
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    /// Start a history with the customer's utterance
    pub fn new(utterance: impl Into<String>) -> Self {
        let mut history = Self::default();
        history.append(Message::user(utterance));
        history
    }

    /// Append a message, stamping its ordinal
    pub fn append(&mut self, mut message: Message) -> &Message {
        message.ordinal = self.messages.len();
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// All messages in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The utterance that opened the run
    pub fn utterance(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_starts_with_user_message() {
        let history = ConversationHistory::new("Where is my order?");
        assert_eq!(history.len(), 1);
        let first = history.last().unwrap();
        assert_eq!(first.role, Role::User);
        assert_eq!(first.ordinal, 0);
        assert_eq!(history.utterance(), Some("Where is my order?"));
    }

    #[test]
    fn test_append_stamps_ordinals() {
        let mut history = ConversationHistory::new("hi");
        history.append(Message::agent("TriageAgent", "{}"));
        let appended = history.append(Message::agent("HeadSupportAgent", "{}"));
        assert_eq!(appended.ordinal, 2);

        let ordinals: Vec<usize> = history.messages().iter().map(|m| m.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }
}
