//! Messages in the conversation log.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp};

/// Role of a message sender.
///
/// Only user and assistant turns are logged; system prompts are built per
/// call and never stored in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry in the append-only conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Unique id of this message.
    pub id: MessageId,
    /// Who sent it.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
    /// When the message was appended.
    pub created_at: Timestamp,
}

impl ConversationMessage {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::User,
            content: content.into(),
            created_at: Timestamp::now(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::Assistant,
            content: content.into(),
            created_at: Timestamp::now(),
        }
    }

    /// Returns true if this message was sent by the user.
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_constructor_sets_role() {
        let msg = ConversationMessage::user("hello");
        assert!(msg.is_user());
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn assistant_constructor_sets_role() {
        let msg = ConversationMessage::assistant("hi there");
        assert!(!msg.is_user());
        assert_eq!(msg.role, MessageRole::Assistant);
    }

    #[test]
    fn role_serializes_to_snake_case() {
        assert_eq!(
            serde_json::to_string(&MessageRole::User).unwrap(),
            "\"user\""
        );
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
