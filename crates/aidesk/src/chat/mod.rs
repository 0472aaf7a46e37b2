//! Conversation memory: an ordered list of role/content turns carried back
//! into every subsequent prompt. Session-scoped, never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::{ChatRole, ChatTurn};

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatMemory {
    turns: Vec<ConversationMessage>,
}

impl ChatMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, content: impl Into<String>) {
        self.push(ROLE_USER, content.into());
    }

    pub fn add_assistant(&mut self, content: impl Into<String>) {
        self.push(ROLE_ASSISTANT, content.into());
    }

    fn push(&mut self, role: &str, content: String) {
        self.turns.push(ConversationMessage {
            role: role.to_string(),
            content,
            timestamp: Utc::now(),
        });
    }

    pub fn turns(&self) -> &[ConversationMessage] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// The memory as chat-completion turns, oldest first.
    pub fn to_chat_turns(&self) -> Vec<ChatTurn> {
        self.turns
            .iter()
            .map(|m| ChatTurn {
                role: if m.role == ROLE_USER {
                    ChatRole::User
                } else {
                    ChatRole::Assistant
                },
                content: m.content.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchanges_append_in_order() {
        let mut memory = ChatMemory::new();
        memory.add_user("What laws did Newton propose?");
        memory.add_assistant("Three laws of motion and universal gravitation.");
        memory.add_user("What was my previous question?");

        assert_eq!(memory.len(), 3);
        assert_eq!(memory.turns()[0].role, ROLE_USER);
        assert_eq!(memory.turns()[1].role, ROLE_ASSISTANT);
        assert_eq!(
            memory.turns()[2].content,
            "What was my previous question?"
        );
    }

    #[test]
    fn converts_to_chat_turns_with_matching_roles() {
        let mut memory = ChatMemory::new();
        memory.add_user("hi");
        memory.add_assistant("hello");

        let turns = memory.to_chat_turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, ChatRole::User);
        assert_eq!(turns[1].role, ChatRole::Assistant);
    }
}
