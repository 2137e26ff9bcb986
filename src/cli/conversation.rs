// Conversation history for multi-turn interactions
//
// Append-only apart from explicit compaction and clearing. The system prompt
// is not stored here; it is prepended on every request.

use crate::ollama::{ChatMessage, Role};

/// Messages kept by `/compact`
pub const COMPACT_KEEP: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
}

/// Rough token counts split by role, 1 token ≈ 4 characters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenEstimate {
    pub input: usize,
    pub output: usize,
}

impl TokenEstimate {
    pub fn total(&self) -> usize {
        self.input + self.output
    }
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages for a request, with `system` first
    pub fn with_system(&self, system: &ChatMessage) -> Vec<ChatMessage> {
        let mut all = Vec::with_capacity(self.messages.len() + 1);
        all.push(system.clone());
        all.extend(self.messages.iter().cloned());
        all
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Keep only the most recent messages. Returns how many were dropped.
    pub fn compact(&mut self) -> usize {
        if self.messages.len() <= COMPACT_KEEP {
            return 0;
        }
        let remove_count = self.messages.len() - COMPACT_KEEP;
        self.messages.drain(0..remove_count);
        remove_count
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn token_estimate(&self) -> TokenEstimate {
        self.messages
            .iter()
            .fold(TokenEstimate::default(), |mut acc, m| {
                let tokens = m.content.chars().count().div_ceil(4);
                match m.role {
                    Role::Assistant => acc.output += tokens,
                    Role::User | Role::System => acc.input += tokens,
                }
                acc
            })
    }
}
