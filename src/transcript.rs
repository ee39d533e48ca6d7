//! Transcript state
//!
//! The data model behind the rendered message list. A `history` frame
//! replaces the whole transcript; every later frame appends. The viewer
//! keeps messages only for display; nothing here is persisted.

use crate::types::ChatMessage;

/// Ordered list of messages for the currently viewed session
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Create an empty transcript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole transcript, preserving the given order (oldest first)
    pub fn replace(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    /// Append a single message at the end
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Drop all messages
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Snapshot of the current messages
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
