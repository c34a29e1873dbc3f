//! Chat message domain model.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::tags::MessageTags;

/// A chat message delivered by the chat relay. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Login name of the sender
    pub username: String,
    /// Raw message text
    pub content: String,
    #[serde(default)]
    pub tags: MessageTags,
}

impl ChatMessage {
    pub fn new(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            content: content.into(),
            tags: MessageTags::default(),
        }
    }

    /// Creates a message from a raw tag map, validating the tags.
    pub fn with_raw_tags(
        username: impl Into<String>,
        content: impl Into<String>,
        raw_tags: BTreeMap<String, String>,
    ) -> Self {
        Self {
            username: username.into(),
            content: content.into(),
            tags: MessageTags::from_raw(raw_tags),
        }
    }

    /// Name to show in feeds: the display name tag when present, else the login.
    pub fn display_name(&self) -> &str {
        self.tags.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// Bounded feed of the most recent chat messages, oldest dropped first.
#[derive(Debug, Clone)]
pub struct ChatFeed {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl ChatFeed {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }
}

impl Default for ChatFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_login() {
        let msg = ChatMessage::new("viewer42", "hello");
        assert_eq!(msg.display_name(), "viewer42");

        let mut raw = BTreeMap::new();
        raw.insert("display-name".to_string(), "Viewer42".to_string());
        let msg = ChatMessage::with_raw_tags("viewer42", "hello", raw);
        assert_eq!(msg.display_name(), "Viewer42");
    }

    #[test]
    fn test_feed_drops_oldest_beyond_capacity() {
        let mut feed = ChatFeed::new();
        for i in 0..105 {
            feed.push(ChatMessage::new("u", format!("msg {}", i)));
        }
        assert_eq!(feed.len(), 100);
        assert_eq!(feed.iter().next().map(|m| m.content.as_str()), Some("msg 5"));
    }
}
