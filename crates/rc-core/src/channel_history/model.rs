//! Recently used chat channels.

use serde::{Deserialize, Serialize};

/// Ordered, unique, most-recent-first list of channel names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentChannels {
    channels: Vec<String>,
}

impl RecentChannels {
    pub const MAX_ENTRIES: usize = 5;

    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from persisted values, re-applying the invariants.
    ///
    /// Stored data may have been edited by hand, so duplicates are collapsed
    /// (first occurrence wins) and the list is truncated.
    pub fn from_vec(channels: Vec<String>) -> Self {
        let mut recent = Self::new();
        for channel in channels.into_iter().rev() {
            recent.add(&channel);
        }
        recent
    }

    /// Moves `channel` to the front, dropping any case-insensitive match and
    /// anything beyond [`Self::MAX_ENTRIES`]. Blank names are ignored.
    pub fn add(&mut self, channel: &str) {
        let normalized = normalize_channel(channel);
        if normalized.is_empty() {
            return;
        }
        self.channels.retain(|existing| normalize_channel(existing) != normalized);
        self.channels.insert(0, normalized);
        self.channels.truncate(Self::MAX_ENTRIES);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.channels
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.channels.clone()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn most_recent(&self) -> Option<&str> {
        self.channels.first().map(String::as_str)
    }
}

/// Lowercases and trims a channel name, dropping a leading `#`.
pub fn normalize_channel(channel: &str) -> String {
    channel.trim().trim_start_matches('#').trim().to_lowercase()
}
