//! Persistence of the recent channel list.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

use super::model::RecentChannels;

/// Key under which the recent channel list is persisted.
pub const RECENT_CHANNELS_KEY: &str = "twitch_recent_channels";

/// Durable local key-value storage holding string values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    async fn set_item(&self, key: &str, value: String) -> Result<()>;

    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// Loads and saves [`RecentChannels`] as a JSON array of strings.
#[derive(Clone)]
pub struct ChannelHistoryStore {
    storage: Arc<dyn KeyValueStore>,
}

impl ChannelHistoryStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Reads the persisted list.
    ///
    /// Absent, unreadable or corrupt data yields an empty list; the problem is
    /// logged and never surfaced.
    pub async fn load(&self) -> RecentChannels {
        let stored = match self.storage.get_item(RECENT_CHANNELS_KEY).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return RecentChannels::new(),
            Err(e) => {
                tracing::warn!("[ChannelHistory] Failed to read recent channels: {}", e);
                return RecentChannels::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&stored) {
            Ok(channels) => RecentChannels::from_vec(channels),
            Err(e) => {
                tracing::warn!(
                    "[ChannelHistory] Ignoring corrupt recent channels data: {}",
                    e
                );
                RecentChannels::new()
            }
        }
    }

    pub async fn save(&self, channels: &RecentChannels) -> Result<()> {
        let json = serde_json::to_string(channels.as_slice())?;
        self.storage.set_item(RECENT_CHANNELS_KEY, json).await
    }

    /// Adds `channel` to `channels` and persists the result.
    pub async fn add_channel(&self, channels: &mut RecentChannels, channel: &str) -> Result<()> {
        channels.add(channel);
        self.save(channels).await
    }
}
