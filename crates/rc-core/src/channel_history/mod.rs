//! Recently used chat channels and their persistence.

pub mod model;
pub mod store;

pub use model::{RecentChannels, normalize_channel};
pub use store::{ChannelHistoryStore, KeyValueStore, RECENT_CHANNELS_KEY};
