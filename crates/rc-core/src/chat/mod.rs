//! Chat messages as delivered by the chat relay.

pub mod irc;
pub mod message;
pub mod tags;

pub use irc::IrcLine;
pub use message::{ChatFeed, ChatMessage};
pub use tags::{MessageTags, Tag};
