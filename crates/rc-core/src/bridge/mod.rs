//! Collaborator seams: the emulator bridge and the chat relay.
//!
//! Both are traits so the dispatch core can be driven by mocks in tests and
//! by the file bridge / Twitch relay in the shipped binary.

pub mod model;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;
use crate::error::Result;

pub use model::{BridgeAction, BridgeRequest, BridgeResponse};

/// Channel through which commands reach the running emulator.
#[async_trait]
pub trait EmulatorBridge: Send + Sync {
    /// Sends one request and waits for the emulator side to answer.
    async fn send(&self, request: BridgeRequest) -> Result<BridgeResponse>;
}

/// Connection status reported by the chat relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayStatus {
    Connected,
    Disconnected,
}

/// Events pushed by the chat relay.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    Message(ChatMessage),
    Status(RelayStatus),
}

/// External service delivering chat messages for one channel at a time.
///
/// Messages and status changes arrive as [`RelayEvent`]s on a channel handed
/// out when the relay is constructed.
#[async_trait]
pub trait ChatRelay: Send + Sync {
    /// Joins `channel` (already normalized, without `#`).
    async fn connect(&self, channel: &str) -> Result<()>;

    /// Leaves the current channel and tears the connection down.
    async fn disconnect(&self) -> Result<()>;
}
