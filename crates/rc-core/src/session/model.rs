//! Chat connection session state machine.

use serde::{Deserialize, Serialize};

use crate::channel_history::normalize_channel;
use crate::error::{RcError, Result};

/// Connection lifecycle: `Disconnected -> Connecting -> Connected -> Disconnected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting { channel: String, attempt: u64 },
    Connected { channel: String },
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting { .. } => "Connecting...",
            Self::Connected { .. } => "Connected",
        }
    }
}

/// A connect request handed to the relay.
///
/// `id` correlates the relay's answer with the request that caused it.
/// Overlapping attempts are not guarded: whichever answer arrives last
/// decides the final state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectAttempt {
    pub id: u64,
    pub channel: String,
}

/// The single chat connection of a process.
#[derive(Debug, Clone)]
pub struct ConnectionSession {
    state: ConnectionState,
    next_attempt: u64,
}

impl ConnectionSession {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            next_attempt: 1,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected { .. })
    }

    /// The joined channel; `Some` iff connected.
    pub fn channel(&self) -> Option<&str> {
        match &self.state {
            ConnectionState::Connected { channel } => Some(channel),
            _ => None,
        }
    }

    /// Normalizes `channel` and enters `Connecting`.
    ///
    /// Fails without changing state when the name is blank.
    pub fn begin_connect(&mut self, channel: &str) -> Result<ConnectAttempt> {
        let channel = normalize_channel(channel);
        if channel.is_empty() {
            return Err(RcError::validation("Please enter a channel name"));
        }

        let attempt = ConnectAttempt {
            id: self.next_attempt,
            channel,
        };
        self.next_attempt += 1;
        self.state = ConnectionState::Connecting {
            channel: attempt.channel.clone(),
            attempt: attempt.id,
        };
        Ok(attempt)
    }

    /// Applies the relay's answer to `attempt`.
    pub fn complete_connect(&mut self, attempt: &ConnectAttempt, succeeded: bool) {
        if let ConnectionState::Connecting { attempt: current, .. } = &self.state
            && *current != attempt.id
        {
            tracing::debug!(
                "[Session] Applying answer for attempt {} while attempt {} is pending",
                attempt.id,
                current
            );
        }

        self.state = if succeeded {
            ConnectionState::Connected {
                channel: attempt.channel.clone(),
            }
        } else {
            ConnectionState::Disconnected
        };
    }

    /// Whether a disconnect request has anything to tear down.
    pub fn needs_teardown(&self) -> bool {
        !matches!(self.state, ConnectionState::Disconnected)
    }

    pub fn mark_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}

impl Default for ConnectionSession {
    fn default() -> Self {
        Self::new()
    }
}
