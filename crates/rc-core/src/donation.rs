//! Bits and subscription classification.
//!
//! Runs on every chat message, command or not, and independently of command
//! dispatch: one message can be both a command and a cheer.

use serde::{Deserialize, Serialize};

use crate::bridge::BridgeAction;
use crate::chat::ChatMessage;

/// A temporary emulator speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBoost {
    pub speed: f64,
    pub duration_secs: u32,
}

impl SpeedBoost {
    pub fn to_action(self) -> BridgeAction {
        BridgeAction::SpeedBoost {
            duration: self.duration_secs,
            speed: self.speed,
        }
    }
}

/// Secondary events detected in a message's tags.
#[derive(Debug, Clone, PartialEq)]
pub enum DonationEvent {
    Bits {
        username: String,
        amount: u32,
        boost: Option<SpeedBoost>,
    },
    Subscription {
        username: String,
    },
}

impl DonationEvent {
    /// Log line announcing the event.
    pub fn describe(&self) -> String {
        match self {
            Self::Bits {
                username, amount, ..
            } => format!("{} donated {} bits!", username, amount),
            Self::Subscription { username } => format!("{} subscribed!", username),
        }
    }

    /// Bridge action the event triggers, if any.
    pub fn action(&self) -> Option<BridgeAction> {
        match self {
            Self::Bits { boost, .. } => boost.map(SpeedBoost::to_action),
            Self::Subscription { .. } => Some(BridgeAction::CelebrationEffect),
        }
    }
}

/// Boost tier for a cheer: 100+ bits doubles speed for 30s, 50-99 gives
/// 1.5x for 15s, anything smaller only gets a log entry.
pub fn boost_for_bits(bits: u32) -> Option<SpeedBoost> {
    if bits >= 100 {
        Some(SpeedBoost {
            speed: 2.0,
            duration_secs: 30,
        })
    } else if bits >= 50 {
        Some(SpeedBoost {
            speed: 1.5,
            duration_secs: 15,
        })
    } else {
        None
    }
}

/// Inspects a message's tags for bits and subscription events.
///
/// The bits check comes first; both may fire for the same message.
pub fn classify(message: &ChatMessage) -> Vec<DonationEvent> {
    let mut events = Vec::new();

    if let Some(amount) = message.tags.bits {
        events.push(DonationEvent::Bits {
            username: message.username.clone(),
            amount,
            boost: boost_for_bits(amount),
        });
    }

    if message.tags.subscriber {
        events.push(DonationEvent::Subscription {
            username: message.username.clone(),
        });
    }

    events
}
