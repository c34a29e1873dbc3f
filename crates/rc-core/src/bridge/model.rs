//! Emulator bridge wire models.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// An action the bridge asks the running emulator to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BridgeAction {
    Pause,
    Resume,
    SetSpeed { speed: f64 },
    Screenshot,
    StartChallenge,
    /// Temporary speed multiplier triggered by a bits donation.
    SpeedBoost { duration: u32, speed: f64 },
    CelebrationEffect,
}

impl BridgeAction {
    /// Command name as understood by the Lua side.
    pub fn command_name(&self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::SetSpeed { .. } => "set_speed",
            Self::Screenshot => "screenshot",
            Self::StartChallenge => "start_challenge",
            Self::SpeedBoost { .. } => "speed_boost",
            Self::CelebrationEffect => "celebration_effect",
        }
    }

    /// Parameters forwarded alongside the command.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        match self {
            Self::SetSpeed { speed } => {
                params.insert("speed".to_string(), json!(speed));
            }
            Self::SpeedBoost { duration, speed } => {
                params.insert("duration".to_string(), json!(duration));
                params.insert("speed".to_string(), json!(speed));
            }
            Self::Pause
            | Self::Resume
            | Self::Screenshot
            | Self::StartChallenge
            | Self::CelebrationEffect => {}
        }
        params
    }

    /// Builds the request sent over the bridge, stamped with the current time.
    pub fn to_request(&self) -> BridgeRequest {
        BridgeRequest {
            command: self.command_name().to_string(),
            params: self.params(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Request accepted by the emulator bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub command: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    /// RFC 3339 timestamp of when the request was issued
    pub timestamp: String,
}

/// Response returned by the emulator bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}
