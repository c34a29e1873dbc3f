//! Maps parsed chat commands to emulator bridge actions.

use crate::bridge::BridgeAction;

use super::builtin::{CommandKind, find_builtin_command};
use super::model::Command;

/// Speed used when `!speed` has no usable argument.
pub const DEFAULT_SPEED: f64 = 1.0;

/// Result of looking a command up in the dispatch table.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Recognized; this action should be sent to the bridge.
    Send(BridgeAction),
    /// Recognized, but the arguments select nothing to send (`!challenge foo`).
    Ignored { reason: String },
    /// Not in the table.
    Unknown { name: String },
}

/// Resolves a command against the fixed table.
///
/// Pure: sending the resulting action and logging its outcome is the
/// caller's business.
pub fn dispatch(command: &Command) -> DispatchOutcome {
    let Some(builtin) = find_builtin_command(&command.name) else {
        return DispatchOutcome::Unknown {
            name: command.name.clone(),
        };
    };

    match builtin.kind {
        CommandKind::Pause => DispatchOutcome::Send(BridgeAction::Pause),
        CommandKind::Resume => DispatchOutcome::Send(BridgeAction::Resume),
        CommandKind::Speed => DispatchOutcome::Send(BridgeAction::SetSpeed {
            speed: parse_speed(command.arg(0)),
        }),
        CommandKind::Screenshot => DispatchOutcome::Send(BridgeAction::Screenshot),
        CommandKind::Challenge => match command.arg(0) {
            Some("start") => DispatchOutcome::Send(BridgeAction::StartChallenge),
            Some(other) => DispatchOutcome::Ignored {
                reason: format!("unsupported !challenge action '{}'", other),
            },
            None => DispatchOutcome::Ignored {
                reason: "!challenge needs an action (try !challenge start)".to_string(),
            },
        },
    }
}

/// Parses a speed multiplier, falling back to [`DEFAULT_SPEED`].
///
/// Missing, non-numeric, non-finite, zero and negative values all fall back.
pub fn parse_speed(arg: Option<&str>) -> f64 {
    arg.and_then(|raw| raw.parse::<f64>().ok())
        .filter(|speed| speed.is_finite() && *speed > 0.0)
        .unwrap_or(DEFAULT_SPEED)
}
