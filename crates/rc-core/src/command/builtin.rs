//! Chat commands understood by the bridge.
//!
//! The table is fixed: viewers cannot define their own commands. It is built
//! once on first access and cached for the lifetime of the process.

use serde::Serialize;
use std::sync::OnceLock;

/// What a recognized command does once dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Pause,
    Resume,
    Speed,
    Screenshot,
    Challenge,
}

/// A chat command provided by the bridge.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltinChatCommand {
    /// Command name including the leading `!`
    pub name: &'static str,
    /// Usage format (e.g., "!speed <multiplier>")
    pub usage: &'static str,
    /// Human-readable description
    pub description: &'static str,
    pub kind: CommandKind,
}

impl BuiltinChatCommand {
    pub const fn new(
        name: &'static str,
        usage: &'static str,
        description: &'static str,
        kind: CommandKind,
    ) -> Self {
        Self {
            name,
            usage,
            description,
            kind,
        }
    }
}

static BUILTIN_COMMANDS: OnceLock<Vec<BuiltinChatCommand>> = OnceLock::new();

/// Returns all chat commands the bridge recognizes.
pub fn builtin_commands() -> &'static [BuiltinChatCommand] {
    BUILTIN_COMMANDS.get_or_init(|| {
        vec![
            BuiltinChatCommand::new(
                "!pause",
                "!pause",
                "Pause the emulator",
                CommandKind::Pause,
            ),
            BuiltinChatCommand::new(
                "!resume",
                "!resume",
                "Resume the emulator",
                CommandKind::Resume,
            ),
            BuiltinChatCommand::new(
                "!speed",
                "!speed <multiplier>",
                "Set emulation speed (defaults to 1.0 when the multiplier is missing or invalid)",
                CommandKind::Speed,
            ),
            BuiltinChatCommand::new(
                "!screenshot",
                "!screenshot",
                "Take a screenshot of the current frame",
                CommandKind::Screenshot,
            ),
            BuiltinChatCommand::new(
                "!challenge",
                "!challenge start",
                "Start the loaded challenge",
                CommandKind::Challenge,
            ),
        ]
    })
}

/// Find a builtin command by its full name (with `!`).
pub fn find_builtin_command(name: &str) -> Option<&'static BuiltinChatCommand> {
    builtin_commands().iter().find(|cmd| cmd.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_commands_initialized() {
        let commands = builtin_commands();
        assert_eq!(commands.len(), 5);
        assert!(commands.iter().all(|c| c.name.starts_with('!')));
    }

    #[test]
    fn test_find_builtin_command() {
        assert_eq!(
            find_builtin_command("!speed").map(|c| c.kind),
            Some(CommandKind::Speed)
        );
        assert!(find_builtin_command("speed").is_none());
        assert!(find_builtin_command("!dance").is_none());
        assert!(find_builtin_command("").is_none());
    }
}
