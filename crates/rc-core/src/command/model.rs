//! Chat command parsing.

use serde::{Deserialize, Serialize};

/// Prefix that marks a chat line as a command.
pub const COMMAND_PREFIX: char = '!';

/// A command parsed out of a chat line. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Lowercased first token including the `!` prefix (empty for a bare `!`)
    pub name: String,
    /// Remaining lowercased tokens
    pub args: Vec<String>,
}

impl Command {
    /// Parses chat content into a command.
    ///
    /// Only content whose first character is `!` is a command; everything else
    /// returns `None`. The content is lowercased, trimmed and split on
    /// whitespace.
    pub fn parse(content: &str) -> Option<Self> {
        if !content.starts_with(COMMAND_PREFIX) {
            return None;
        }

        let normalized = content.to_lowercase();
        let mut tokens = normalized.split_whitespace();
        let first = tokens.next().unwrap_or_default();
        let name = if first == "!" {
            String::new()
        } else {
            first.to_string()
        };

        Some(Self {
            name,
            args: tokens.map(str::to_string).collect(),
        })
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// The normalized command line, as logged.
    pub fn to_line(&self) -> String {
        if self.args.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.args.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_commands() {
        for content in ["hello", "", " !pause", "pause!", "?speed 2"] {
            assert!(Command::parse(content).is_none(), "{:?}", content);
        }
    }

    #[test]
    fn test_lowercases_and_splits() {
        let cmd = Command::parse("!SPEED   2.5  Now ").unwrap();
        assert_eq!(cmd.name, "!speed");
        assert_eq!(cmd.args, vec!["2.5", "now"]);
        assert_eq!(cmd.to_line(), "!speed 2.5 now");
    }

    #[test]
    fn test_bare_prefix_has_empty_name() {
        let cmd = Command::parse("!").unwrap();
        assert!(cmd.name.is_empty());
        assert!(cmd.args.is_empty());

        let cmd = Command::parse("! pause").unwrap();
        assert!(cmd.name.is_empty());
        assert_eq!(cmd.arg(0), Some("pause"));
    }
}
