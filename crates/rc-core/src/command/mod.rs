//! Chat commands: parsing, the builtin table and dispatch to bridge actions.

pub mod builtin;
pub mod dispatcher;
pub mod model;

pub use builtin::{BuiltinChatCommand, CommandKind, builtin_commands, find_builtin_command};
pub use dispatcher::{DEFAULT_SPEED, DispatchOutcome, dispatch, parse_speed};
pub use model::{COMMAND_PREFIX, Command};
