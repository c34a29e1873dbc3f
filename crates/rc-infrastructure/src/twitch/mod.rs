pub mod relay;

pub use relay::{LineAction, TwitchIrcRelay, classify_line, login_lines};
