//! Minimal IRCv3 line parsing for Twitch chat.
//!
//! Only what the bridge needs: tags, prefix nick, command, params and the
//! trailing parameter. `PRIVMSG` lines become [`ChatMessage`]s.

use std::collections::BTreeMap;

use super::message::ChatMessage;

/// One parsed IRC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcLine {
    pub tags: BTreeMap<String, String>,
    /// Nick part of the prefix (`nick!user@host`), or the whole prefix for servers.
    pub nick: Option<String>,
    pub command: String,
    pub params: Vec<String>,
    pub trailing: Option<String>,
}

impl IrcLine {
    /// Parses a single line. Returns `None` for empty or command-less input.
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        let mut tags = BTreeMap::new();
        if let Some(stripped) = rest.strip_prefix('@') {
            let (raw_tags, remainder) = stripped.split_once(' ')?;
            for pair in raw_tags.split(';') {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                if !key.is_empty() {
                    tags.insert(key.to_string(), unescape_tag_value(value));
                }
            }
            rest = remainder.trim_start();
        }

        let mut nick = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (prefix, remainder) = stripped.split_once(' ')?;
            nick = Some(prefix.split('!').next().unwrap_or(prefix).to_string());
            rest = remainder.trim_start();
        }

        let (head, trailing) = match rest.split_once(" :") {
            Some((head, trailing)) => (head, Some(trailing.to_string())),
            None => (rest, None),
        };

        let mut parts = head.split_whitespace();
        let command = parts.next()?.to_string();
        let params = parts.map(str::to_string).collect();

        Some(Self {
            tags,
            nick,
            command,
            params,
            trailing,
        })
    }

    /// Converts a `PRIVMSG` into a chat message; any other command yields `None`.
    pub fn into_chat_message(self) -> Option<ChatMessage> {
        if self.command != "PRIVMSG" {
            return None;
        }
        let username = self.nick?;
        let content = self.trailing.unwrap_or_default();
        Some(ChatMessage::with_raw_tags(username, content, self.tags))
    }
}

/// Reverses IRCv3 tag value escaping.
fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('\\') => out.push('\\'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
