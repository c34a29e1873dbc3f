//! Chat message tags and their validated schema.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Well-known Twitch IRC tag names.
pub struct Tag;

impl Tag {
    pub const BITS: &'static str = "bits";
    pub const SUBSCRIBER: &'static str = "subscriber";
    pub const BADGES: &'static str = "badges";
    pub const DISPLAY_NAME: &'static str = "display-name";
}

/// Tags attached to a chat message, validated at ingestion.
///
/// The relay hands over a loose string map; everything the bridge acts on is
/// lifted into typed fields here so the rest of the core never re-parses raw
/// strings. The original map is kept in `raw` for display purposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTags {
    /// Cheered bits, present only when the `bits` tag is a valid unsigned integer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits: Option<u32>,
    /// True iff the `subscriber` tag is exactly `"1"`.
    #[serde(default)]
    pub subscriber: bool,
    /// Badge names without their version suffix (`subscriber/12` -> `subscriber`).
    #[serde(default)]
    pub badges: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub raw: BTreeMap<String, String>,
}

impl MessageTags {
    /// Builds the typed schema from a raw tag map.
    pub fn from_raw(raw: BTreeMap<String, String>) -> Self {
        let bits = raw.get(Tag::BITS).and_then(|value| {
            let parsed = value.trim().parse::<u32>().ok();
            if parsed.is_none() {
                tracing::warn!("[Chat] Ignoring malformed bits tag: {:?}", value);
            }
            parsed
        });

        let subscriber = raw.get(Tag::SUBSCRIBER).is_some_and(|v| v == "1");

        let badges = raw
            .get(Tag::BADGES)
            .map(|value| parse_badges(value))
            .unwrap_or_default();

        let display_name = raw
            .get(Tag::DISPLAY_NAME)
            .filter(|name| !name.is_empty())
            .cloned();

        Self {
            bits,
            subscriber,
            badges,
            display_name,
            raw,
        }
    }

    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges.contains(badge)
    }

    pub fn is_moderator(&self) -> bool {
        self.has_badge("moderator") || self.has_badge("broadcaster")
    }
}

fn parse_badges(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .filter_map(|badge| {
            let name = badge.split('/').next().unwrap_or("").trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_bits_parsed_when_numeric() {
        let tags = MessageTags::from_raw(raw(&[("bits", "150")]));
        assert_eq!(tags.bits, Some(150));
    }

    #[test]
    fn test_malformed_bits_dropped() {
        let tags = MessageTags::from_raw(raw(&[("bits", "lots")]));
        assert_eq!(tags.bits, None);
        assert_eq!(tags.raw.get("bits").map(String::as_str), Some("lots"));
    }

    #[test]
    fn test_subscriber_requires_literal_one() {
        assert!(MessageTags::from_raw(raw(&[("subscriber", "1")])).subscriber);
        assert!(!MessageTags::from_raw(raw(&[("subscriber", "0")])).subscriber);
        assert!(!MessageTags::from_raw(raw(&[("subscriber", "true")])).subscriber);
        assert!(!MessageTags::from_raw(BTreeMap::new()).subscriber);
    }

    #[test]
    fn test_badges_strip_versions() {
        let tags = MessageTags::from_raw(raw(&[("badges", "moderator/1,subscriber/12")]));
        assert!(tags.has_badge("moderator"));
        assert!(tags.has_badge("subscriber"));
        assert!(tags.is_moderator());
        assert_eq!(tags.badges.len(), 2);
    }

    #[test]
    fn test_empty_display_name_ignored() {
        let tags = MessageTags::from_raw(raw(&[("display-name", "")]));
        assert!(tags.display_name.is_none());
    }
}
