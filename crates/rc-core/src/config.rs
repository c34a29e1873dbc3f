//! Application configuration models.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CHALLENGES_URL: &str = "https://raw.githubusercontent.com/mattd1980/retrochallenges-assets/refs/heads/main/challenges.json";
pub const DEFAULT_ASSETS_URL: &str =
    "https://github.com/mattd1980/retrochallenges-assets/archive/refs/heads/main.zip";
pub const DEFAULT_SUBMIT_URL: &str = "https://retrochallenges.com/public/api/submit_result.php";
pub const DEFAULT_TWITCH_WEBSOCKET_URL: &str = "wss://irc-ws.chat.twitch.tv:443";
/// Anonymous Twitch login: read-only access to public chat.
pub const DEFAULT_TWITCH_NICK: &str = "justinfan12345";

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub challenges: ChallengesConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub twitch: TwitchConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: "YOUR_GOOGLE_CLIENT_ID".to_string(),
            client_secret: "YOUR_GOOGLE_CLIENT_SECRET".to_string(),
            redirect_uri: "http://localhost:8080/callback".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChallengesConfig {
    /// URL of `challenges.json`
    pub url: String,
    /// ZIP archive holding the Lua challenge scripts
    #[serde(default = "default_assets_url")]
    pub assets_url: String,
}

fn default_assets_url() -> String {
    DEFAULT_ASSETS_URL.to_string()
}

impl Default for ChallengesConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CHALLENGES_URL.to_string(),
            assets_url: default_assets_url(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Endpoint that records challenge results
    pub submit_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            submit_url: DEFAULT_SUBMIT_URL.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TwitchConfig {
    pub websocket_url: String,
    pub nick: String,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            websocket_url: DEFAULT_TWITCH_WEBSOCKET_URL.to_string(),
            nick: DEFAULT_TWITCH_NICK.to_string(),
        }
    }
}

/// Environment variables that override `config.toml` values.
pub struct EnvOverride;

impl EnvOverride {
    pub const GOOGLE_CLIENT_ID: &'static str = "GOOGLE_CLIENT_ID";
    pub const GOOGLE_CLIENT_SECRET: &'static str = "GOOGLE_CLIENT_SECRET";
    pub const GOOGLE_REDIRECT_URI: &'static str = "GOOGLE_REDIRECT_URI";
    pub const CHALLENGES_URL: &'static str = "CHALLENGES_URL";
    pub const RESULTS_API_URL: &'static str = "RESULTS_API_URL";
}

impl AppConfig {
    /// Applies overrides from a variable lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(EnvOverride::GOOGLE_CLIENT_ID) {
            self.google.client_id = value;
        }
        if let Some(value) = get(EnvOverride::GOOGLE_CLIENT_SECRET) {
            self.google.client_secret = value;
        }
        if let Some(value) = get(EnvOverride::GOOGLE_REDIRECT_URI) {
            self.google.redirect_uri = value;
        }
        if let Some(value) = get(EnvOverride::CHALLENGES_URL) {
            self.challenges.url = value;
        }
        if let Some(value) = get(EnvOverride::RESULTS_API_URL) {
            self.api.submit_url = value;
        }
    }
}

/// User-editable settings persisted in `app_config.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emuhawk_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [challenges]
            url = "https://example.com/challenges.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.challenges.url, "https://example.com/challenges.json");
        assert_eq!(config.challenges.assets_url, DEFAULT_ASSETS_URL);
        assert_eq!(config.twitch, TwitchConfig::default());
        assert_eq!(config.api.submit_url, DEFAULT_SUBMIT_URL);
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("GOOGLE_CLIENT_ID", "id-from-env"),
            ("CHALLENGES_URL", "https://mirror.example/challenges.json"),
            ("GOOGLE_CLIENT_SECRET", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.google.client_id, "id-from-env");
        assert_eq!(config.challenges.url, "https://mirror.example/challenges.json");
        assert_eq!(config.google.client_secret, "YOUR_GOOGLE_CLIENT_SECRET");
    }

    #[test]
    fn test_settings_json_shape() {
        let settings = AppSettings {
            emuhawk_path: Some("C:\\BizHawk\\EmuHawk.exe".to_string()),
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json, r#"{"emuhawkPath":"C:\\BizHawk\\EmuHawk.exe"}"#);
        let empty: AppSettings = serde_json::from_str("{}").unwrap();
        assert!(empty.emuhawk_path.is_none());
    }
}
