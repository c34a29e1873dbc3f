//! Signed-in user and persisted authentication data.

use serde::{Deserialize, Serialize};

/// Google profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// OAuth tokens. `expires_at` is a Unix timestamp in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: i64,
}

impl AuthTokens {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }
}

/// Contents of `auth_data.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    pub user: UserInfo,
    #[serde(default)]
    pub tokens: Option<AuthTokens>,
    /// When the record was written (ms)
    pub timestamp: i64,
}

/// What a stored record means at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredAuth {
    /// Usable as-is.
    Valid(AuthData),
    /// Tokens expired; try to refresh with this token.
    NeedsRefresh { refresh_token: String },
    /// Unusable; the record should be cleared.
    Invalid { reason: String },
}

impl AuthData {
    pub fn new(user: UserInfo, tokens: Option<AuthTokens>, now_ms: i64) -> Self {
        Self {
            user,
            tokens,
            timestamp: now_ms,
        }
    }

    /// Classifies a loaded record.
    ///
    /// Identity-only records (no tokens) come from the server-side sign-in,
    /// where the tokens never reach the client, and are accepted.
    pub fn evaluate(self, now_ms: i64) -> StoredAuth {
        if self.user.name.trim().is_empty() || self.user.email.trim().is_empty() {
            return StoredAuth::Invalid {
                reason: "missing user information".to_string(),
            };
        }

        match &self.tokens {
            None => StoredAuth::Valid(self),
            Some(tokens) if !tokens.is_expired(now_ms) => StoredAuth::Valid(self),
            Some(tokens) => match &tokens.refresh_token {
                Some(refresh_token) if !refresh_token.is_empty() => StoredAuth::NeedsRefresh {
                    refresh_token: refresh_token.clone(),
                },
                _ => StoredAuth::Invalid {
                    reason: "tokens expired and no refresh token".to_string(),
                },
            },
        }
    }
}
