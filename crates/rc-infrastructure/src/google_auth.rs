//! Google OAuth token refresh.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use rc_core::RcError;
use rc_core::auth::{AuthTokens, TokenRefresher, UserInfo};
use rc_core::config::GoogleConfig;
use rc_core::error::Result;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct GoogleUser {
    name: String,
    email: String,
    id: String,
    #[serde(default)]
    picture: Option<String>,
}

#[derive(Clone)]
pub struct GoogleTokenRefresher {
    client: Client,
    config: GoogleConfig,
}

impl GoogleTokenRefresher {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn fetch_user(&self, access_token: &str) -> Result<UserInfo> {
        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| RcError::http(format!("User info request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RcError::http(format!("User info error ({})", status)));
        }

        let user: GoogleUser = response
            .json()
            .await
            .map_err(|e| RcError::http(format!("Failed to parse user info: {}", e)))?;

        Ok(UserInfo {
            name: user.name,
            email: user.email,
            id: user.id,
            picture: user.picture,
        })
    }
}

#[async_trait]
impl TokenRefresher for GoogleTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<(UserInfo, AuthTokens)> {
        let body = RefreshRequest {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            refresh_token,
            grant_type: "refresh_token",
        };

        let response = self
            .client
            .post(TOKEN_URL)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| RcError::http(format!("Token refresh request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RcError::http(format!(
                "Token refresh error ({}): {}",
                status, error_text
            )));
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| RcError::http(format!("Failed to parse token response: {}", e)))?;

        let user = self.fetch_user(&refreshed.access_token).await?;
        let tokens = AuthTokens {
            access_token: refreshed.access_token,
            refresh_token: Some(refresh_token.to_string()),
            expires_at: chrono::Utc::now().timestamp_millis() + refreshed.expires_in * 1000,
        };

        Ok((user, tokens))
    }
}
