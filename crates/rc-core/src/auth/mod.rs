//! Authentication state.

pub mod model;

use async_trait::async_trait;

use crate::error::Result;

pub use model::{AuthData, AuthTokens, StoredAuth, UserInfo};

/// Exchanges a refresh token for fresh tokens and the current profile.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<(UserInfo, AuthTokens)>;
}
