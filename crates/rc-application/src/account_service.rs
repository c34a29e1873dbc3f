//! Sign-in restoration and sign-out.

use std::sync::Arc;

use rc_core::auth::{AuthData, StoredAuth, TokenRefresher};
use rc_infrastructure::AuthStore;

pub struct AccountService {
    store: Arc<AuthStore>,
    refresher: Arc<dyn TokenRefresher>,
}

impl AccountService {
    pub fn new(store: Arc<AuthStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self { store, refresher }
    }

    /// Restores the stored sign-in.
    ///
    /// Unreadable or invalid records are deleted. Expired tokens are
    /// refreshed; a failed refresh also deletes the record.
    pub async fn restore(&self) -> Option<AuthData> {
        let stored = match self.store.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("[Auth] Error loading auth data: {}", e);
                self.clear_quietly();
                return None;
            }
        };

        match stored.evaluate(chrono::Utc::now().timestamp_millis()) {
            StoredAuth::Valid(data) => Some(data),
            StoredAuth::Invalid { reason } => {
                tracing::info!("[Auth] Invalid auth data: {}", reason);
                self.clear_quietly();
                None
            }
            StoredAuth::NeedsRefresh { refresh_token } => {
                match self.refresher.refresh(&refresh_token).await {
                    Ok((user, tokens)) => match self.store.save(user, Some(tokens)) {
                        Ok(data) => Some(data),
                        Err(e) => {
                            tracing::warn!("[Auth] Refreshed tokens could not be saved: {}", e);
                            None
                        }
                    },
                    Err(e) => {
                        tracing::warn!("[Auth] Token refresh failed: {}", e);
                        self.clear_quietly();
                        None
                    }
                }
            }
        }
    }

    pub fn sign_out(&self) -> rc_core::error::Result<()> {
        self.store.clear()
    }

    fn clear_quietly(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("[Auth] Error clearing auth data: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rc_core::RcError;
    use rc_core::auth::{AuthTokens, UserInfo};
    use rc_core::error::Result as RcResult;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct StubRefresher {
        succeed: bool,
        calls: Mutex<Vec<String>>,
    }

    impl StubRefresher {
        fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                succeed,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TokenRefresher for StubRefresher {
        async fn refresh(&self, refresh_token: &str) -> RcResult<(UserInfo, AuthTokens)> {
            self.calls.lock().unwrap().push(refresh_token.to_string());
            if !self.succeed {
                return Err(RcError::http("invalid_grant"));
            }
            Ok((
                user("Ada Refreshed"),
                AuthTokens {
                    access_token: "new-access".to_string(),
                    refresh_token: Some(refresh_token.to_string()),
                    expires_at: i64::MAX,
                },
            ))
        }
    }

    fn user(name: &str) -> UserInfo {
        UserInfo {
            name: name.to_string(),
            email: "ada@example.com".to_string(),
            id: "g-1".to_string(),
            picture: None,
        }
    }

    fn expired() -> AuthTokens {
        AuthTokens {
            access_token: "old".to_string(),
            refresh_token: Some("refresh-1".to_string()),
            expires_at: 1,
        }
    }

    fn setup(refresher: Arc<StubRefresher>) -> (TempDir, Arc<AuthStore>, AccountService) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(AuthStore::new(temp_dir.path().join("auth_data.json")));
        let service = AccountService::new(store.clone(), refresher);
        (temp_dir, store, service)
    }

    #[tokio::test]
    async fn test_no_record() {
        let (_dir, _store, service) = setup(StubRefresher::new(true));
        assert!(service.restore().await.is_none());
    }

    #[tokio::test]
    async fn test_identity_only_record_restores_without_refresh() {
        let refresher = StubRefresher::new(true);
        let (_dir, store, service) = setup(refresher.clone());
        store.save(user("Ada"), None).unwrap();

        let restored = service.restore().await.unwrap();
        assert_eq!(restored.user.name, "Ada");
        assert!(refresher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_tokens_are_refreshed_and_saved() {
        let refresher = StubRefresher::new(true);
        let (_dir, store, service) = setup(refresher.clone());
        store.save(user("Ada"), Some(expired())).unwrap();

        let restored = service.restore().await.unwrap();
        assert_eq!(restored.user.name, "Ada Refreshed");
        assert_eq!(refresher.calls.lock().unwrap().as_slice(), ["refresh-1"]);
        assert_eq!(
            store.load().unwrap().unwrap().tokens.unwrap().access_token,
            "new-access"
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_deletes_record() {
        let (_dir, store, service) = setup(StubRefresher::new(false));
        store.save(user("Ada"), Some(expired())).unwrap();

        assert!(service.restore().await.is_none());
        assert!(!store.exists());
    }

    #[tokio::test]
    async fn test_invalid_and_corrupt_records_are_deleted() {
        let (dir, store, service) = setup(StubRefresher::new(true));
        store.save(user(""), None).unwrap();
        assert!(service.restore().await.is_none());
        assert!(!store.exists());

        std::fs::write(dir.path().join("auth_data.json"), "not json").unwrap();
        assert!(service.restore().await.is_none());
        assert!(!store.exists());
    }

    #[tokio::test]
    async fn test_sign_out() {
        let (_dir, store, service) = setup(StubRefresher::new(true));
        store.save(user("Ada"), None).unwrap();
        service.sign_out().unwrap();
        assert!(service.restore().await.is_none());
    }
}
