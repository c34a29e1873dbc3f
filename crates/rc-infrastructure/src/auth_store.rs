//! `auth_data.json` persistence.

use std::path::PathBuf;

use rc_core::auth::{AuthData, AuthTokens, UserInfo};
use rc_core::error::Result;

use crate::storage::AtomicFile;

pub struct AuthStore {
    file: AtomicFile<AuthData>,
}

impl AuthStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::json(path),
        }
    }

    /// Raw stored record. Parse failures are errors so the caller can clear
    /// the file.
    pub fn load(&self) -> Result<Option<AuthData>> {
        Ok(self.file.load()?)
    }

    pub fn save(&self, user: UserInfo, tokens: Option<AuthTokens>) -> Result<AuthData> {
        let data = AuthData::new(user, tokens, chrono::Utc::now().timestamp_millis());
        self.file.save(&data)?;
        tracing::info!("[Auth] Saved sign-in for {}", data.user.email);
        Ok(data)
    }

    /// Deletes the stored record. Missing files are fine.
    pub fn clear(&self) -> Result<()> {
        self.file.delete()?;
        tracing::info!("[Auth] Cleared stored sign-in");
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.file.path().exists()
    }
}
