pub mod account;
pub mod challenges;
pub mod emuhawk;
pub mod info;
pub mod twitch;
pub mod watch;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use rc_application::AccountService;
use rc_core::config::AppConfig;
use rc_infrastructure::{AuthStore, ConfigService, GoogleTokenRefresher, RcPaths, SettingsStore};

/// Resolved locations and configuration shared by every command.
pub struct Context {
    pub paths: RcPaths,
    pub config: AppConfig,
}

impl Context {
    pub fn load(data_dir: Option<&Path>) -> Result<Self> {
        let paths = RcPaths::resolve(data_dir)?;
        let config = ConfigService::new(paths.config_file()).get_config();
        Ok(Self { paths, config })
    }

    pub fn settings(&self) -> Arc<SettingsStore> {
        Arc::new(SettingsStore::new(self.paths.settings_file()))
    }

    pub fn account_service(&self) -> AccountService {
        AccountService::new(
            Arc::new(AuthStore::new(self.paths.auth_file())),
            Arc::new(GoogleTokenRefresher::new(self.config.google.clone())),
        )
    }
}
