//! Configuration service.
//!
//! Loads `config.toml` (written with defaults on first run), applies
//! environment overrides and caches the result.

use rc_core::config::AppConfig;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::storage::{AtomicFile, AtomicFileError};

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Configuration service that loads and caches [`AppConfig`].
#[derive(Clone)]
pub struct ConfigService {
    path: PathBuf,
    env: EnvLookup,
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Reads overrides from the process environment.
    pub fn new(path: PathBuf) -> Self {
        Self::with_env(path, |name| std::env::var(name).ok())
    }

    pub fn with_env<F>(path: PathBuf, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            path,
            env: Arc::new(env),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A config file that cannot be read is logged and replaced by defaults
    /// for this run; it is not overwritten.
    pub fn get_config(&self) -> AppConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let mut loaded = self.load_config().unwrap_or_else(|e| {
            tracing::warn!(
                "[Config] Failed to load {}: {}. Using defaults.",
                self.path.display(),
                e
            );
            AppConfig::default()
        });
        loaded.apply_overrides(|name| (self.env)(name));

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.path
    }

    fn load_config(&self) -> Result<AppConfig, AtomicFileError> {
        let file = AtomicFile::<AppConfig>::toml(self.path.clone());
        match file.load()? {
            Some(config) => Ok(config),
            None => {
                let default_config = AppConfig::default();
                file.save(&default_config)?;
                tracing::info!("[Config] Created default config at {}", self.path.display());
                Ok(default_config)
            }
        }
    }
}
