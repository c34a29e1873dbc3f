//! Unified path management for RetroChallenges files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/retrochallenges/        # Config directory
//! └── config.toml                   # Application configuration
//!
//! ~/.local/share/retrochallenges/   # User data directory
//! ├── app_config.json               # User settings (EmuHawk path)
//! ├── auth_data.json                # Signed-in user
//! ├── local_storage.json            # Key-value storage (recent channels)
//! ├── challenge_data.json           # Written by challenge scripts on completion
//! ├── bizhawk_commands.jsonl        # Commands consumed by the emulator script
//! ├── roms/
//! ├── challenges/
//! └── logs/
//!     └── retrochallenges.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "retrochallenges";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config/data directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolved locations of every file the launcher reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl RcPaths {
    /// Platform directories (XDG on Linux, AppData on Windows).
    pub fn from_system() -> Result<Self, PathError> {
        let config_dir = dirs::config_dir().ok_or(PathError::HomeDirNotFound)?;
        let data_dir = dirs::data_dir().ok_or(PathError::HomeDirNotFound)?;
        Ok(Self {
            config_dir: config_dir.join(APP_DIR_NAME),
            data_dir: data_dir.join(APP_DIR_NAME),
        })
    }

    /// Places both directories under `root`. Used by `--data-dir` and tests.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    /// `with_root` when an override is given, the system directories otherwise.
    pub fn resolve(root: Option<&Path>) -> Result<Self, PathError> {
        match root {
            Some(root) => Ok(Self::with_root(root)),
            None => Self::from_system(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join("app_config.json")
    }

    pub fn auth_file(&self) -> PathBuf {
        self.data_dir.join("auth_data.json")
    }

    pub fn local_storage_file(&self) -> PathBuf {
        self.data_dir.join("local_storage.json")
    }

    pub fn completion_file(&self) -> PathBuf {
        self.data_dir.join("challenge_data.json")
    }

    pub fn command_file(&self) -> PathBuf {
        self.data_dir.join("bizhawk_commands.jsonl")
    }

    pub fn roms_dir(&self) -> PathBuf {
        self.data_dir.join("roms")
    }

    pub fn challenges_dir(&self) -> PathBuf {
        self.data_dir.join("challenges")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Creates the ROM directory if needed and returns it.
    pub fn ensure_roms_dir(&self) -> std::io::Result<PathBuf> {
        let dir = self.roms_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
