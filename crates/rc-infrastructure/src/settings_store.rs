//! Persistence of user settings (`app_config.json`).

use std::path::PathBuf;

use rc_core::config::AppSettings;
use rc_core::error::Result;

use crate::storage::AtomicFile;

pub struct SettingsStore {
    file: AtomicFile<AppSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::json(path),
        }
    }

    /// Current settings; defaults when the file is missing or unreadable.
    pub fn load(&self) -> AppSettings {
        match self.file.load() {
            Ok(settings) => settings.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("[Settings] Ignoring unreadable settings file: {}", e);
                AppSettings::default()
            }
        }
    }

    pub fn emuhawk_path(&self) -> Option<PathBuf> {
        self.load().emuhawk_path.map(PathBuf::from)
    }

    pub fn set_emuhawk_path(&self, path: Option<PathBuf>) -> Result<AppSettings> {
        let value = path.map(|p| p.to_string_lossy().into_owned());
        let settings = self.file.update(AppSettings::default(), |settings| {
            settings.emuhawk_path = value;
            Ok(())
        })?;
        tracing::info!(
            "[Settings] EmuHawk path set to {}",
            settings.emuhawk_path.as_deref().unwrap_or("<none>")
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_emuhawk_path_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = SettingsStore::new(temp_dir.path().join("app_config.json"));
        assert!(store.emuhawk_path().is_none());

        store
            .set_emuhawk_path(Some(PathBuf::from("/opt/bizhawk/EmuHawk.exe")))
            .unwrap();
        assert_eq!(
            store.emuhawk_path(),
            Some(PathBuf::from("/opt/bizhawk/EmuHawk.exe"))
        );

        store.set_emuhawk_path(None).unwrap();
        assert!(store.emuhawk_path().is_none());
    }

    #[test]
    fn test_corrupt_settings_load_as_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app_config.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let store = SettingsStore::new(path);
        assert_eq!(store.load(), AppSettings::default());
    }
}
