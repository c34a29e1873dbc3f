//! EmuHawk discovery and process management.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use rc_core::RcError;
use rc_core::challenge::EmulatorLauncher;
use rc_core::error::Result;

const EMUHAWK_EXE: &str = "EmuHawk.exe";
const BIZHAWK_DIR: &str = "BizHawk";

const FIXED_LOCATIONS: &[&str] = &[
    r"C:\Program Files\BizHawk\EmuHawk.exe",
    r"C:\Program Files (x86)\BizHawk\EmuHawk.exe",
    r"C:\BizHawk\EmuHawk.exe",
    r"C:\EmuHawk\EmuHawk.exe",
];

const PROFILE_FOLDERS: &[&str] = &["Desktop", "Downloads", "Documents"];

/// Common install locations, in search order.
pub fn candidate_paths(user_profile: Option<&Path>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = FIXED_LOCATIONS.iter().map(PathBuf::from).collect();
    if let Some(profile) = user_profile {
        paths.extend(
            PROFILE_FOLDERS
                .iter()
                .map(|folder| profile.join(folder).join(BIZHAWK_DIR).join(EMUHAWK_EXE)),
        );
    }
    paths
}

/// First candidate that exists on disk.
pub fn find_emuhawk_in(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|path| path.is_file()).cloned()
}

/// Searches the common install locations of this machine.
pub fn detect_emuhawk() -> Option<PathBuf> {
    let profile = std::env::var_os("USERPROFILE")
        .map(PathBuf::from)
        .or_else(dirs::home_dir);
    let found = find_emuhawk_in(&candidate_paths(profile.as_deref()));
    match &found {
        Some(path) => tracing::info!("[EmuHawk] Found EmuHawk at {}", path.display()),
        None => tracing::info!("[EmuHawk] EmuHawk not found in common locations"),
    }
    found
}

/// Owns at most one running emulator process.
#[derive(Clone, Default)]
pub struct EmuHawkProcess {
    child: Arc<Mutex<Option<Child>>>,
}

impl EmuHawkProcess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last launched process is still alive.
    pub async fn is_running(&self) -> bool {
        let mut guard = self.child.lock().await;
        match guard.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => true,
            Some(Ok(Some(status))) => {
                tracing::info!("[EmuHawk] Process exited with {}", status);
                *guard = None;
                false
            }
            Some(Err(e)) => {
                tracing::warn!("[EmuHawk] Failed to query process: {}", e);
                false
            }
            None => false,
        }
    }

    /// Kills the owned process, if any.
    pub async fn shutdown(&self) {
        let mut guard = self.child.lock().await;
        if let Some(mut child) = guard.take() {
            if let Err(e) = child.kill().await {
                tracing::warn!("[EmuHawk] Error killing existing process: {}", e);
            } else {
                tracing::info!("[EmuHawk] Stopped previous process");
            }
        }
    }
}

#[async_trait]
impl EmulatorLauncher for EmuHawkProcess {
    async fn launch(&self, emulator: &Path, rom: &Path, script: &Path) -> Result<u32> {
        self.shutdown().await;

        tracing::info!(
            "[EmuHawk] Launching {} {} --lua {}",
            emulator.display(),
            rom.display(),
            script.display()
        );

        let mut child = Command::new(emulator)
            .arg(rom)
            .arg("--lua")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RcError::launch(format!("Failed to start EmuHawk: {}", e)))?;

        let pid = child.id().unwrap_or_default();

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::warn!("[EmuHawk] stderr: {}", line);
                }
            });
        }

        *self.child.lock().await = Some(child);
        Ok(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_candidate_order() {
        let candidates = candidate_paths(Some(Path::new("/home/ada")));
        assert_eq!(candidates.len(), 7);
        assert_eq!(candidates[0], PathBuf::from(r"C:\Program Files\BizHawk\EmuHawk.exe"));
        assert_eq!(
            candidates[4],
            Path::new("/home/ada/Desktop/BizHawk/EmuHawk.exe")
        );
        assert_eq!(candidate_paths(None).len(), 4);
    }

    #[test]
    fn test_find_first_existing() {
        let temp_dir = TempDir::new().unwrap();
        let downloads = temp_dir.path().join("Downloads/BizHawk");
        std::fs::create_dir_all(&downloads).unwrap();
        std::fs::write(downloads.join(EMUHAWK_EXE), b"").unwrap();

        let found = find_emuhawk_in(&candidate_paths(Some(temp_dir.path())));
        assert_eq!(found, Some(downloads.join(EMUHAWK_EXE)));
    }

    #[tokio::test]
    async fn test_launch_missing_binary_is_launch_error() {
        let temp_dir = TempDir::new().unwrap();
        let process = EmuHawkProcess::new();
        let err = process
            .launch(
                &temp_dir.path().join("missing.exe"),
                Path::new("rom.nes"),
                Path::new("main.lua"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RcError::Launch(_)));
        assert!(!process.is_running().await);
    }
}
