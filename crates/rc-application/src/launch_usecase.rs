//! Challenge launch use case.
//!
//! Resolves the ROM and Lua script for a catalog entry, checks every
//! prerequisite and starts EmuHawk.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use rc_core::RcError;
use rc_core::challenge::{
    Challenge, ChallengeCatalog, EmulatorLauncher, Game, lua_script_path, rom_file_name,
};
use rc_infrastructure::{RcPaths, SettingsStore};

/// Why a challenge could not be launched. Each variant is shown to the user.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Unknown game: {0}")]
    GameNotFound(String),

    #[error("{game} has no challenge named {selector}")]
    ChallengeNotFound { game: String, selector: String },

    #[error(
        "Could not find the {game} ROM file. Place it in the roms folder as {rom_file}.\nExpected location: {}",
        .path.display()
    )]
    RomMissing {
        game: String,
        rom_file: String,
        path: PathBuf,
    },

    #[error(
        "Could not find the challenge script for {challenge}.\nExpected location: {}\nRun `retrochallenges assets` to download the scripts.",
        .path.display()
    )]
    ScriptMissing { challenge: String, path: PathBuf },

    #[error("EmuHawk path not configured. Run `retrochallenges emuhawk detect` or `emuhawk set <path>`.")]
    EmuHawkNotConfigured,

    #[error("EmuHawk.exe not found at: {}", .0.display())]
    EmuHawkMissing(PathBuf),

    #[error("Failed to start EmuHawk: {}", .0.message())]
    Start(RcError),
}

/// Everything needed to start one challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub game: String,
    pub challenge: String,
    pub emuhawk: PathBuf,
    pub rom: PathBuf,
    pub script: PathBuf,
}

pub struct LaunchChallengeUseCase {
    roms_dir: PathBuf,
    challenges_dir: PathBuf,
    settings: Arc<SettingsStore>,
    launcher: Arc<dyn EmulatorLauncher>,
}

impl LaunchChallengeUseCase {
    pub fn new(
        paths: &RcPaths,
        settings: Arc<SettingsStore>,
        launcher: Arc<dyn EmulatorLauncher>,
    ) -> Self {
        Self {
            roms_dir: paths.roms_dir(),
            challenges_dir: paths.challenges_dir(),
            settings,
            launcher,
        }
    }

    /// Looks up a game by name and a challenge by name or 1-based number.
    pub fn select<'a>(
        catalog: &'a ChallengeCatalog,
        game: &str,
        challenge: &str,
    ) -> Result<(&'a Game, &'a Challenge), LaunchError> {
        let found_game = catalog
            .find_game(game)
            .ok_or_else(|| LaunchError::GameNotFound(game.to_string()))?;
        let found_challenge =
            found_game
                .find_challenge(challenge)
                .ok_or_else(|| LaunchError::ChallengeNotFound {
                    game: found_game.name.clone(),
                    selector: challenge.to_string(),
                })?;
        Ok((found_game, found_challenge))
    }

    /// Checks ROM, script and emulator, in that order.
    pub fn plan(&self, game: &Game, challenge: &Challenge) -> Result<LaunchPlan, LaunchError> {
        let rom_file = rom_file_name(&game.name);
        let rom = self.roms_dir.join(&rom_file);
        tracing::debug!("[Launch] Looking for ROM at {}", rom.display());
        if !rom.is_file() {
            return Err(LaunchError::RomMissing {
                game: game.name.clone(),
                rom_file,
                path: rom,
            });
        }

        let script = lua_script_path(&self.challenges_dir, game, challenge);
        tracing::debug!("[Launch] Looking for Lua script at {}", script.display());
        if !script.is_file() {
            return Err(LaunchError::ScriptMissing {
                challenge: challenge.name.clone(),
                path: script,
            });
        }

        let emuhawk = self
            .settings
            .emuhawk_path()
            .ok_or(LaunchError::EmuHawkNotConfigured)?;
        if !emuhawk.is_file() {
            return Err(LaunchError::EmuHawkMissing(emuhawk));
        }

        Ok(LaunchPlan {
            game: game.name.clone(),
            challenge: challenge.name.clone(),
            emuhawk,
            rom,
            script,
        })
    }

    /// Plans and starts the challenge. Returns the plan and the emulator pid.
    pub async fn launch(
        &self,
        game: &Game,
        challenge: &Challenge,
    ) -> Result<(LaunchPlan, u32), LaunchError> {
        let plan = self.plan(game, challenge)?;
        let pid = self
            .launcher
            .launch(&plan.emuhawk, &plan.rom, &plan.script)
            .await
            .map_err(LaunchError::Start)?;
        tracing::info!(
            "[Launch] Started {} / {} (pid {})",
            plan.game,
            plan.challenge,
            pid
        );
        Ok((plan, pid))
    }
}
