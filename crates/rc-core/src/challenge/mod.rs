//! Challenge catalog and launch file resolution.

pub mod model;
pub mod resolve;

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

pub use model::{Challenge, ChallengeCatalog, Game};
pub use resolve::{lua_script_path, rom_file_name, snake_name};

/// Source of the challenge catalog. Implementations never fail; they fall
/// back to [`ChallengeCatalog::fallback`].
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> ChallengeCatalog;
}

/// Starts the emulator with a ROM and a challenge script.
#[async_trait]
pub trait EmulatorLauncher: Send + Sync {
    /// Returns the process id of the started emulator.
    async fn launch(&self, emulator: &Path, rom: &Path, script: &Path) -> Result<u32>;
}
