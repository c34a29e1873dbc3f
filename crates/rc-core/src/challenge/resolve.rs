//! File locations for a challenge launch.

use std::path::{Path, PathBuf};

use super::model::{Challenge, Game};

const LUA_ENTRY_POINT: &str = "main.lua";
const NES_PLATFORM_DIR: &str = "nes";

/// Lowercases and replaces each whitespace run with one `_`.
///
/// Leading and trailing runs are replaced too, so `" Mega Man"` becomes
/// `_mega_man`.
pub fn snake_name(name: &str) -> String {
    let mut snake = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                snake.push('_');
            }
            in_whitespace = true;
        } else {
            snake.push(c);
            in_whitespace = false;
        }
    }
    snake
}

/// ROM file name expected under the ROM directory.
pub fn rom_file_name(game_name: &str) -> String {
    match game_name.to_lowercase().as_str() {
        "castlevania" => "castlevania.nes".to_string(),
        "super mario bros" => "super_mario_bros.nes".to_string(),
        _ => format!("{}.nes", snake_name(game_name)),
    }
}

/// Where the Lua script for `challenge` lives.
///
/// An explicit `lua` entry is relative to the challenges directory;
/// otherwise the conventional `nes/<game>/<challenge>/main.lua` layout is used.
pub fn lua_script_path(challenges_dir: &Path, game: &Game, challenge: &Challenge) -> PathBuf {
    match challenge.lua.as_deref().filter(|lua| !lua.trim().is_empty()) {
        Some(lua) => challenges_dir.join(lua),
        None => challenges_dir
            .join(NES_PLATFORM_DIR)
            .join(snake_name(&game.name))
            .join(snake_name(&challenge.name))
            .join(LUA_ENTRY_POINT),
    }
}
