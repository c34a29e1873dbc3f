use anyhow::{Result, bail};
use colored::Colorize;
use std::path::PathBuf;

use rc_infrastructure::emuhawk::detect_emuhawk;

use super::Context;

pub fn detect(ctx: &Context) -> Result<()> {
    match detect_emuhawk() {
        Some(path) => {
            ctx.settings().set_emuhawk_path(Some(path.clone()))?;
            println!("{}", format!("EmuHawk found: {}", path.display()).green());
        }
        None => {
            println!(
                "{}",
                "EmuHawk not found in the usual locations. Use `retrochallenges emuhawk set <path>`."
                    .yellow()
            );
        }
    }
    Ok(())
}

pub fn set(ctx: &Context, path: PathBuf) -> Result<()> {
    if !path.is_file() {
        bail!("EmuHawk.exe not found at: {}", path.display());
    }
    ctx.settings().set_emuhawk_path(Some(path.clone()))?;
    println!("{}", format!("EmuHawk path saved: {}", path.display()).green());
    Ok(())
}

pub fn show(ctx: &Context) {
    match ctx.settings().emuhawk_path() {
        Some(path) if path.is_file() => println!("{}", path.display()),
        Some(path) => println!(
            "{} {}",
            path.display(),
            "(file no longer exists)".yellow()
        ),
        None => println!("{}", "EmuHawk path not configured".bright_black()),
    }
}

pub fn clear(ctx: &Context) -> Result<()> {
    ctx.settings().set_emuhawk_path(None)?;
    println!("EmuHawk path cleared");
    Ok(())
}
