use anyhow::Result;
use colored::Colorize;

use rc_core::command::builtin_commands;
use rc_core::donation::boost_for_bits;

use super::Context;

pub fn chat_commands() {
    println!("{}", "Chat commands".bright_magenta().bold());
    for command in builtin_commands() {
        println!("  {:<22} {}", command.usage.bright_cyan(), command.description);
    }

    println!();
    println!("{}", "Cheers and subscriptions".bright_magenta().bold());
    for bits in [100, 50] {
        if let Some(boost) = boost_for_bits(bits) {
            println!(
                "  {:<22} {}x speed for {}s",
                format!("{}+ bits", bits).bright_cyan(),
                boost.speed,
                boost.duration_secs
            );
        }
    }
    println!("  {:<22} celebration effect", "subscriber".bright_cyan());
}

pub fn paths(ctx: &Context) -> Result<()> {
    let roms = ctx.paths.ensure_roms_dir()?;
    let rows = [
        ("User data", ctx.paths.data_dir().to_path_buf()),
        ("ROMs", roms),
        ("Challenges", ctx.paths.challenges_dir()),
        ("Config", ctx.paths.config_file()),
        ("Settings", ctx.paths.settings_file()),
        ("Completions", ctx.paths.completion_file()),
        ("Bridge commands", ctx.paths.command_file()),
        ("Logs", ctx.paths.logs_dir()),
    ];
    for (label, path) in rows {
        println!("{:<16} {}", label.bold(), path.display());
    }
    Ok(())
}
