use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

use commands::Context;

#[derive(Parser)]
#[command(name = "retrochallenges")]
#[command(about = "RetroChallenges - EmuHawk challenge launcher with a Twitch chat bridge", long_about = None)]
struct Cli {
    /// Use this directory for config and user data instead of the system locations
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relay Twitch chat commands to the emulator (interactive console)
    Twitch {
        /// Channel to join right away
        channel: Option<String>,
    },
    /// List recently joined Twitch channels
    Channels,
    /// List the chat commands viewers can use
    Commands,
    /// List available challenges
    Challenges,
    /// Download the latest challenge scripts
    Assets,
    /// Launch a challenge in EmuHawk and watch for its completion
    Launch {
        game: String,
        /// Challenge name or its number in `challenges` output
        challenge: String,
        /// Submit the result when the challenge completes
        #[arg(long)]
        submit: bool,
    },
    /// Manage the EmuHawk location
    Emuhawk {
        #[command(subcommand)]
        action: EmuhawkAction,
    },
    /// Watch for challenge completions
    Watch {
        /// Submit each completion for the signed-in user
        #[arg(long)]
        submit: bool,
    },
    /// Show the signed-in user
    Whoami,
    /// Forget the signed-in user
    Logout,
    /// Show where RetroChallenges keeps its files
    Paths,
}

#[derive(Subcommand)]
enum EmuhawkAction {
    /// Search the usual install locations and save the result
    Detect,
    /// Save an explicit EmuHawk.exe path
    Set { path: PathBuf },
    /// Show the saved path
    Show,
    /// Forget the saved path
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::load(cli.data_dir.as_deref())?;

    let interactive = matches!(cli.command, Commands::Twitch { .. });
    let logging = logging::init(&ctx.paths.logs_dir(), interactive)?;

    match cli.command {
        Commands::Twitch { channel } => {
            commands::twitch::run(&ctx, channel, logging.diagnostics).await?
        }
        Commands::Channels => commands::twitch::list_channels(&ctx).await?,
        Commands::Commands => commands::info::chat_commands(),
        Commands::Challenges => commands::challenges::list(&ctx).await?,
        Commands::Assets => commands::challenges::refresh_assets(&ctx).await?,
        Commands::Launch {
            game,
            challenge,
            submit,
        } => commands::challenges::launch(&ctx, &game, &challenge, submit).await?,
        Commands::Emuhawk { action } => match action {
            EmuhawkAction::Detect => commands::emuhawk::detect(&ctx)?,
            EmuhawkAction::Set { path } => commands::emuhawk::set(&ctx, path)?,
            EmuhawkAction::Show => commands::emuhawk::show(&ctx),
            EmuhawkAction::Clear => commands::emuhawk::clear(&ctx)?,
        },
        Commands::Watch { submit } => commands::watch::run(&ctx, submit).await?,
        Commands::Whoami => commands::account::whoami(&ctx).await,
        Commands::Logout => commands::account::logout(&ctx)?,
        Commands::Paths => commands::info::paths(&ctx)?,
    }

    Ok(())
}
