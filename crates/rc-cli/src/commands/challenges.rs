use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;

use rc_application::LaunchChallengeUseCase;
use rc_core::challenge::{CatalogSource, ChallengeCatalog, rom_file_name};
use rc_infrastructure::{AssetsClient, EmuHawkProcess, HttpCatalogSource};

use super::Context;
use super::watch::{self, Submission};

const PROCESS_CHECK_INTERVAL: Duration = Duration::from_secs(2);

async fn catalog(ctx: &Context) -> ChallengeCatalog {
    HttpCatalogSource::new(ctx.config.challenges.url.clone())
        .fetch_catalog()
        .await
}

pub async fn list(ctx: &Context) -> Result<()> {
    let catalog = catalog(ctx).await;
    let roms_dir = ctx.paths.ensure_roms_dir()?;

    println!(
        "{}",
        format!("{} challenge(s)", catalog.challenge_count())
            .bright_magenta()
            .bold()
    );
    for game in &catalog.games {
        let rom = rom_file_name(&game.name);
        let rom_status = if roms_dir.join(&rom).is_file() {
            "ROM found".green()
        } else {
            format!("missing roms/{}", rom).yellow()
        };
        println!();
        println!("{} {}", game.name.bold(), format!("({})", rom_status).dimmed());
        for (index, challenge) in game.challenges.iter().enumerate() {
            println!("  {:>2}. {}", index + 1, challenge.name);
        }
    }
    Ok(())
}

/// Downloads the challenge scripts into the challenges directory.
pub async fn refresh_assets(ctx: &Context) -> Result<()> {
    let client = AssetsClient::new(ctx.config.challenges.assets_url.clone());
    let target = ctx.paths.challenges_dir();
    println!("{}", format!("Downloading {}", client.url()).bright_black());

    let count = client.refresh(&target).await?;
    println!(
        "{}",
        format!("Installed {} asset file(s) into {}", count, target.display()).bright_green()
    );
    Ok(())
}

pub async fn launch(ctx: &Context, game: &str, challenge: &str, submit: bool) -> Result<()> {
    let submission = if submit {
        Some(Submission::prepare(ctx).await?)
    } else {
        None
    };

    let catalog = catalog(ctx).await;
    let (game, challenge) = LaunchChallengeUseCase::select(&catalog, game, challenge)?;

    let process = EmuHawkProcess::new();
    let usecase = LaunchChallengeUseCase::new(&ctx.paths, ctx.settings(), Arc::new(process.clone()));

    // Watch before launching so a quick completion is not missed.
    let mut completions = watch::start_monitor(ctx);
    let (plan, pid) = usecase.launch(game, challenge).await?;

    println!(
        "{}",
        format!("Launched {} - {} (pid {})", plan.game, plan.challenge, pid).bright_green()
    );
    println!(
        "{}",
        "Waiting for completion. Ctrl-C stops the emulator and exits.".bright_black()
    );

    let mut check = tokio::time::interval(PROCESS_CHECK_INTERVAL);
    loop {
        tokio::select! {
            Some(record) = completions.recv() => watch::report(&record, submission.as_ref()).await,
            _ = check.tick() => {
                if !process.is_running().await {
                    println!("{}", "EmuHawk closed.".bright_black());
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                process.shutdown().await;
                break;
            }
        }
    }
    Ok(())
}
