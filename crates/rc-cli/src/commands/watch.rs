use anyhow::{Result, anyhow};
use colored::Colorize;
use std::sync::Arc;
use tokio::sync::mpsc;

use rc_application::CompletionReporter;
use rc_core::auth::UserInfo;
use rc_core::completion::CompletionRecord;
use rc_infrastructure::{CompletionMonitor, HttpResultSubmitter};

use super::Context;

/// Signed-in user plus the client used to submit their results.
pub struct Submission {
    user: UserInfo,
    reporter: CompletionReporter,
}

impl Submission {
    /// Restores the signed-in user. Fails when nobody is signed in.
    pub async fn prepare(ctx: &Context) -> Result<Self> {
        let auth = ctx
            .account_service()
            .restore()
            .await
            .ok_or_else(|| anyhow!("Not signed in; results cannot be submitted"))?;
        let submitter = Arc::new(HttpResultSubmitter::new(ctx.config.api.submit_url.clone()));
        Ok(Self {
            user: auth.user,
            reporter: CompletionReporter::new(submitter),
        })
    }
}

pub fn start_monitor(ctx: &Context) -> mpsc::UnboundedReceiver<CompletionRecord> {
    let (tx, rx) = mpsc::unbounded_channel();
    CompletionMonitor::new(ctx.paths.completion_file()).spawn(tx);
    rx
}

/// Prints one completion and submits it when requested.
pub async fn report(record: &CompletionRecord, submission: Option<&Submission>) {
    println!(
        "{}",
        format!(
            "Challenge completed by {}: {} / {} ({})",
            record.username,
            record.game,
            record.challenge_name,
            record.summary()
        )
        .bright_green()
        .bold()
    );

    let Some(submission) = submission else {
        return;
    };
    match submission.reporter.report(&submission.user, record).await {
        Ok(message) => println!("{}", message.green()),
        Err(e) => eprintln!("{}", format!("Submission failed: {}", e).red()),
    }
}

pub async fn run(ctx: &Context, submit: bool) -> Result<()> {
    let submission = if submit {
        Some(Submission::prepare(ctx).await?)
    } else {
        None
    };

    let mut completions = start_monitor(ctx);
    println!(
        "{}",
        format!(
            "Watching {} (Ctrl-C to stop)",
            ctx.paths.completion_file().display()
        )
        .bright_black()
    );

    loop {
        tokio::select! {
            record = completions.recv() => match record {
                Some(record) => report(&record, submission.as_ref()).await,
                None => return Err(anyhow!("Completion monitor stopped; see the log for details")),
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
