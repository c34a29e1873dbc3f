//! Tracing subscriber setup.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use rc_execution::{DiagnosticEvent, EventLogLayer};

const LOG_FILE_PREFIX: &str = "retrochallenges.log";

pub struct Logging {
    _guard: WorkerGuard,
    /// Warnings and errors for the interactive console to render.
    pub diagnostics: Option<mpsc::UnboundedReceiver<DiagnosticEvent>>,
}

/// Installs the global subscriber.
///
/// Everything allowed by `RUST_LOG` (default `info`) goes to a daily log file.
/// Warnings also reach the terminal: through the console feed when
/// `interactive`, on stderr otherwise.
pub fn init(logs_dir: &Path, interactive: bool) -> Result<Logging> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX));
    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (console_layer, diagnostics, stderr_layer) = if interactive {
        let (tx, rx) = mpsc::unbounded_channel();
        (Some(EventLogLayer::new(tx)), Some(rx), None)
    } else {
        let stderr = fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .with_filter(LevelFilter::WARN);
        (None, None, Some(stderr))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(Logging {
        _guard: guard,
        diagnostics,
    })
}
