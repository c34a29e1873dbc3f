//! Watches `challenge_data.json` for completions written by challenge scripts.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use rc_core::completion::CompletionRecord;
use rc_core::error::Result;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Identity of a file version. Size is included because some filesystems
/// only keep second-resolution modification times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

pub struct CompletionMonitor {
    path: PathBuf,
    interval: Duration,
    last_seen: Option<FileStamp>,
}

impl CompletionMonitor {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            interval: DEFAULT_POLL_INTERVAL,
            last_seen: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Creates the file as `{}` if missing and records its current version,
    /// so existing contents are not reported.
    pub async fn prime(&mut self) -> Result<()> {
        if tokio::fs::metadata(&self.path).await.is_err() {
            if let Some(parent) = self.path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&self.path, "{}").await?;
        }
        self.last_seen = self.stamp().await;
        Ok(())
    }

    async fn stamp(&self) -> Option<FileStamp> {
        let metadata = tokio::fs::metadata(&self.path).await.ok()?;
        Some(FileStamp {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }

    /// Checks once. Returns a record when the file changed and holds a
    /// complete one.
    pub async fn poll_once(&mut self) -> Option<CompletionRecord> {
        let stamp = self.stamp().await?;
        if self.last_seen == Some(stamp) {
            return None;
        }
        self.last_seen = Some(stamp);

        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("[Completion] Failed to read {}: {}", self.path.display(), e);
                return None;
            }
        };

        match CompletionRecord::from_json(&contents, chrono::Utc::now()) {
            Ok(Some(record)) => {
                tracing::info!(
                    "[Completion] {} completed {} / {} ({})",
                    record.username,
                    record.game,
                    record.challenge_name,
                    record.summary()
                );
                Some(record)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("[Completion] Error processing completion file: {}", e);
                None
            }
        }
    }

    /// Polls until the receiver is dropped.
    pub fn spawn(mut self, tx: mpsc::UnboundedSender<CompletionRecord>) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.prime().await {
                tracing::error!("[Completion] Cannot watch {}: {}", self.path.display(), e);
                return;
            }
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    return;
                }
                if let Some(record) = self.poll_once().await
                    && tx.send(record).is_err()
                {
                    return;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RECORD: &str = r#"{"username":"ada","game":"Castlevania","challengeName":"Kill Dracula!","time":"04:12"}"#;

    #[tokio::test]
    async fn test_prime_creates_empty_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("challenge_data.json");
        let mut monitor = CompletionMonitor::new(path.clone());
        monitor.prime().await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
        assert!(monitor.poll_once().await.is_none());
    }

    #[tokio::test]
    async fn test_change_emits_record_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("challenge_data.json");
        let mut monitor = CompletionMonitor::new(path.clone());
        monitor.prime().await.unwrap();

        std::fs::write(&path, RECORD).unwrap();
        let record = monitor.poll_once().await.unwrap();
        assert_eq!(record.challenge_name, "Kill Dracula!");
        assert!(!record.date.is_empty());

        assert!(monitor.poll_once().await.is_none());
    }

    #[tokio::test]
    async fn test_incomplete_or_corrupt_changes_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("challenge_data.json");
        let mut monitor = CompletionMonitor::new(path.clone());
        monitor.prime().await.unwrap();

        std::fs::write(&path, r#"{"username":"ada"}"#).unwrap();
        assert!(monitor.poll_once().await.is_none());
        std::fs::write(&path, "{oops").unwrap();
        assert!(monitor.poll_once().await.is_none());
    }

    #[tokio::test]
    async fn test_existing_record_not_reported_at_start() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("challenge_data.json");
        std::fs::write(&path, RECORD).unwrap();

        let mut monitor = CompletionMonitor::new(path);
        monitor.prime().await.unwrap();
        assert!(monitor.poll_once().await.is_none());
    }

    #[tokio::test]
    async fn test_spawned_monitor_delivers() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("challenge_data.json");
        std::fs::write(&path, "{}").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = CompletionMonitor::new(path.clone())
            .with_interval(Duration::from_millis(20))
            .spawn(tx);

        tokio::time::sleep(Duration::from_millis(60)).await;
        std::fs::write(&path, RECORD).unwrap();

        let record = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.username, "ada");

        drop(rx);
        handle.abort();
    }
}
