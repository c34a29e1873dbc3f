//! Emulator bridge backed by a JSON-lines command file.
//!
//! The challenge Lua scripts poll `bizhawk_commands.jsonl` and execute each
//! new line, so a request counts as delivered once it is appended.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use rc_core::RcError;
use rc_core::bridge::{BridgeRequest, BridgeResponse, EmulatorBridge};
use rc_core::error::Result;

pub struct CommandFileBridge {
    path: PathBuf,
    // Serializes appends so lines never interleave.
    write_lock: Mutex<()>,
}

impl CommandFileBridge {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await
    }
}

#[async_trait]
impl EmulatorBridge for CommandFileBridge {
    async fn send(&self, request: BridgeRequest) -> Result<BridgeResponse> {
        let line = serde_json::to_string(&request)?;
        self.append(&line).await.map_err(|e| {
            RcError::bridge(format!(
                "Cannot write to {}: {}",
                self.path.display(),
                e
            ))
        })?;
        tracing::debug!("[Bridge] Queued {}", request.command);
        Ok(BridgeResponse::ok())
    }
}
