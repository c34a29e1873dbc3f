//! File-backed [`KeyValueStore`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use rc_core::channel_history::KeyValueStore;
use rc_core::error::Result;

use super::atomic_file::AtomicFile;

type Items = BTreeMap<String, String>;

/// String values kept in a single JSON object on disk.
pub struct FileKeyValueStore {
    file: AtomicFile<Items>,
}

impl FileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::json(path),
        }
    }

    /// Runs blocking file work off the async executor.
    async fn blocking<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(AtomicFile<Items>) -> Result<R> + Send + 'static,
    {
        let file = AtomicFile::json(self.file.path().to_path_buf());
        tokio::task::spawn_blocking(move || f(file))
            .await
            .map_err(|e| rc_core::RcError::internal(format!("storage task failed: {e}")))?
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.blocking(move |file| Ok(file.load()?.and_then(|mut items| items.remove(&key))))
            .await
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.blocking(move |file| {
            file.update(Items::new(), |items| {
                items.insert(key, value);
                Ok(())
            })?;
            Ok(())
        })
        .await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.blocking(move |file| {
            file.update(Items::new(), |items| {
                items.remove(&key);
                Ok(())
            })?;
            Ok(())
        })
        .await
    }
}
