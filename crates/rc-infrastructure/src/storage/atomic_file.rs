//! Atomic TOML/JSON file operations.
//!
//! Writes go to a temporary sibling file that is fsynced and renamed over the
//! target, so readers see either the old or the new contents.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use rc_core::RcError;

/// On-disk encoding of an [`AtomicFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    fn name(self) -> &'static str {
        match self {
            FileFormat::Toml => "TOML",
            FileFormat::Json => "JSON",
        }
    }
}

/// Errors that can occur during atomic file operations.
#[derive(Debug)]
pub enum AtomicFileError {
    /// File I/O error.
    IoError(std::io::Error),
    /// Parse or serialization error.
    FormatError { format: FileFormat, message: String },
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for AtomicFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicFileError::IoError(e) => write!(f, "I/O error: {}", e),
            AtomicFileError::FormatError { format, message } => {
                write!(f, "{} error: {}", format.name(), message)
            }
            AtomicFileError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for AtomicFileError {}

impl From<std::io::Error> for AtomicFileError {
    fn from(e: std::io::Error) -> Self {
        AtomicFileError::IoError(e)
    }
}

impl From<AtomicFileError> for RcError {
    fn from(e: AtomicFileError) -> Self {
        match e {
            AtomicFileError::IoError(e) => RcError::from(e),
            AtomicFileError::FormatError { format, message } => RcError::Serialization {
                format: format.name().to_string(),
                message,
            },
            AtomicFileError::LockError(message) => RcError::io(message),
        }
    }
}

/// A handle to a file that is always replaced atomically.
pub struct AtomicFile<T> {
    path: PathBuf,
    format: FileFormat,
    _phantom: PhantomData<T>,
}

impl<T> AtomicFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf, format: FileFormat) -> Self {
        Self {
            path,
            format,
            _phantom: PhantomData,
        }
    }

    pub fn toml(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Toml)
    }

    pub fn json(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicFileError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        self.decode(&content).map(Some)
    }

    /// Saves data atomically.
    pub fn save(&self, data: &T) -> Result<(), AtomicFileError> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let encoded = self.encode(data)?;

        let tmp_path = self.get_temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(encoded.as_bytes())?;

        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Read-modify-write under an exclusive lock.
    ///
    /// `default_value` is used when the file doesn't exist yet or cannot be
    /// decoded; in the latter case the corrupt content is replaced. Nothing
    /// is written if `f` fails.
    pub fn update<F>(&self, default_value: T, f: F) -> Result<T, AtomicFileError>
    where
        F: FnOnce(&mut T) -> Result<(), AtomicFileError>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = match self.load() {
            Ok(existing) => existing.unwrap_or(default_value),
            Err(AtomicFileError::FormatError { message, .. }) => {
                tracing::warn!(
                    "[Storage] Discarding unreadable {}: {}",
                    self.path.display(),
                    message
                );
                default_value
            }
            Err(e) => return Err(e),
        };
        f(&mut data)?;
        self.save(&data)?;

        Ok(data)
    }

    /// Removes the file. Missing files are not an error.
    pub fn delete(&self) -> Result<(), AtomicFileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn decode(&self, content: &str) -> Result<T, AtomicFileError> {
        let format = self.format;
        let result = match format {
            FileFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            FileFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        result.map_err(|message| AtomicFileError::FormatError { format, message })
    }

    fn encode(&self, data: &T) -> Result<String, AtomicFileError> {
        let format = self.format;
        let result = match format {
            FileFormat::Toml => toml::to_string_pretty(data).map_err(|e| e.to_string()),
            FileFormat::Json => serde_json::to_string_pretty(data).map_err(|e| e.to_string()),
        };
        result.map_err(|message| AtomicFileError::FormatError { format, message })
    }

    fn get_temp_path(&self) -> Result<PathBuf, AtomicFileError> {
        let invalid = |msg: &str| {
            AtomicFileError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidInput, msg.to_string()))
        };
        let parent = self
            .path
            .parent()
            .ok_or_else(|| invalid("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| invalid("Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive lock guard, released on drop.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicFileError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        use fs2::FileExt;
        file.lock_exclusive()
            .map_err(|e| AtomicFileError::LockError(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        name: String,
        count: u32,
    }

    fn counter(count: u32) -> Counter {
        Counter {
            name: "launches".to_string(),
            count,
        }
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let temp_dir = TempDir::new().unwrap();
        for (file, format) in [("c.toml", FileFormat::Toml), ("c.json", FileFormat::Json)] {
            let atomic_file = AtomicFile::<Counter>::new(temp_dir.path().join(file), format);
            atomic_file.save(&counter(42)).unwrap();
            assert_eq!(atomic_file.load().unwrap(), Some(counter(42)));
        }
    }

    #[test]
    fn test_load_missing_or_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("c.json");
        let atomic_file = AtomicFile::<Counter>::json(path.clone());
        assert!(atomic_file.load().unwrap().is_none());

        fs::write(&path, "  \n").unwrap();
        assert!(atomic_file.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_format_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("c.json");
        fs::write(&path, "{broken").unwrap();
        let err = AtomicFile::<Counter>::json(path).load().unwrap_err();
        assert!(matches!(
            err,
            AtomicFileError::FormatError { format: FileFormat::Json, .. }
        ));
        assert!(RcError::from(err).is_serialization());
    }

    #[test]
    fn test_update_creates_then_modifies() {
        let temp_dir = TempDir::new().unwrap();
        let atomic_file = AtomicFile::<Counter>::toml(temp_dir.path().join("c.toml"));

        let first = atomic_file
            .update(counter(0), |c| {
                c.count += 10;
                Ok(())
            })
            .unwrap();
        assert_eq!(first.count, 10);

        atomic_file
            .update(counter(0), |c| {
                c.count += 5;
                Ok(())
            })
            .unwrap();
        assert_eq!(atomic_file.load().unwrap().unwrap().count, 15);
        assert!(!temp_dir.path().join("c.lock").exists());
    }

    #[test]
    fn test_update_replaces_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("c.json");
        fs::write(&path, "{broken").unwrap();
        let atomic_file = AtomicFile::<Counter>::json(path);

        let updated = atomic_file
            .update(counter(0), |c| {
                c.count += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(updated.count, 1);
        assert_eq!(atomic_file.load().unwrap(), Some(counter(1)));
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let atomic_file = AtomicFile::<Counter>::json(temp_dir.path().join("c.json"));
        atomic_file.save(&counter(1)).unwrap();

        let result = atomic_file.update(counter(0), |c| {
            c.count = 99;
            Err(AtomicFileError::LockError("abort".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(atomic_file.load().unwrap(), Some(counter(1)));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/c.json");
        let atomic_file = AtomicFile::<Counter>::json(path.clone());
        atomic_file.save(&counter(3)).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("nested/dir/.c.json.tmp").exists());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let atomic_file = AtomicFile::<Counter>::json(temp_dir.path().join("c.json"));
        atomic_file.save(&counter(3)).unwrap();
        atomic_file.delete().unwrap();
        atomic_file.delete().unwrap();
        assert!(atomic_file.load().unwrap().is_none());
    }
}
