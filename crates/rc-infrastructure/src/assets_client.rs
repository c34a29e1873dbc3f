//! Challenge script assets.
//!
//! The assets repository is published as a GitHub branch archive whose
//! single top-level folder (`retrochallenges-assets-main/`) mirrors the
//! layout expected under the local challenges directory.

use reqwest::Client;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use zip::ZipArchive;

use rc_core::RcError;
use rc_core::error::Result;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = "RetroChallenges-App/1.0";
const ROOT_PREFIX: &str = "retrochallenges-assets";

/// Downloads the assets archive and unpacks it into the challenges directory.
#[derive(Clone)]
pub struct AssetsClient {
    client: Client,
    url: String,
}

impl AssetsClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn download(&self) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| RcError::http(format!("Failed to download assets: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RcError::http(format!("Assets download failed ({})", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RcError::http(format!("Failed to read assets archive: {}", e)))?;
        Ok(bytes.to_vec())
    }

    /// Replaces the contents of `challenges_dir` with the latest assets.
    /// Returns the number of files written.
    ///
    /// The directory is left untouched when the download or the archive
    /// check fails.
    pub async fn refresh(&self, challenges_dir: &Path) -> Result<usize> {
        let bytes = self.download().await?;
        tracing::debug!("[Assets] Downloaded {} bytes from {}", bytes.len(), self.url);

        let target = challenges_dir.to_path_buf();
        let count = tokio::task::spawn_blocking(move || install_archive(&bytes, &target))
            .await
            .map_err(|e| RcError::internal(format!("assets task failed: {e}")))??;

        tracing::info!(
            "[Assets] Installed {} files into {}",
            count,
            challenges_dir.display()
        );
        Ok(count)
    }
}

fn zip_error(e: zip::result::ZipError) -> RcError {
    RcError::io(format!("Invalid assets archive: {}", e))
}

/// Unpacks the `retrochallenges-assets*` folder of a ZIP archive into
/// `challenges_dir`, replacing whatever was there.
pub fn install_archive(bytes: &[u8], challenges_dir: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(zip_error)?;
    let root = find_root(&mut archive)?;

    if challenges_dir.exists() {
        fs::remove_dir_all(challenges_dir)?;
    }
    fs::create_dir_all(challenges_dir)?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(zip_error)?;
        // Entries escaping the archive root have no enclosed name.
        let Some(name) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            tracing::warn!("[Assets] Skipping unsafe entry {}", entry.name());
            continue;
        };
        let Ok(relative) = name.strip_prefix(&root) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = challenges_dir.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut contents = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut contents)?;
        fs::write(&target, contents)?;
        written += 1;
    }
    Ok(written)
}

fn find_root<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> Result<PathBuf> {
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(zip_error)?;
        let Some(name) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            continue;
        };
        if let Some(first) = name.components().next()
            && first.as_os_str().to_string_lossy().starts_with(ROOT_PREFIX)
        {
            return Ok(PathBuf::from(first.as_os_str()));
        }
    }
    Err(RcError::not_found("assets folder", ROOT_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, body) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(body.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_install_replaces_challenges_dir() {
        let temp = TempDir::new().unwrap();
        let challenges = temp.path().join("challenges");
        fs::create_dir_all(&challenges).unwrap();
        fs::write(challenges.join("stale.lua"), "old").unwrap();

        let bytes = archive(&[
            ("retrochallenges-assets-main/", ""),
            ("retrochallenges-assets-main/challenges.json", "{\"games\":[]}"),
            ("retrochallenges-assets-main/nes/", ""),
            ("retrochallenges-assets-main/nes/mega_man/", ""),
            ("retrochallenges-assets-main/nes/mega_man/cutman.lua", "-- cut man"),
        ]);

        let count = install_archive(&bytes, &challenges).unwrap();

        assert_eq!(count, 2);
        assert!(!challenges.join("stale.lua").exists());
        assert_eq!(
            fs::read_to_string(challenges.join("nes/mega_man/cutman.lua")).unwrap(),
            "-- cut man"
        );
        assert!(challenges.join("challenges.json").is_file());
        assert!(!challenges.join("retrochallenges-assets-main").exists());
    }

    #[test]
    fn test_missing_assets_folder_keeps_existing_files() {
        let temp = TempDir::new().unwrap();
        let challenges = temp.path().join("challenges");
        fs::create_dir_all(&challenges).unwrap();
        fs::write(challenges.join("keep.lua"), "mine").unwrap();

        let bytes = archive(&[("something-else/readme.md", "hi")]);
        let err = install_archive(&bytes, &challenges).unwrap_err();

        assert!(err.is_not_found());
        assert!(challenges.join("keep.lua").is_file());
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let temp = TempDir::new().unwrap();
        assert!(install_archive(b"not a zip", temp.path()).is_err());
    }

    #[tokio::test]
    async fn test_failed_download_leaves_dir_alone() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("keep.lua"), "mine").unwrap();

        // Port 9 (discard) on localhost is closed in test environments.
        let client = AssetsClient::new("http://127.0.0.1:9/main.zip");
        assert!(client.refresh(temp.path()).await.is_err());
        assert!(temp.path().join("keep.lua").is_file());
    }
}
