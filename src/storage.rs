//! Disk-backed storage for uploaded binaries.
//!
//! Every resource owns one sub-directory of the upload root. Files are
//! reachable over HTTP under [`PUBLIC_PREFIX`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;

/// URL prefix the upload root is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

const SUFFIX_LEN: usize = 9;

/// The per-resource directories below the upload root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Images,
    AiImages,
    LiumaMedia,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Images, Bucket::AiImages, Bucket::LiumaMedia];

    pub fn dir_name(self) -> &'static str {
        match self {
            Bucket::Images => "images",
            Bucket::AiImages => "aiImg",
            Bucket::LiumaMedia => "liumaImg",
        }
    }
}

/// A file written by [`FileStorage::store`].
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    /// Externally reachable path, e.g. `/uploads/aiImg/1700000000000-k3j2h1g0f.png`.
    pub public_path: String,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalOutcome {
    Removed,
    Missing,
    Failed,
}

/// Result of removing one file during a bulk delete.
#[derive(Debug, Clone, Serialize)]
pub struct FileRemoval {
    pub path: String,
    pub outcome: RemovalOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: Arc<PathBuf>,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bucket_dir(&self, bucket: Bucket) -> PathBuf {
        self.root.join(bucket.dir_name())
    }

    /// Creates the upload root and every bucket directory.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        for bucket in Bucket::ALL {
            tokio::fs::create_dir_all(self.bucket_dir(bucket)).await?;
        }
        Ok(())
    }

    /// Writes `contents` under a freshly generated name inside `bucket`.
    #[tracing::instrument(name = "store_file", skip(self, contents), fields(size = contents.len()))]
    pub async fn store(
        &self,
        bucket: Bucket,
        original_name: Option<&str>,
        contents: &[u8],
    ) -> std::io::Result<StoredFile> {
        let dir = self.bucket_dir(bucket);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = generate_file_name(original_name);
        tokio::fs::write(dir.join(&file_name), contents).await?;

        let public_path = format!("{}/{}/{}", PUBLIC_PREFIX, bucket.dir_name(), file_name);
        tracing::info!(path = %public_path, "Stored uploaded file");

        Ok(StoredFile {
            file_name,
            public_path,
            size: contents.len(),
        })
    }

    /// Maps a stored path (public or relative) to its location on disk.
    ///
    /// Only the final path component is kept, so a stored value can never
    /// point outside its bucket.
    pub fn resolve(&self, bucket: Bucket, stored_path: &str) -> Option<PathBuf> {
        let name = Path::new(stored_path).file_name()?;
        Some(self.bucket_dir(bucket).join(name))
    }

    /// Removes one stored file. A file that is already gone is not an error.
    pub async fn remove(
        &self,
        bucket: Bucket,
        stored_path: &str,
    ) -> std::io::Result<RemovalOutcome> {
        let Some(path) = self.resolve(bucket, stored_path) else {
            tracing::warn!(stored_path, "Stored path has no file name, nothing to remove");
            return Ok(RemovalOutcome::Missing);
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed stored file");
                Ok(RemovalOutcome::Removed)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Stored file already missing");
                Ok(RemovalOutcome::Missing)
            }
            Err(e) => Err(e),
        }
    }

    /// Removes every given file concurrently, reporting one outcome per path.
    pub async fn remove_all(&self, bucket: Bucket, stored_paths: &[String]) -> Vec<FileRemoval> {
        let removals = stored_paths.iter().map(|stored_path| async move {
            match self.remove(bucket, stored_path).await {
                Ok(outcome) => FileRemoval {
                    path: stored_path.clone(),
                    outcome,
                    error: None,
                },
                Err(e) => {
                    tracing::error!(
                        path = %stored_path,
                        error = %e,
                        "Failed to remove stored file"
                    );
                    FileRemoval {
                        path: stored_path.clone(),
                        outcome: RemovalOutcome::Failed,
                        error: Some(e.to_string()),
                    }
                }
            }
        });

        join_all(removals).await
    }
}

/// `<unix millis>-<9 lowercase alphanumerics><.ext>`; the extension is kept
/// from the client's file name when it is plain alphanumeric.
pub fn generate_file_name(original_name: Option<&str>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();

    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{}-{}{}", chrono::Utc::now().timestamp_millis(), suffix, extension)
}
