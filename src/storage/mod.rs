//! Local data directory.
//!
//! Mirrors the layout a static host serves:
//! - `scans/manifest.json` lists datasets and snapshots
//! - snapshot payloads at the manifest's relative `path`s
//!
//! Also writes computed results to disk for the CLI.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use crate::fetch::{FetchError, SnapshotSource, MANIFEST_PATH};
use crate::models::{Manifest, ManifestSnapshot};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn scans_dir(&self) -> PathBuf {
        self.data_dir.join("scans")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.data_dir.join(MANIFEST_PATH)
    }

    /// Resolve a manifest-relative path inside the data directory.
    ///
    /// Absolute paths and `..` components are rejected.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let path = Path::new(relative);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.trim().is_empty() || escapes {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }
        Ok(self.data_dir.join(path))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// Reads manifests and snapshots from a local data directory.
#[derive(Debug, Clone)]
pub struct LocalSource {
    config: StorageConfig,
}

impl LocalSource {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SnapshotSource for LocalSource {
    fn describe(&self) -> String {
        self.config.data_dir.display().to_string()
    }

    async fn load_manifest(&self) -> Result<Manifest, FetchError> {
        let path = self.config.manifest_path();
        info!("Loading manifest from {}", path.display());

        let contents = fs::read_to_string(&path).await?;
        let manifest: Manifest = serde_json::from_str(&contents)?;
        debug!(
            "Manifest lists {} datasets and {} snapshots",
            manifest.datasets.len(),
            manifest.snapshots.len()
        );
        Ok(manifest)
    }

    async fn fetch_snapshot(&self, snapshot: &ManifestSnapshot) -> Result<Value, FetchError> {
        let path = self
            .config
            .resolve(&snapshot.path)
            .map_err(|e| FetchError::for_snapshot(snapshot, e))?;
        debug!("Reading snapshot {} from {}", snapshot.id, path.display());

        let contents = fs::read_to_string(&path)
            .await
            .map_err(|e| FetchError::for_snapshot(snapshot, e))?;
        serde_json::from_str(&contents).map_err(|e| FetchError::for_snapshot(snapshot, e))
    }
}

/// Write `value` as JSON, creating parent directories.
pub async fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    fs::write(path, json).await?;

    info!("Wrote {}", path.display());
    Ok(())
}
