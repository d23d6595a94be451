//! Snapshot transport.
//!
//! A [`SnapshotSource`] loads the scan manifest and the raw JSON payload of
//! each snapshot it lists. [`HttpSource`] reads from a static file host;
//! the local filesystem variant lives in [`crate::storage`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SourceConfig;
use crate::models::{Manifest, ManifestSnapshot};

/// Manifest location relative to the source root.
pub const MANIFEST_PATH: &str = "scans/manifest.json";

/// Errors that can occur while loading manifests and snapshots.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Manifest load failed ({status})")]
    ManifestStatus { status: String },

    #[error("Snapshot fetch failed ({id}): {reason}")]
    Snapshot { id: String, reason: String },
}

impl FetchError {
    /// Attribute a lower-level failure to one snapshot.
    pub fn for_snapshot(snapshot: &ManifestSnapshot, reason: impl std::fmt::Display) -> Self {
        FetchError::Snapshot {
            id: snapshot.id.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Where manifests and snapshot payloads come from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Short description for logs.
    fn describe(&self) -> String;

    async fn load_manifest(&self) -> Result<Manifest, FetchError>;

    /// Raw payload of one snapshot, not yet normalized.
    async fn fetch_snapshot(&self, snapshot: &ManifestSnapshot) -> Result<Value, FetchError>;
}

/// Static file host serving `scans/manifest.json` and the snapshot files.
pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    /// Create a source rooted at `base_url`.
    pub fn new(base_url: &str, config: &SourceConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("roster-pulse")),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: Self::root_url(base_url)?,
        })
    }

    /// Parse `base_url` as a directory, so relative joins stay beneath it.
    fn root_url(base_url: &str) -> Result<Url, FetchError> {
        let mut url =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn manifest_url(&self) -> Result<Url, FetchError> {
        self.base_url
            .join(MANIFEST_PATH)
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))
    }

    pub fn snapshot_url(&self, snapshot: &ManifestSnapshot) -> Result<Url, FetchError> {
        self.base_url
            .join(&snapshot.path)
            .map_err(|e| FetchError::for_snapshot(snapshot, e))
    }
}

#[async_trait]
impl SnapshotSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.to_string()
    }

    async fn load_manifest(&self) -> Result<Manifest, FetchError> {
        let url = self.manifest_url()?;
        info!("Loading manifest from {}", url);

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ManifestStatus {
                status: status.as_u16().to_string(),
            });
        }

        let manifest: Manifest = response.json().await?;
        debug!(
            "Manifest lists {} datasets and {} snapshots",
            manifest.datasets.len(),
            manifest.snapshots.len()
        );
        Ok(manifest)
    }

    async fn fetch_snapshot(&self, snapshot: &ManifestSnapshot) -> Result<Value, FetchError> {
        let url = self.snapshot_url(snapshot)?;
        debug!("Fetching snapshot {} from {}", snapshot.id, url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| FetchError::for_snapshot(snapshot, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Snapshot {} returned HTTP {}", snapshot.id, status);
            return Err(FetchError::for_snapshot(
                snapshot,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::for_snapshot(snapshot, e))
    }
}
