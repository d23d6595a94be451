use std::sync::Arc;

use tracing::info;

use crate::config::EngineConfig;
use crate::fetch::{FetchError, SnapshotSource};
use crate::models::Manifest;
use crate::normalize::AdapterRegistry;
use crate::worker::DatasetLoader;

#[derive(Clone)]
pub struct AppState {
    pub manifest: Arc<Manifest>,
    pub loader: Arc<DatasetLoader>,
}

impl AppState {
    /// Load the manifest from `source` and wire a loader to it.
    pub async fn from_source(
        source: Arc<dyn SnapshotSource>,
        registry: Arc<AdapterRegistry>,
        engine: EngineConfig,
    ) -> Result<Self, FetchError> {
        let manifest = source.load_manifest().await?;
        info!(
            "Serving {} datasets from {}",
            manifest.datasets.len(),
            source.describe()
        );

        Ok(Self {
            manifest: Arc::new(manifest),
            loader: Arc::new(DatasetLoader::new(source, registry, engine)),
        })
    }
}
