//! Host-side load tracking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{run_job, WorkerRequest, WorkerResponse};
use crate::config::EngineConfig;
use crate::fetch::SnapshotSource;
use crate::models::{DatasetId, ManifestDataset, ManifestSnapshot, WorkerResult};
use crate::normalize::AdapterRegistry;

const CUSTOM_FORMAT: &str = "custom-raw";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
    /// Dataset needs a raw-format parser that isn't configured
    Custom,
}

/// What the host currently knows about the selected dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadState {
    pub status: LoadStatus,
    pub message: String,
    pub error: Option<String>,
    pub dataset_id: Option<DatasetId>,
    /// Load counter; messages from older loads are ignored
    pub generation: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub result: Option<Arc<WorkerResult>>,
}

impl LoadState {
    fn apply(&mut self, response: WorkerResponse) {
        match response {
            WorkerResponse::Progress { message } => {
                self.message = message;
            }
            WorkerResponse::Result { payload, .. } => {
                self.status = LoadStatus::Ready;
                self.message = "Ready".to_string();
                self.result = Some(Arc::from(payload));
                self.completed_at = Some(Utc::now());
            }
            WorkerResponse::Error { error } => {
                self.status = LoadStatus::Error;
                self.message = "Error".to_string();
                self.error = Some(error);
                self.completed_at = Some(Utc::now());
            }
        }
    }
}

/// Starts dataset jobs and keeps only the newest one's outcome.
pub struct DatasetLoader {
    source: Arc<dyn SnapshotSource>,
    registry: Arc<AdapterRegistry>,
    engine: EngineConfig,
    state: Arc<RwLock<LoadState>>,
    generation: AtomicU64,
    current: Mutex<Option<JoinHandle<()>>>,
}

impl DatasetLoader {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        registry: Arc<AdapterRegistry>,
        engine: EngineConfig,
    ) -> Self {
        Self {
            source,
            registry,
            engine,
            state: Arc::new(RwLock::new(LoadState::default())),
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    pub async fn snapshot(&self) -> LoadState {
        self.state.read().await.clone()
    }

    /// Whether `generation` is the most recently started load.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Start loading `dataset`, superseding any load in flight.
    ///
    /// Returns the state right after the load was accepted.
    pub async fn load(
        &self,
        dataset: &ManifestDataset,
        snapshots: Vec<ManifestSnapshot>,
    ) -> LoadState {
        // Held until the new handle is stored so concurrent loads serialize.
        let mut state = self.state.write().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_current();

        *state = LoadState {
            dataset_id: Some(dataset.id.clone()),
            generation,
            started_at: Some(Utc::now()),
            ..LoadState::default()
        };

        if dataset.format == CUSTOM_FORMAT {
            info!("Dataset {} uses a custom raw format, not loading", dataset.id);
            state.status = LoadStatus::Custom;
            state.message = "Custom parsing not configured.".to_string();
            return state.clone();
        }
        if snapshots.is_empty() {
            state.status = LoadStatus::Error;
            state.error = Some("No snapshots found for this dataset.".to_string());
            return state.clone();
        }

        state.status = LoadStatus::Loading;
        state.message = "Starting worker...".to_string();
        let accepted = state.clone();

        let request = WorkerRequest {
            dataset_id: dataset.id.clone(),
            format: dataset.format.clone(),
            snapshots,
        };
        let handle = tokio::spawn(drive(
            request,
            self.source.clone(),
            self.registry.clone(),
            self.engine.clone(),
            self.state.clone(),
            generation,
        ));
        if let Ok(mut current) = self.current.lock() {
            *current = Some(handle);
        }
        drop(state);

        info!("Started load {} for dataset {}", generation, dataset.id);
        accepted
    }

    /// Wait for the current load, if any, to finish.
    pub async fn wait(&self) {
        let handle = match self.current.lock() {
            Ok(mut current) => current.take(),
            Err(_) => None,
        };
        let Some(handle) = handle else {
            return;
        };
        match handle.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => debug!("Load task was cancelled"),
            Err(e) => {
                warn!("Load task failed: {}", e);
                let mut state = self.state.write().await;
                if state.status == LoadStatus::Loading {
                    state.status = LoadStatus::Error;
                    state.message = "Error".to_string();
                    state.error = Some(format!("Load task failed: {}", e));
                    state.completed_at = Some(Utc::now());
                }
            }
        }
    }

    fn abort_current(&self) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(handle) = current.take() {
                debug!("Aborting superseded load");
                handle.abort();
            }
        }
    }
}

/// Run a job and fold its messages into `state` while it is still current.
async fn drive(
    request: WorkerRequest,
    source: Arc<dyn SnapshotSource>,
    registry: Arc<AdapterRegistry>,
    engine: EngineConfig,
    state: Arc<RwLock<LoadState>>,
    generation: u64,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let job = run_job(request, source, registry, engine, tx);
    let consume = async {
        while let Some(response) = rx.recv().await {
            let mut state = state.write().await;
            if state.generation != generation {
                debug!("Discarding message from superseded load {}", generation);
                return;
            }
            state.apply(response);
        }
    };
    tokio::join!(job, consume);
}
