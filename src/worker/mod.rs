//! Dataset jobs.
//!
//! A job fetches and normalizes every snapshot of one dataset, then runs
//! the analytics pass on a blocking thread. Progress and the single terminal
//! outcome are reported over a channel; the host decides what to keep.

mod loader;
mod messages;

#[cfg(test)]
pub(crate) mod test_source;

pub use loader::{DatasetLoader, LoadState, LoadStatus};
pub use messages::{WorkerRequest, WorkerResponse};

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::calculate::compute_dataset_with;
use crate::config::EngineConfig;
use crate::fetch::{FetchError, SnapshotSource};
use crate::models::WorkerResult;
use crate::normalize::{AdapterRegistry, NormalizeError};

/// Terminal job failure. `Display` is the message reported to the host.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Computation failed: {0}")]
    Compute(String),
}

/// Run one dataset job to completion, reporting over `tx`.
///
/// Exactly one `Result` or `Error` message is sent last. A dropped receiver
/// is not an error: the host has abandoned the job.
pub async fn run_job(
    request: WorkerRequest,
    source: Arc<dyn SnapshotSource>,
    registry: Arc<AdapterRegistry>,
    engine: EngineConfig,
    tx: UnboundedSender<WorkerResponse>,
) {
    let dataset_id = request.dataset_id.clone();

    let terminal = match process(request, source.as_ref(), &registry, engine, &tx).await {
        Ok(result) => WorkerResponse::Result {
            dataset_id,
            payload: Box::new(result),
        },
        Err(e) => {
            warn!("Dataset {} failed: {}", dataset_id, e);
            WorkerResponse::Error {
                error: e.to_string(),
            }
        }
    };

    if tx.send(terminal).is_err() {
        debug!("Job receiver dropped, discarding outcome");
    }
}

async fn process(
    request: WorkerRequest,
    source: &dyn SnapshotSource,
    registry: &AdapterRegistry,
    engine: EngineConfig,
    tx: &UnboundedSender<WorkerResponse>,
) -> Result<WorkerResult, WorkerError> {
    let adapter = registry.require(&request.format)?;
    info!(
        "Processing dataset {} ({} snapshots, adapter {}) from {}",
        request.dataset_id,
        request.snapshots.len(),
        adapter.id(),
        source.describe()
    );

    report(tx, "Loading snapshots...");
    let mut normalized = Vec::with_capacity(request.snapshots.len());
    for snapshot in &request.snapshots {
        report(tx, format!("Fetching {}", snapshot.label));
        let raw = source.fetch_snapshot(snapshot).await?;
        normalized.push(adapter.normalize(&raw, snapshot)?);
    }

    report(tx, "Computing metrics...");
    let WorkerRequest {
        dataset_id,
        snapshots,
        ..
    } = request;
    tokio::task::spawn_blocking(move || {
        compute_dataset_with(normalized, &snapshots, dataset_id, &engine)
    })
    .await
    .map_err(|e| WorkerError::Compute(e.to_string()))
}

fn report(tx: &UnboundedSender<WorkerResponse>, message: impl Into<String>) {
    let _ = tx.send(WorkerResponse::progress(message));
}
