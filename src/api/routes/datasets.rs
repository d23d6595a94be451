use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::DatasetId;
use crate::worker::LoadState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub id: DatasetId,
    pub label: String,
    pub format: String,
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub snapshot_count: usize,
}

pub async fn list_datasets(State(state): State<AppState>) -> Json<Vec<DatasetSummary>> {
    let manifest = &state.manifest;
    let datasets = manifest
        .datasets
        .iter()
        .map(|d| DatasetSummary {
            id: d.id.clone(),
            label: d.label.clone(),
            format: d.format.clone(),
            scope: d.scope.clone(),
            notes: d.notes.clone(),
            snapshot_count: manifest
                .snapshots
                .iter()
                .filter(|s| s.dataset_id == d.id)
                .count(),
        })
        .collect();
    Json(datasets)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadParams {
    pub dataset_id: String,
}

/// Start loading a dataset; progress is polled through `/api/status`.
pub async fn load(
    State(state): State<AppState>,
    Json(params): Json<LoadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let dataset = state
        .manifest
        .dataset(&params.dataset_id)
        .ok_or_else(|| ApiError::NotFound(format!("Dataset {}", params.dataset_id)))?;
    let snapshots = state.manifest.snapshots_for(dataset.id.as_str());

    let accepted = state.loader.load(dataset, snapshots).await;
    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

pub async fn status(State(state): State<AppState>) -> Json<LoadState> {
    Json(state.loader.snapshot().await)
}
