//! Scan manifest: which datasets exist and where their snapshots live.

use serde::{Deserialize, Serialize};

use super::{DatasetId, SnapshotId};

/// A named collection of snapshots sharing one payload format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDataset {
    pub id: DatasetId,
    pub label: String,
    pub format: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Per-snapshot metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSnapshot {
    pub id: SnapshotId,
    pub label: String,
    /// Display date as written by the scanner; not parsed.
    pub date: String,
    pub format: String,
    /// Location relative to the manifest root
    pub path: String,
    #[serde(default)]
    pub scope: String,
    pub dataset_id: DatasetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub datasets: Vec<ManifestDataset>,
    #[serde(default)]
    pub snapshots: Vec<ManifestSnapshot>,
}

impl Manifest {
    /// Get a dataset by ID.
    pub fn dataset(&self, id: &str) -> Option<&ManifestDataset> {
        self.datasets.iter().find(|d| d.id.as_str() == id)
    }

    /// Snapshots belonging to a dataset, in manifest order.
    pub fn snapshots_for(&self, dataset_id: &str) -> Vec<ManifestSnapshot> {
        self.snapshots
            .iter()
            .filter(|s| s.dataset_id.as_str() == dataset_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        serde_json::from_str(
            r#"{
                "datasets": [
                    {"id": "eu", "label": "EU", "format": "normalized", "scope": "server"},
                    {"id": "raw", "label": "Raw", "format": "custom-raw", "scope": "server"}
                ],
                "snapshots": [
                    {"id": "s1", "label": "Jan", "date": "2025-01-01", "format": "normalized",
                     "path": "scans/eu/2025-01.json", "scope": "server", "datasetId": "eu"},
                    {"id": "s2", "label": "Feb", "date": "2025-02-01", "format": "normalized",
                     "path": "scans/eu/2025-02.json", "scope": "server", "datasetId": "eu"},
                    {"id": "r1", "label": "Raw Jan", "date": "2025-01-01", "format": "custom-raw",
                     "path": "scans/raw/2025-01.bin", "scope": "server", "datasetId": "raw"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_dataset_lookup() {
        let manifest = sample();
        assert_eq!(manifest.dataset("raw").unwrap().format, "custom-raw");
        assert!(manifest.dataset("missing").is_none());
    }

    #[test]
    fn test_snapshots_for_preserves_order() {
        let manifest = sample();
        let ids: Vec<_> = manifest
            .snapshots_for("eu")
            .into_iter()
            .map(|s| s.id.to_string())
            .collect();
        assert_eq!(ids, vec!["s1", "s2"]);
        assert!(manifest.snapshots_for("nope").is_empty());
    }

    #[test]
    fn test_empty_manifest_defaults() {
        let manifest: Manifest = serde_json::from_str("{}").unwrap();
        assert!(manifest.datasets.is_empty());
        assert!(manifest.snapshots.is_empty());
    }
}
