//! Messages exchanged between a host and a dataset job.

use serde::{Deserialize, Serialize};

use crate::models::{DatasetId, ManifestSnapshot, WorkerResult};

/// Everything a job needs to process one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRequest {
    pub dataset_id: DatasetId,
    pub format: String,
    pub snapshots: Vec<ManifestSnapshot>,
}

/// Job output. Any number of `Progress` messages are followed by exactly
/// one `Result` or `Error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerResponse {
    Progress {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    Result {
        dataset_id: DatasetId,
        payload: Box<WorkerResult>,
    },
    Error {
        error: String,
    },
}

impl WorkerResponse {
    pub fn progress(message: impl Into<String>) -> Self {
        WorkerResponse::Progress {
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerResponse::Progress { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_tags() {
        let progress = serde_json::to_value(WorkerResponse::progress("Fetching Week 1")).unwrap();
        assert_eq!(progress, json!({"type": "progress", "message": "Fetching Week 1"}));

        let error = serde_json::to_value(WorkerResponse::Error {
            error: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(error, json!({"type": "error", "error": "boom"}));
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(!WorkerResponse::progress("x").is_terminal());
        assert!(WorkerResponse::Error {
            error: String::new()
        }
        .is_terminal());
    }

    #[test]
    fn test_request_is_camel_case() {
        let request: WorkerRequest = serde_json::from_value(json!({
            "datasetId": "server-12",
            "format": "normalized",
            "snapshots": []
        }))
        .unwrap();
        assert_eq!(request.dataset_id.as_str(), "server-12");
    }
}
