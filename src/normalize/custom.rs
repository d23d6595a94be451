//! Placeholder for site-specific raw scan formats.

use serde_json::Value;

use super::{NormalizeError, SnapshotAdapter};
use crate::models::{ManifestSnapshot, NormalizedSnapshot};

/// Claims `custom-raw` and rejects every payload until a parser for the
/// raw format is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomRawAdapter;

impl SnapshotAdapter for CustomRawAdapter {
    fn id(&self) -> &'static str {
        "custom-raw"
    }

    fn label(&self) -> &'static str {
        "Custom Raw"
    }

    fn supports_format(&self, format: &str) -> bool {
        format == "custom-raw"
    }

    fn normalize(
        &self,
        _raw: &Value,
        meta: &ManifestSnapshot,
    ) -> Result<NormalizedSnapshot, NormalizeError> {
        Err(NormalizeError::NotConfigured {
            id: meta.id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_rejects() {
        let meta: ManifestSnapshot = serde_json::from_value(serde_json::json!({
            "id": "raw-1",
            "label": "Raw",
            "date": "2025-01-01",
            "format": "custom-raw",
            "path": "scans/raw-1.html",
            "datasetId": "raw"
        }))
        .unwrap();

        let err = CustomRawAdapter
            .normalize(&serde_json::json!({}), &meta)
            .unwrap_err();
        assert_eq!(err.to_string(), "Custom parsing not configured (snapshot raw-1)");
        assert!(!CustomRawAdapter.supports_format("normalized"));
    }
}
