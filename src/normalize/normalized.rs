//! Adapter for payloads that are already in normalized shape.

use serde::Deserialize;
use serde_json::Value;

use super::{NormalizeError, SnapshotAdapter};
use crate::models::timestamp::parse_timestamp;
use crate::models::{ManifestSnapshot, NormalizedSnapshot};

/// Accepts `normalized` and `normalized-demo` payloads after checking the
/// top-level shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedAdapter;

impl SnapshotAdapter for NormalizedAdapter {
    fn id(&self) -> &'static str {
        "normalized-demo"
    }

    fn label(&self) -> &'static str {
        "Demo Normalized"
    }

    fn supports_format(&self, format: &str) -> bool {
        matches!(format, "normalized-demo" | "normalized")
    }

    fn normalize(
        &self,
        raw: &Value,
        meta: &ManifestSnapshot,
    ) -> Result<NormalizedSnapshot, NormalizeError> {
        let invalid = |reason: String| NormalizeError::InvalidSnapshot {
            id: meta.id.to_string(),
            reason,
        };

        let scanned_at = raw
            .get("scannedAt")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if scanned_at.is_empty() {
            return Err(invalid("missing scannedAt".to_string()));
        }
        if parse_timestamp(scanned_at).is_none() {
            return Err(invalid(format!("unparseable scannedAt {:?}", scanned_at)));
        }
        if !raw.get("guilds").is_some_and(Value::is_array) {
            return Err(invalid("guilds is not an array".to_string()));
        }

        NormalizedSnapshot::deserialize(raw).map_err(|e| invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta() -> ManifestSnapshot {
        serde_json::from_value(json!({
            "id": "scan-7",
            "label": "Week 7",
            "date": "2025-02-14",
            "format": "normalized",
            "path": "scans/scan-7.json",
            "datasetId": "server-12"
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_payload() {
        let raw = json!({
            "scannedAt": "2025-02-14T06:00:00Z",
            "guilds": [{
                "guildKey": "g1",
                "guildName": "Iron Wolves",
                "members": [{
                    "playerKey": "s12:1001",
                    "name": "Alice",
                    "server": "s12",
                    "baseStats": 1500.0,
                    "level": 42,
                    "mine": 12,
                    "treasury": 3
                }]
            }]
        });

        let snapshot = NormalizedAdapter.normalize(&raw, &meta()).unwrap();
        assert_eq!(snapshot.guilds.len(), 1);
        assert_eq!(snapshot.member_count(), 1);
        assert_eq!(snapshot.guilds[0].members[0].level, 42.0);
    }

    #[test]
    fn test_empty_guilds_is_valid() {
        let raw = json!({"scannedAt": "2025-02-14", "guilds": []});
        let snapshot = NormalizedAdapter.normalize(&raw, &meta()).unwrap();
        assert!(snapshot.guilds.is_empty());
    }

    #[test]
    fn test_missing_timestamp() {
        let raw = json!({"scannedAt": "", "guilds": []});
        let err = NormalizedAdapter.normalize(&raw, &meta()).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Invalid normalized snapshot for scan-7"));
    }

    #[test]
    fn test_guilds_not_array() {
        let raw = json!({"scannedAt": "2025-02-14", "guilds": {"g1": {}}});
        assert!(matches!(
            NormalizedAdapter.normalize(&raw, &meta()),
            Err(NormalizeError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn test_bad_member_shape() {
        let raw = json!({
            "scannedAt": "2025-02-14",
            "guilds": [{"guildKey": "g1", "guildName": "G", "members": [{"name": "no key"}]}]
        });
        assert!(NormalizedAdapter.normalize(&raw, &meta()).is_err());
    }
}
