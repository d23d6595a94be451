//! In-memory snapshot source for job and loader tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::fetch::{FetchError, SnapshotSource};
use crate::models::{Manifest, ManifestSnapshot};

#[derive(Debug, Default)]
pub struct MemorySource {
    manifest: Manifest,
    payloads: HashMap<String, Value>,
    stalled: HashSet<String>,
    broken: HashSet<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, payload: Value) -> Self {
        self.payloads.insert(path.to_string(), payload);
        self
    }

    /// Fetches of `path` never complete.
    pub fn stalled(mut self, path: &str) -> Self {
        self.stalled.insert(path.to_string());
        self
    }

    /// Fetches of `path` panic.
    pub fn broken(mut self, path: &str) -> Self {
        self.broken.insert(path.to_string());
        self
    }
}

#[async_trait]
impl SnapshotSource for MemorySource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn load_manifest(&self) -> Result<Manifest, FetchError> {
        Ok(self.manifest.clone())
    }

    async fn fetch_snapshot(&self, snapshot: &ManifestSnapshot) -> Result<Value, FetchError> {
        if self.stalled.contains(&snapshot.path) {
            std::future::pending::<()>().await;
        }
        if self.broken.contains(&snapshot.path) {
            panic!("source crashed reading {}", snapshot.path);
        }
        self.payloads
            .get(&snapshot.path)
            .cloned()
            .ok_or_else(|| FetchError::for_snapshot(snapshot, "not found"))
    }
}

/// One guild with one member, `p1`, at the given base stats.
pub fn valid_payload(scanned_at: &str, base_stats: f64) -> Value {
    json!({
        "scannedAt": scanned_at,
        "guilds": [{
            "guildKey": "g1",
            "guildName": "Iron Wolves",
            "members": [{
                "playerKey": "p1",
                "name": "Alice",
                "server": "s1",
                "baseStats": base_stats,
                "level": base_stats / 10.0,
                "mine": base_stats / 100.0,
                "treasury": base_stats / 1000.0
            }]
        }]
    })
}
