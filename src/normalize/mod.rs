//! Payload normalization.
//!
//! Each dataset declares a payload `format`; an adapter turns one raw
//! payload of that format into a [`NormalizedSnapshot`]. The registry picks
//! the first adapter that claims the format.

mod custom;
mod normalized;

pub use custom::CustomRawAdapter;
pub use normalized::NormalizedAdapter;

use thiserror::Error;

use crate::models::{ManifestSnapshot, NormalizedSnapshot};

/// Errors raised while normalizing a payload.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("No adapter found for format {0}")]
    UnsupportedFormat(String),

    #[error("Invalid normalized snapshot for {id}: {reason}")]
    InvalidSnapshot { id: String, reason: String },

    #[error("Custom parsing not configured (snapshot {id})")]
    NotConfigured { id: String },
}

/// Converts raw payloads of one or more formats.
pub trait SnapshotAdapter: Send + Sync {
    /// Stable identifier.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn label(&self) -> &'static str;

    fn supports_format(&self, format: &str) -> bool;

    fn normalize(
        &self,
        raw: &serde_json::Value,
        meta: &ManifestSnapshot,
    ) -> Result<NormalizedSnapshot, NormalizeError>;
}

/// Ordered set of adapters.
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn SnapshotAdapter>>,
}

impl AdapterRegistry {
    pub fn new(adapters: Vec<Box<dyn SnapshotAdapter>>) -> Self {
        Self { adapters }
    }

    /// First adapter supporting `format`.
    pub fn find(&self, format: &str) -> Option<&dyn SnapshotAdapter> {
        self.adapters
            .iter()
            .find(|adapter| adapter.supports_format(format))
            .map(|adapter| adapter.as_ref())
    }

    /// Like [`find`](Self::find), but a missing adapter is an error.
    pub fn require(&self, format: &str) -> Result<&dyn SnapshotAdapter, NormalizeError> {
        self.find(format)
            .ok_or_else(|| NormalizeError::UnsupportedFormat(format.to_string()))
    }

    /// Identifiers of every registered adapter, in lookup order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.id()).collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new(vec![
            Box::new(NormalizedAdapter),
            Box::new(CustomRawAdapter),
        ])
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.ids())
            .finish()
    }
}
