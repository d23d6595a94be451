//! Identity keys for players, guilds, datasets and snapshots.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// An opaque identity key supplied by the snapshot producer.
///
/// Keys are compared byte-for-byte; no case folding or trimming happens
/// here since normalization owns key shape.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// Create a new key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Type alias for player keys
pub type PlayerKey = Key;

/// Type alias for guild keys
pub type GuildKey = Key;

/// Type alias for dataset IDs
pub type DatasetId = Key;

/// Type alias for snapshot IDs
pub type SnapshotId = Key;
