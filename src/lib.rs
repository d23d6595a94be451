//! # Roster Pulse
//!
//! Guild roster snapshot analytics: growth rates, percentile rankings, and
//! Main/Wing roster tiering from a series of point-in-time scans.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (snapshots, series, computed results)
//! - **calculate**: The analytics pass and ranking queries
//! - **normalize**: Format adapters turning raw payloads into snapshots
//! - **fetch**: Snapshot transport over HTTP
//! - **storage**: Local data directory access
//! - **worker**: Dataset jobs, progress messages and load tracking
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod storage;
pub mod worker;

pub use models::*;
