//! Core data models: normalized input, series, and computed output.

mod computed;
mod keys;
mod manifest;
mod metrics;
mod series;
mod snapshot;
pub mod timestamp;

pub use computed::*;
pub use keys::*;
pub use manifest::*;
pub use metrics::*;
pub use series::*;
pub use snapshot::*;
