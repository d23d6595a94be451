//! Roster analytics engine.
//!
//! Derives everything shown downstream from a set of normalized snapshots:
//! - Player and guild series
//! - Consecutive-scan intervals and trailing calendar windows
//! - Day-weighted growth rates
//! - Percentiles, composite score and rank
//! - Main/Wing tiering and top movers

pub mod dataset;
pub mod intervals;
pub mod movers;
pub mod query;
pub mod ranking;
pub mod rates;
pub mod recommend;
pub mod series;
pub mod windows;

#[cfg(test)]
mod test_support;

pub use dataset::{compute_dataset, compute_dataset_with};
pub use query::{rank_players, RankingQuery, SortKey};
