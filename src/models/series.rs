//! Per-player and per-guild chronological series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp::serde_timestamp;
use super::{GuildKey, Metric, PlayerKey, SnapshotId};

/// One observation of a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSeriesPoint {
    #[serde(with = "serde_timestamp")]
    pub date: DateTime<Utc>,
    pub base_stats: f64,
    pub level: f64,
    pub mine: f64,
    pub treasury: f64,
    /// Guild the player was listed under in this scan
    pub guild_key: GuildKey,
}

impl PlayerSeriesPoint {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::BaseStats => self.base_stats,
            Metric::Level => self.level,
            Metric::Mine => self.mine,
            Metric::Treasury => self.treasury,
        }
    }
}

/// Every observation of one player, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSeries {
    pub player_key: PlayerKey,
    pub name: String,
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    pub points: Vec<PlayerSeriesPoint>,
}

/// Aggregate roster statistics for one guild in one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildSeriesPoint {
    #[serde(with = "serde_timestamp")]
    pub date: DateTime<Utc>,
    pub member_count: usize,
    pub base_stats_median: f64,
    pub base_stats_avg: f64,
    pub level_median: f64,
    pub level_avg: f64,
    pub mine_median: f64,
    pub mine_avg: f64,
    pub treasury_median: f64,
    pub treasury_avg: f64,
}

impl GuildSeriesPoint {
    pub fn median(&self, metric: Metric) -> f64 {
        match metric {
            Metric::BaseStats => self.base_stats_median,
            Metric::Level => self.level_median,
            Metric::Mine => self.mine_median,
            Metric::Treasury => self.treasury_median,
        }
    }

    pub fn avg(&self, metric: Metric) -> f64 {
        match metric {
            Metric::BaseStats => self.base_stats_avg,
            Metric::Level => self.level_avg,
            Metric::Mine => self.mine_avg,
            Metric::Treasury => self.treasury_avg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildSeries {
    pub guild_key: GuildKey,
    pub guild_name: String,
    pub points: Vec<GuildSeriesPoint>,
}

/// Headline counts for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub id: SnapshotId,
    pub label: String,
    pub date: String,
    pub guild_count: usize,
    pub member_count: usize,
}
