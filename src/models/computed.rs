//! Fully derived analytics for players, guilds, and the dataset as a whole.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    ByMetric, ByWindow, DatasetId, GuildKey, GuildSeriesPoint, IntervalMetric, Metric, PlayerKey,
    PlayerSeriesPoint, SnapshotSummary, WindowMetric,
};

/// Roster tier assigned from the latest-snapshot candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Recommendation {
    Main,
    Wing,
    #[default]
    None,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Main => write!(f, "Main"),
            Recommendation::Wing => write!(f, "Wing"),
            Recommendation::None => write!(f, "None"),
        }
    }
}

impl FromStr for Recommendation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(Recommendation::Main),
            "wing" => Ok(Recommendation::Wing),
            "none" => Ok(Recommendation::None),
            other => Err(format!("unknown recommendation: {}", other)),
        }
    }
}

/// Strength/weakness label for a percentile dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricTag {
    #[serde(rename = "BaseStats Pace")]
    BaseStatsPace,
    #[serde(rename = "Leveling")]
    Leveling,
    #[serde(rename = "Resource Pace")]
    ResourcePace,
}

impl fmt::Display for MetricTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricTag::BaseStatsPace => write!(f, "BaseStats Pace"),
            MetricTag::Leveling => write!(f, "Leveling"),
            MetricTag::ResourcePace => write!(f, "Resource Pace"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tags {
    pub strengths: Vec<MetricTag>,
    pub weaknesses: Vec<MetricTag>,
}

/// Percentile standing (0..=1) among all players, per rate metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Percentiles {
    pub base_stats: f64,
    pub level: f64,
    pub mine: f64,
    pub treasury: f64,
    /// Mean of the mine and treasury percentiles
    pub resource: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    pub points: usize,
    pub days: i64,
}

/// A player's series plus everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerComputed {
    pub player_key: PlayerKey,
    pub name: String,
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_guild_key: Option<GuildKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_guild_name: Option<String>,
    pub points: Vec<PlayerSeriesPoint>,
    pub intervals: ByMetric<Vec<IntervalMetric>>,
    pub last_intervals: ByMetric<Option<IntervalMetric>>,
    pub base_stats_per_day_year: f64,
    pub level_per_day_year: f64,
    pub mine_per_day_year: f64,
    pub treasury_per_day_year: f64,
    pub coverage: Coverage,
    pub window_metrics: ByMetric<ByWindow<Option<WindowMetric>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_interval: Option<IntervalMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worst_interval: Option<IntervalMetric>,
    pub percentiles: Percentiles,
    pub score: f64,
    pub rank: usize,
    pub recommendation: Recommendation,
    pub tags: Tags,
}

impl PlayerComputed {
    /// Day-weighted aggregate rate for one metric.
    pub fn per_day_year(&self, metric: Metric) -> f64 {
        match metric {
            Metric::BaseStats => self.base_stats_per_day_year,
            Metric::Level => self.level_per_day_year,
            Metric::Mine => self.mine_per_day_year,
            Metric::Treasury => self.treasury_per_day_year,
        }
    }
}

/// A guild's series plus its aggregate growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildComputed {
    pub guild_key: GuildKey,
    pub guild_name: String,
    pub points: Vec<GuildSeriesPoint>,
    /// Base-stats median growth between consecutive scans
    pub intervals: Vec<IntervalMetric>,
    pub base_stats_per_day_year: f64,
    pub mine_per_day_year: f64,
    pub treasury_per_day_year: f64,
    pub level_median_latest: f64,
    pub base_stats_median_latest: f64,
    pub mine_median_latest: f64,
    pub treasury_median_latest: f64,
    pub good_intervals: Vec<IntervalMetric>,
    pub bad_intervals: Vec<IntervalMetric>,
}

/// Leaderboard row for one lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWindowEntry {
    pub player_key: PlayerKey,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_key: Option<GuildKey>,
    pub per_day: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub main: Vec<PlayerKey>,
    pub wing: Vec<PlayerKey>,
}

/// The complete, fully materialized output of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerResult {
    pub dataset_id: DatasetId,
    /// Last snapshot timestamp; empty when there were no snapshots
    pub latest_date: String,
    /// First snapshot timestamp; empty when there were no snapshots
    pub range_start: String,
    pub snapshots: Vec<SnapshotSummary>,
    /// Ordered by rank
    pub players: Vec<PlayerComputed>,
    pub guilds: Vec<GuildComputed>,
    pub top_movers: ByWindow<Vec<PlayerWindowEntry>>,
    pub recommendations: Recommendations,
}

impl WorkerResult {
    /// Get a player by key.
    pub fn player(&self, key: &str) -> Option<&PlayerComputed> {
        self.players.iter().find(|p| p.player_key.as_str() == key)
    }

    /// Get a guild by key.
    pub fn guild(&self, key: &str) -> Option<&GuildComputed> {
        self.guilds.iter().find(|g| g.guild_key.as_str() == key)
    }
}
