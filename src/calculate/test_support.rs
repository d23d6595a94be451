//! Fixture builders shared by the calculation tests.

use chrono::{DateTime, Utc};

use crate::models::timestamp::parse_timestamp;
use crate::models::{
    ByMetric, Coverage, ManifestSnapshot, NormalizedGuild, NormalizedMember, NormalizedSnapshot,
    Percentiles, PlayerComputed, PlayerSeriesPoint, Recommendation, Tags,
};

pub fn at(date: &str) -> DateTime<Utc> {
    parse_timestamp(date).unwrap()
}

/// Member whose four metrics all start from `base_stats`-derived values.
pub fn member(key: &str, base_stats: f64) -> NormalizedMember {
    NormalizedMember {
        player_key: key.into(),
        name: format!("Player {}", key),
        server: "s1".to_string(),
        player_id: None,
        base_stats,
        level: base_stats / 10.0,
        mine: base_stats / 100.0,
        treasury: base_stats / 1000.0,
    }
}

pub fn member_with(
    key: &str,
    base_stats: f64,
    level: f64,
    mine: f64,
    treasury: f64,
) -> NormalizedMember {
    NormalizedMember {
        base_stats,
        level,
        mine,
        treasury,
        ..member(key, base_stats)
    }
}

pub fn guild(key: &str, members: Vec<NormalizedMember>) -> NormalizedGuild {
    NormalizedGuild {
        guild_key: key.into(),
        guild_name: format!("Guild {}", key),
        members,
    }
}

pub fn snapshot(date: &str, guilds: Vec<NormalizedGuild>) -> NormalizedSnapshot {
    NormalizedSnapshot {
        scanned_at: at(date),
        guilds,
    }
}

pub fn meta(id: &str, date: &str) -> ManifestSnapshot {
    ManifestSnapshot {
        id: id.into(),
        label: format!("Scan {}", id),
        date: date.to_string(),
        format: "normalized".to_string(),
        path: format!("scans/{}.json", id),
        scope: "server".to_string(),
        dataset_id: "test".into(),
        notes: None,
    }
}

pub fn point(date: &str, base_stats: f64) -> PlayerSeriesPoint {
    PlayerSeriesPoint {
        date: at(date),
        base_stats,
        level: base_stats / 10.0,
        mine: base_stats / 100.0,
        treasury: base_stats / 1000.0,
        guild_key: "g1".into(),
    }
}

/// Bare computed player carrying only a key and a score.
pub fn scored(key: &str, score: f64) -> PlayerComputed {
    PlayerComputed {
        player_key: key.into(),
        name: format!("Player {}", key),
        server: "s1".to_string(),
        player_id: None,
        latest_guild_key: Some("g1".into()),
        latest_guild_name: None,
        points: Vec::new(),
        intervals: ByMetric::default(),
        last_intervals: ByMetric::default(),
        base_stats_per_day_year: 0.0,
        level_per_day_year: 0.0,
        mine_per_day_year: 0.0,
        treasury_per_day_year: 0.0,
        coverage: Coverage::default(),
        window_metrics: ByMetric::default(),
        best_interval: None,
        worst_interval: None,
        percentiles: Percentiles::default(),
        score,
        rank: 0,
        recommendation: Recommendation::None,
        tags: Tags::default(),
    }
}
