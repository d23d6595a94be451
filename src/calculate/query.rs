//! Filtered, re-sorted views over a computed result.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{GuildKey, Metric, PlayerComputed, Recommendation, WindowKey, WorkerResult};

/// Column a ranking view is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Score,
    BaseStats,
    Level,
    Mine,
    Treasury,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Score => "score",
            SortKey::BaseStats => "baseStats",
            SortKey::Level => "level",
            SortKey::Mine => "mine",
            SortKey::Treasury => "treasury",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            SortKey::Score,
            SortKey::BaseStats,
            SortKey::Level,
            SortKey::Mine,
            SortKey::Treasury,
        ]
        .into_iter()
        .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| format!("unknown sort key: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingQuery {
    pub guild: Option<GuildKey>,
    pub recommendation: Option<Recommendation>,
    pub sort: SortKey,
    pub window: WindowKey,
}

impl Default for RankingQuery {
    fn default() -> Self {
        Self {
            guild: None,
            recommendation: None,
            sort: SortKey::Score,
            window: WindowKey::Six,
        }
    }
}

impl RankingQuery {
    fn matches(&self, player: &PlayerComputed) -> bool {
        let guild_ok = match &self.guild {
            Some(guild) => player.latest_guild_key.as_ref() == Some(guild),
            None => true,
        };
        let recommendation_ok = match self.recommendation {
            Some(recommendation) => player.recommendation == recommendation,
            None => true,
        };
        guild_ok && recommendation_ok
    }

    /// Value this query sorts a player by.
    pub fn sort_value(&self, player: &PlayerComputed) -> f64 {
        let window = |metric: Metric| player.window_metrics.get(metric).get(self.window).as_ref();
        match self.sort {
            SortKey::Score => player.score,
            SortKey::BaseStats => player.base_stats_per_day_year,
            SortKey::Level => window(Metric::Level).map(|w| w.delta).unwrap_or(0.0),
            SortKey::Mine => window(Metric::Mine).map(|w| w.per_day).unwrap_or(0.0),
            SortKey::Treasury => window(Metric::Treasury).map(|w| w.per_day).unwrap_or(0.0),
        }
    }
}

/// Players matching the query's filters, highest sort value first. Ties keep
/// rank order.
pub fn rank_players<'a>(result: &'a WorkerResult, query: &RankingQuery) -> Vec<&'a PlayerComputed> {
    let mut players: Vec<&PlayerComputed> = result
        .players
        .iter()
        .filter(|p| query.matches(p))
        .collect();
    players.sort_by(|a, b| query.sort_value(b).total_cmp(&query.sort_value(a)));
    players
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::test_support::{at, scored};
    use crate::models::{ByWindow, IntervalMetric, Recommendations};

    fn result(players: Vec<PlayerComputed>) -> WorkerResult {
        WorkerResult {
            dataset_id: "ds".into(),
            latest_date: String::new(),
            range_start: String::new(),
            snapshots: vec![],
            players,
            guilds: vec![],
            top_movers: ByWindow::default(),
            recommendations: Recommendations::default(),
        }
    }

    #[test]
    fn test_default_query_sorts_by_score() {
        let data = result(vec![scored("a", 0.2), scored("b", 0.9), scored("c", 0.5)]);
        let ranked = rank_players(&data, &RankingQuery::default());
        let keys: Vec<_> = ranked.iter().map(|p| p.player_key.as_str()).collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_filters_by_guild_and_recommendation() {
        let mut a = scored("a", 0.1);
        a.recommendation = Recommendation::Main;
        let mut b = scored("b", 0.2);
        b.latest_guild_key = Some("g2".into());
        b.recommendation = Recommendation::Main;
        let c = scored("c", 0.3);
        let data = result(vec![a, b, c]);

        let query = RankingQuery {
            guild: Some("g1".into()),
            recommendation: Some(Recommendation::Main),
            ..RankingQuery::default()
        };
        let ranked = rank_players(&data, &query);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].player_key.as_str(), "a");
    }

    #[test]
    fn test_window_sort_treats_missing_as_zero() {
        let mut a = scored("a", 0.0);
        a.window_metrics.mine.six = Some(IntervalMetric::new(
            at("2025-01-01"),
            at("2025-07-01"),
            181,
            -181.0,
        ));
        let mut b = scored("b", 0.0);
        b.window_metrics.mine.six = Some(IntervalMetric::new(
            at("2025-01-01"),
            at("2025-07-01"),
            181,
            362.0,
        ));
        let c = scored("c", 0.0);
        let data = result(vec![a, b, c]);

        let query = RankingQuery {
            sort: SortKey::Mine,
            ..RankingQuery::default()
        };
        let ranked = rank_players(&data, &query);
        let keys: Vec<_> = ranked.iter().map(|p| p.player_key.as_str()).collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_query_deserializes_with_defaults() {
        let query: RankingQuery =
            serde_json::from_str(r#"{"sort": "baseStats", "window": "12"}"#).unwrap();
        assert_eq!(query.sort, SortKey::BaseStats);
        assert_eq!(query.window, WindowKey::Twelve);
        assert!(query.guild.is_none());
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("basestats".parse::<SortKey>().unwrap(), SortKey::BaseStats);
        assert_eq!("treasury".parse::<SortKey>().unwrap(), SortKey::Treasury);
        assert!("gold".parse::<SortKey>().is_err());
    }
}
