//! Percentile ranking, composite score, and strength/weakness tags.

use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{ByMetric, MetricTag, Percentiles, PlayerComputed, Tags};

/// Tie-averaged percentile of each value among all values.
///
/// Output is index-aligned with the input. Equal values share the midpoint
/// of their sorted positions, normalized by `len - 1`; a single value gets 1.
/// Values are grouped under `total_cmp`, so NaNs tie with each other and
/// sort above every number.
pub fn compute_percentiles(values: &[f64]) -> Vec<f64> {
    let mut percentiles = vec![0.0; values.len()];
    if values.is_empty() {
        return percentiles;
    }

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let last = (values.len() - 1) as f64;
    let mut start = 0;
    while start < order.len() {
        let value = values[order[start]];
        let mut end = start;
        while end < order.len() && values[order[end]].total_cmp(&value).is_eq() {
            end += 1;
        }

        let rank = (start + end - 1) as f64 / 2.0;
        let percentile = if values.len() == 1 { 1.0 } else { rank / last };
        for &index in &order[start..end] {
            percentiles[index] = percentile;
        }
        start = end;
    }

    percentiles
}

/// Weighted composite of the base-stats, level, and resource percentiles.
pub fn score(percentiles: &Percentiles, config: &EngineConfig) -> f64 {
    let weights = &config.score_weights;
    percentiles.base_stats * weights.base_stats
        + percentiles.level * weights.level
        + percentiles.resource * weights.resource
}

/// Strength tags at or above the strength threshold, weakness tags at or
/// below the weakness threshold.
pub fn tags_for(percentiles: &Percentiles, config: &EngineConfig) -> Tags {
    let dimensions = [
        (MetricTag::BaseStatsPace, percentiles.base_stats),
        (MetricTag::Leveling, percentiles.level),
        (MetricTag::ResourcePace, percentiles.resource),
    ];

    Tags {
        strengths: dimensions
            .iter()
            .filter(|(_, p)| *p >= config.strength_threshold)
            .map(|(tag, _)| *tag)
            .collect(),
        weaknesses: dimensions
            .iter()
            .filter(|(_, p)| *p <= config.weakness_threshold)
            .map(|(tag, _)| *tag)
            .collect(),
    }
}

/// Fill percentiles, score, rank and tags, leaving `players` sorted by
/// descending score. Ties keep their incoming order.
///
/// Rank is the 1-based position in that order, so equal scores get
/// consecutive ranks rather than a shared one.
pub fn apply_ranking(players: &mut [PlayerComputed], config: &EngineConfig) {
    let by_metric = ByMetric::from_fn(|metric| {
        let rates: Vec<f64> = players.iter().map(|p| p.per_day_year(metric)).collect();
        compute_percentiles(&rates)
    });

    for (index, player) in players.iter_mut().enumerate() {
        let mine = by_metric.mine[index];
        let treasury = by_metric.treasury[index];
        player.percentiles = Percentiles {
            base_stats: by_metric.base_stats[index],
            level: by_metric.level[index],
            mine,
            treasury,
            resource: (mine + treasury) / 2.0,
        };
        player.score = score(&player.percentiles, config);
    }

    players.sort_by(|a, b| b.score.total_cmp(&a.score));

    for (index, player) in players.iter_mut().enumerate() {
        player.rank = index + 1;
        player.tags = tags_for(&player.percentiles, config);
    }

    debug!("Ranked {} players", players.len());
}
