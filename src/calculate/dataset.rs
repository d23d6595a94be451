//! One full pass from normalized snapshots to a [`WorkerResult`].

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::intervals::{best_interval, build_intervals, diff_days, sorted_by_rate_desc, worst_interval};
use super::movers::top_movers;
use super::ranking::apply_ranking;
use super::rates::weighted_per_day;
use super::recommend::{candidate_pool, classify};
use super::series::{build_series, order_snapshots, OrderedSnapshot};
use super::windows::build_window_metrics;
use crate::config::EngineConfig;
use crate::models::timestamp::format_timestamp;
use crate::models::{
    ByMetric, Coverage, DatasetId, GuildComputed, GuildSeries, ManifestSnapshot, Metric,
    NormalizedSnapshot, Percentiles, PlayerComputed, PlayerSeries, Recommendation, Tags,
    WorkerResult,
};

/// Compute a dataset with the default engine settings.
pub fn compute_dataset(
    snapshots: Vec<NormalizedSnapshot>,
    metas: &[ManifestSnapshot],
    dataset_id: impl Into<DatasetId>,
) -> WorkerResult {
    compute_dataset_with(snapshots, metas, dataset_id, &EngineConfig::default())
}

/// Compute a dataset.
///
/// `metas` pairs with `snapshots` by position; input order is otherwise
/// irrelevant. The pass is pure: identical input gives identical output.
pub fn compute_dataset_with(
    snapshots: Vec<NormalizedSnapshot>,
    metas: &[ManifestSnapshot],
    dataset_id: impl Into<DatasetId>,
    config: &EngineConfig,
) -> WorkerResult {
    let dataset_id = dataset_id.into();
    if snapshots.len() != metas.len() {
        warn!(
            "Dataset {}: {} snapshots but {} metadata entries",
            dataset_id,
            snapshots.len(),
            metas.len()
        );
    }

    let ordered = order_snapshots(snapshots, metas);
    let series = build_series(&ordered);

    let guilds: Vec<GuildComputed> = series
        .guilds
        .into_iter()
        .map(|guild| compute_guild(guild, config))
        .collect();
    let guild_names: HashMap<&str, &str> = guilds
        .iter()
        .map(|g| (g.guild_key.as_str(), g.guild_name.as_str()))
        .collect();

    let mut players: Vec<PlayerComputed> = series
        .players
        .into_iter()
        .map(|player| {
            let mut computed = compute_player(player);
            computed.latest_guild_name = computed
                .latest_guild_key
                .as_ref()
                .and_then(|key| guild_names.get(key.as_str()))
                .map(|name| name.to_string());
            computed
        })
        .collect();

    apply_ranking(&mut players, config);

    let latest = ordered.last().map(|o| &o.snapshot);
    let pool = candidate_pool(latest, config.candidate_cap_per_guild);
    let recommendations = classify(&mut players, &pool, config.main_size);
    let movers = top_movers(&players, config.top_movers);

    let (range_start, latest_date) = date_range(&ordered);

    info!(
        "Computed dataset {}: {} snapshots, {} players, {} guilds",
        dataset_id,
        ordered.len(),
        players.len(),
        guilds.len()
    );

    WorkerResult {
        dataset_id,
        latest_date,
        range_start,
        snapshots: series.summaries,
        players,
        guilds,
        top_movers: movers,
        recommendations,
    }
}

fn compute_player(series: PlayerSeries) -> PlayerComputed {
    let points = series.points;

    let intervals = ByMetric::from_fn(|metric| build_intervals(&points, |p| p.value(metric)));
    let last_intervals = ByMetric::from_fn(|metric| intervals.get(metric).last().cloned());
    let rates = ByMetric::from_fn(|metric| weighted_per_day(intervals.get(metric)));

    let coverage = match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 2 => Coverage {
            points: points.len(),
            days: diff_days(first.date, last.date),
        },
        _ => Coverage {
            points: points.len(),
            days: 0,
        },
    };

    let window_metrics = build_window_metrics(&points);
    let best = best_interval(&intervals.base_stats);
    let worst = worst_interval(&intervals.base_stats);

    PlayerComputed {
        player_key: series.player_key,
        name: series.name,
        server: series.server,
        player_id: series.player_id,
        latest_guild_key: points.last().map(|p| p.guild_key.clone()),
        latest_guild_name: None,
        base_stats_per_day_year: rates.base_stats,
        level_per_day_year: rates.level,
        mine_per_day_year: rates.mine,
        treasury_per_day_year: rates.treasury,
        points,
        intervals,
        last_intervals,
        coverage,
        window_metrics,
        best_interval: best,
        worst_interval: worst,
        percentiles: Percentiles::default(),
        score: 0.0,
        rank: 0,
        recommendation: Recommendation::None,
        tags: Tags::default(),
    }
}

fn compute_guild(series: GuildSeries, config: &EngineConfig) -> GuildComputed {
    let points = series.points;

    let intervals = build_intervals(&points, |p| p.median(Metric::BaseStats));
    let mine = build_intervals(&points, |p| p.median(Metric::Mine));
    let treasury = build_intervals(&points, |p| p.median(Metric::Treasury));
    let latest = |metric: Metric| points.last().map(|p| p.median(metric)).unwrap_or(0.0);

    let ranked = sorted_by_rate_desc(&intervals);
    let good_intervals: Vec<_> = ranked.iter().take(config.highlight_intervals).cloned().collect();
    let bad_intervals: Vec<_> = ranked.iter().rev().take(config.highlight_intervals).cloned().collect();

    debug!(
        "Guild {}: {} points, {} intervals",
        series.guild_key,
        points.len(),
        intervals.len()
    );

    GuildComputed {
        guild_key: series.guild_key,
        guild_name: series.guild_name,
        base_stats_per_day_year: weighted_per_day(&intervals),
        mine_per_day_year: weighted_per_day(&mine),
        treasury_per_day_year: weighted_per_day(&treasury),
        level_median_latest: latest(Metric::Level),
        base_stats_median_latest: latest(Metric::BaseStats),
        mine_median_latest: latest(Metric::Mine),
        treasury_median_latest: latest(Metric::Treasury),
        good_intervals,
        bad_intervals,
        intervals,
        points,
    }
}

/// First and last scan timestamps; both empty when there are no snapshots.
fn date_range(ordered: &[OrderedSnapshot]) -> (String, String) {
    match (ordered.first(), ordered.last()) {
        (Some(first), Some(last)) => (
            format_timestamp(&first.snapshot.scanned_at),
            format_timestamp(&last.snapshot.scanned_at),
        ),
        _ => (String::new(), String::new()),
    }
}
