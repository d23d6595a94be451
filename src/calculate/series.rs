//! Snapshot ordering and series building.

use std::collections::HashMap;

use tracing::debug;

use crate::models::timestamp::format_timestamp;
use crate::models::{
    GuildKey, GuildSeries, GuildSeriesPoint, ManifestSnapshot, Metric, NormalizedMember,
    NormalizedSnapshot, PlayerKey, PlayerSeries, PlayerSeriesPoint, SnapshotSummary,
};

/// A snapshot paired with the manifest entry it was loaded from.
#[derive(Debug, Clone)]
pub struct OrderedSnapshot {
    pub snapshot: NormalizedSnapshot,
    pub meta: Option<ManifestSnapshot>,
}

/// Pair snapshots with their metadata by position, then sort by scan time.
///
/// The sort is stable, so snapshots sharing a timestamp keep input order.
pub fn order_snapshots(
    snapshots: Vec<NormalizedSnapshot>,
    metas: &[ManifestSnapshot],
) -> Vec<OrderedSnapshot> {
    let mut ordered: Vec<OrderedSnapshot> = snapshots
        .into_iter()
        .enumerate()
        .map(|(index, snapshot)| OrderedSnapshot {
            snapshot,
            meta: metas.get(index).cloned(),
        })
        .collect();
    ordered.sort_by_key(|o| o.snapshot.scanned_at);
    ordered
}

/// Arithmetic mean; 0 for an empty sample.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Median; even-sized samples average the two central values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Insertion-ordered accumulator keyed by identity.
#[derive(Debug)]
struct Accumulator<K, V> {
    index: HashMap<K, usize>,
    items: Vec<V>,
}

impl<K: std::hash::Hash + Eq + Clone, V> Accumulator<K, V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            items: Vec::new(),
        }
    }

    fn entry(&mut self, key: &K, init: impl FnOnce() -> V) -> &mut V {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.items.push(init());
                self.index.insert(key.clone(), self.items.len() - 1);
                self.items.len() - 1
            }
        };
        &mut self.items[slot]
    }

    fn into_vec(self) -> Vec<V> {
        self.items
    }
}

/// Output of the series builder.
#[derive(Debug, Clone, Default)]
pub struct SeriesSet {
    /// In first-seen order
    pub players: Vec<PlayerSeries>,
    /// In first-seen order
    pub guilds: Vec<GuildSeries>,
    pub summaries: Vec<SnapshotSummary>,
}

/// Fold chronologically ordered snapshots into player and guild series.
///
/// Series are sparse: a player or guild missing from a scan contributes no
/// point for that date. Identity fields take the latest observation.
pub fn build_series(snapshots: &[OrderedSnapshot]) -> SeriesSet {
    let mut players: Accumulator<PlayerKey, PlayerSeries> = Accumulator::new();
    let mut guilds: Accumulator<GuildKey, GuildSeries> = Accumulator::new();
    let mut summaries = Vec::with_capacity(snapshots.len());

    for OrderedSnapshot { snapshot, meta } in snapshots {
        let date = snapshot.scanned_at;
        let mut snapshot_member_count = 0;

        for guild in &snapshot.guilds {
            let mut samples: [Vec<f64>; 4] = Default::default();

            for member in &guild.members {
                snapshot_member_count += 1;
                for (slot, metric) in Metric::ALL.iter().enumerate() {
                    samples[slot].push(member_value(member, *metric));
                }

                let series = players.entry(&member.player_key, || PlayerSeries {
                    player_key: member.player_key.clone(),
                    name: member.name.clone(),
                    server: member.server.clone(),
                    player_id: member.player_id.clone(),
                    points: Vec::new(),
                });
                series.name = member.name.clone();
                series.server = member.server.clone();
                series.player_id = member.player_id.clone();
                series.points.push(PlayerSeriesPoint {
                    date,
                    base_stats: member.base_stats,
                    level: member.level,
                    mine: member.mine,
                    treasury: member.treasury,
                    guild_key: guild.guild_key.clone(),
                });
            }

            let [base_stats, level, mine, treasury] = &samples;
            let series = guilds.entry(&guild.guild_key, || GuildSeries {
                guild_key: guild.guild_key.clone(),
                guild_name: guild.guild_name.clone(),
                points: Vec::new(),
            });
            series.points.push(GuildSeriesPoint {
                date,
                member_count: guild.members.len(),
                base_stats_median: median(base_stats),
                base_stats_avg: average(base_stats),
                level_median: median(level),
                level_avg: average(level),
                mine_median: median(mine),
                mine_avg: average(mine),
                treasury_median: median(treasury),
                treasury_avg: average(treasury),
            });
        }

        summaries.push(summarize(snapshot, meta.as_ref(), snapshot_member_count));
    }

    let set = SeriesSet {
        players: players.into_vec(),
        guilds: guilds.into_vec(),
        summaries,
    };
    debug!(
        "Built {} player series and {} guild series from {} snapshots",
        set.players.len(),
        set.guilds.len(),
        snapshots.len()
    );
    set
}

fn member_value(member: &NormalizedMember, metric: Metric) -> f64 {
    match metric {
        Metric::BaseStats => member.base_stats,
        Metric::Level => member.level,
        Metric::Mine => member.mine,
        Metric::Treasury => member.treasury,
    }
}

/// Snapshots without metadata fall back to their scan timestamp for id,
/// label and date.
fn summarize(
    snapshot: &NormalizedSnapshot,
    meta: Option<&ManifestSnapshot>,
    member_count: usize,
) -> SnapshotSummary {
    let fallback = format_timestamp(&snapshot.scanned_at);
    let (id, label, date) = match meta {
        Some(meta) => (meta.id.clone(), meta.label.clone(), meta.date.clone()),
        None => (fallback.clone().into(), fallback.clone(), fallback),
    };
    SnapshotSummary {
        id,
        label,
        date,
        guild_count: snapshot.guilds.len(),
        member_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::test_support::{guild, member, meta, snapshot};

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[1.0, 2.0, 6.0]), 3.0);
        assert_eq!(average(&[]), 0.0);
    }

    #[test]
    fn test_order_snapshots_sorts_and_keeps_meta() {
        let late = snapshot("2025-03-01", vec![]);
        let early = snapshot("2025-01-01", vec![]);
        let metas = vec![meta("late", "2025-03-01"), meta("early", "2025-01-01")];

        let ordered = order_snapshots(vec![late, early], &metas);

        let ids: Vec<_> = ordered
            .iter()
            .map(|o| o.meta.as_ref().unwrap().id.to_string())
            .collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn test_build_series_sparse_and_latest_identity() {
        let first = snapshot(
            "2025-01-01",
            vec![guild(
                "g1",
                vec![member("p1", 100.0), member("p2", 200.0)],
            )],
        );
        let mut renamed = member("p1", 150.0);
        renamed.name = "Alice Renamed".to_string();
        let second = snapshot("2025-02-01", vec![guild("g1", vec![renamed])]);

        let ordered = order_snapshots(vec![first, second], &[]);
        let set = build_series(&ordered);

        assert_eq!(set.players.len(), 2);
        assert_eq!(set.players[0].player_key.as_str(), "p1");
        assert_eq!(set.players[0].points.len(), 2);
        assert_eq!(set.players[0].name, "Alice Renamed");
        // p2 missed the second scan
        assert_eq!(set.players[1].points.len(), 1);

        assert_eq!(set.guilds.len(), 1);
        let points = &set.guilds[0].points;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].member_count, 2);
        assert_eq!(points[0].base_stats_median, 150.0);
        assert_eq!(points[0].base_stats_avg, 150.0);
        assert_eq!(points[1].base_stats_median, 150.0);
    }

    #[test]
    fn test_summaries_fall_back_to_scan_time() {
        let ordered = order_snapshots(
            vec![snapshot("2025-01-01", vec![guild("g1", vec![member("p1", 1.0)])])],
            &[],
        );
        let set = build_series(&ordered);

        let summary = &set.summaries[0];
        assert_eq!(summary.id.as_str(), "2025-01-01T00:00:00Z");
        assert_eq!(summary.label, "2025-01-01T00:00:00Z");
        assert_eq!(summary.guild_count, 1);
        assert_eq!(summary.member_count, 1);
    }

    #[test]
    fn test_summaries_use_metadata() {
        let ordered = order_snapshots(
            vec![snapshot("2025-01-01", vec![])],
            &[meta("jan", "2025-01-01")],
        );
        let set = build_series(&ordered);
        assert_eq!(set.summaries[0].id.as_str(), "jan");
        assert_eq!(set.summaries[0].member_count, 0);
    }
}
