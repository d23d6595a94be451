//! Fastest-improving players per lookback window.

use crate::models::{ByWindow, PlayerComputed, PlayerWindowEntry};

/// Top `limit` players per window by base-stats window growth rate.
///
/// Players without a window metric are skipped. Ties keep the order of
/// `players`.
pub fn top_movers(players: &[PlayerComputed], limit: usize) -> ByWindow<Vec<PlayerWindowEntry>> {
    ByWindow::from_fn(|window| {
        let mut entries: Vec<PlayerWindowEntry> = players
            .iter()
            .filter_map(|player| {
                let metric = player.window_metrics.base_stats.get(window).as_ref()?;
                Some(PlayerWindowEntry {
                    player_key: player.player_key.clone(),
                    name: player.name.clone(),
                    guild_key: player.latest_guild_key.clone(),
                    per_day: metric.per_day,
                    delta: metric.delta,
                })
            })
            .collect();
        entries.sort_by(|a, b| b.per_day.total_cmp(&a.per_day));
        entries.truncate(limit);
        entries
    })
}
