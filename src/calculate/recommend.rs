//! Main/Wing roster tiering.
//!
//! Selection is two explicit stages. Pool membership comes from the latest
//! scan's roster order with a per-guild cap; tiers come from score order
//! within that pool. Collapsing these into one global top-N-by-score cut
//! changes who qualifies.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{NormalizedSnapshot, PlayerComputed, PlayerKey, Recommendation, Recommendations};

/// Up to `cap_per_guild` members from the head of each guild's roster, in
/// declaration order, deduplicated across guilds (first occurrence wins).
///
/// Rosters are not sorted before capping: a strong player listed past the
/// cap is left out of the pool.
pub fn candidate_pool(latest: Option<&NormalizedSnapshot>, cap_per_guild: usize) -> Vec<PlayerKey> {
    let Some(snapshot) = latest else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    snapshot
        .guilds
        .iter()
        .flat_map(|guild| guild.members.iter().take(cap_per_guild))
        .filter(|member| seen.insert(member.player_key.clone()))
        .map(|member| member.player_key.clone())
        .collect()
}

/// Tier the pool by descending score: the first `main_size` are Main, the
/// rest of the pool Wing. Players outside the pool stay None.
pub fn classify(
    players: &mut [PlayerComputed],
    pool: &[PlayerKey],
    main_size: usize,
) -> Recommendations {
    let pool: HashSet<&str> = pool.iter().map(|k| k.as_str()).collect();

    let mut candidates: Vec<(PlayerKey, f64)> = players
        .iter()
        .filter(|p| pool.contains(p.player_key.as_str()))
        .map(|p| (p.player_key.clone(), p.score))
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    let split = main_size.min(candidates.len());
    let wing: Vec<PlayerKey> = candidates.split_off(split).into_iter().map(|(k, _)| k).collect();
    let main: Vec<PlayerKey> = candidates.into_iter().map(|(k, _)| k).collect();

    let main_set: HashSet<&PlayerKey> = main.iter().collect();
    let wing_set: HashSet<&PlayerKey> = wing.iter().collect();
    for player in players.iter_mut() {
        player.recommendation = if main_set.contains(&player.player_key) {
            Recommendation::Main
        } else if wing_set.contains(&player.player_key) {
            Recommendation::Wing
        } else {
            Recommendation::None
        };
    }

    debug!(
        "Classified {} Main and {} Wing from a pool of {}",
        main.len(),
        wing.len(),
        pool.len()
    );
    Recommendations { main, wing }
}
