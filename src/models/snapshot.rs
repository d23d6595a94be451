//! Normalized roster snapshots: the engine's input shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp::serde_timestamp;
use super::{GuildKey, PlayerKey};

/// One guild member as observed in a single scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMember {
    pub player_key: PlayerKey,
    pub name: String,
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    pub base_stats: f64,
    pub level: f64,
    pub mine: f64,
    pub treasury: f64,
}

/// A guild and its roster, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedGuild {
    pub guild_key: GuildKey,
    pub guild_name: String,
    #[serde(default)]
    pub members: Vec<NormalizedMember>,
}

/// One point-in-time scan of every guild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSnapshot {
    #[serde(with = "serde_timestamp")]
    pub scanned_at: DateTime<Utc>,
    pub guilds: Vec<NormalizedGuild>,
}

impl NormalizedSnapshot {
    /// Total members across every guild in this scan.
    pub fn member_count(&self) -> usize {
        self.guilds.iter().map(|g| g.members.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_deserializes_camel_case() {
        let json = r#"{
            "scannedAt": "2025-01-01",
            "guilds": [{
                "guildKey": "g1",
                "guildName": "Iron Wolves",
                "members": [{
                    "playerKey": "p1",
                    "name": "Alice",
                    "server": "eu-1",
                    "baseStats": 1200,
                    "level": 40,
                    "mine": 15,
                    "treasury": 9.5
                }]
            }]
        }"#;

        let snapshot: NormalizedSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.guilds.len(), 1);
        assert_eq!(snapshot.member_count(), 1);

        let member = &snapshot.guilds[0].members[0];
        assert_eq!(member.player_key.as_str(), "p1");
        assert!(member.player_id.is_none());
        assert_eq!(member.treasury, 9.5);
    }

    #[test]
    fn test_snapshot_rejects_bad_timestamp() {
        let json = r#"{"scannedAt": "not a date", "guilds": []}"#;
        assert!(serde_json::from_str::<NormalizedSnapshot>(json).is_err());
    }

    #[test]
    fn test_guild_without_members_is_empty() {
        let json = r#"{"guildKey": "g1", "guildName": "Empty"}"#;
        let guild: NormalizedGuild = serde_json::from_str(json).unwrap();
        assert!(guild.members.is_empty());
    }
}
