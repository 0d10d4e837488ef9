//! Ballchasing API payload models.
//!
//! These mirror the shapes returned by the replay search and detail
//! endpoints. Every stat field carries `#[serde(default)]` so that missing
//! telemetry decodes as zero instead of failing ingestion; the defaults are
//! validated once here at the boundary rather than patched up downstream.

use serde::{Deserialize, Serialize};

/// Which side of the pitch a player was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Blue,
    Orange,
}

impl TeamSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::Blue => "blue",
            TeamSide::Orange => "orange",
        }
    }
}

impl std::fmt::Display for TeamSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response envelope from the replay search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplaySearchResponse {
    #[serde(default)]
    pub list: Vec<ReplaySummary>,
}

/// One entry from the replay search endpoint. Only the id is guaranteed;
/// everything else is informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub id: String,

    #[serde(default)]
    pub replay_title: Option<String>,

    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub playlist_name: Option<String>,
}

/// Full per-replay payload from the detail endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayDetail {
    #[serde(default)]
    pub id: String,

    /// ISO-ish date string as reported by the source.
    #[serde(default)]
    pub date: Option<String>,

    /// Match length in seconds.
    #[serde(default)]
    pub duration: i64,

    /// Game-mode label; absent for some replay uploads.
    #[serde(default)]
    pub playlist_name: Option<String>,

    #[serde(default)]
    pub blue: TeamDetail,

    #[serde(default)]
    pub orange: TeamDetail,
}

impl ReplayDetail {
    /// Team section for the given side.
    pub fn team(&self, side: TeamSide) -> &TeamDetail {
        match side {
            TeamSide::Blue => &self.blue,
            TeamSide::Orange => &self.orange,
        }
    }

    /// Case-insensitive exact-name roster lookup across both teams.
    pub fn find_player(&self, name: &str) -> Option<(TeamSide, &PlayerEntry)> {
        for side in [TeamSide::Blue, TeamSide::Orange] {
            if let Some(player) = self
                .team(side)
                .players
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(name))
            {
                return Some((side, player));
            }
        }
        None
    }
}

/// One team's section of a replay detail payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamDetail {
    #[serde(default)]
    pub players: Vec<PlayerEntry>,

    #[serde(default)]
    pub stats: TeamStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamStats {
    #[serde(default)]
    pub core: TeamCoreStats,
}

/// Aggregate team stats; only goals matter for win determination.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamCoreStats {
    #[serde(default)]
    pub goals: i64,
}

/// One player's roster entry with nested stat groups.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerEntry {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub stats: PlayerStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerStats {
    #[serde(default)]
    pub core: CoreStats,

    #[serde(default)]
    pub boost: BoostStats,

    #[serde(default)]
    pub movement: MovementStats,

    #[serde(default)]
    pub positioning: PositioningStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoreStats {
    #[serde(default)]
    pub goals: i64,
    #[serde(default)]
    pub assists: i64,
    #[serde(default)]
    pub saves: i64,
    #[serde(default)]
    pub shots: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub shooting_percentage: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoostStats {
    /// Boost collected per minute.
    #[serde(default)]
    pub bcpm: f64,
    #[serde(default)]
    pub stolen: i64,
    #[serde(default)]
    pub used_while_supersonic: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementStats {
    #[serde(default)]
    pub avg_speed: f64,
    #[serde(default)]
    pub time_supersonic_speed: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositioningStats {
    #[serde(default)]
    pub time_defensive_third: f64,
    #[serde(default)]
    pub time_neutral_third: f64,
    #[serde(default)]
    pub time_offensive_third: f64,
}
