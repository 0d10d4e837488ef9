//! Player-match fact models.

use serde::{Deserialize, Serialize};

/// A tracked player's database row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRow {
    pub id: i64,

    /// Case-sensitive name as first ingested.
    pub name: String,

    /// RFC 3339 timestamp of the most recent ingest.
    pub last_updated: Option<String>,

    /// Recomputed from stored match rows on every ingest.
    pub total_games: i64,
}

/// One player's statistical line from one replay.
///
/// Immutable once stored; `replay_id` is the dedup key within a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// External replay identifier.
    pub replay_id: String,

    /// ISO-ish date string from the source, used for chronological ordering.
    pub date: String,

    /// Match length in seconds.
    pub duration: i64,

    /// Game-mode label; `None` when the source omitted it.
    pub playlist: Option<String>,

    /// Side the player was on ("blue" or "orange").
    pub team: String,

    pub won: bool,

    pub goals: i64,
    pub assists: i64,
    pub saves: i64,
    pub shots: i64,
    pub score: i64,

    /// Percentage in [0, 100].
    pub shooting_percentage: f64,

    /// Boost collected per minute.
    pub boost_collected: f64,
    pub boost_stolen: i64,
    pub boost_used: i64,

    pub avg_speed: f64,
    pub time_supersonic: f64,

    pub time_defensive_third: f64,
    pub time_neutral_third: f64,
    pub time_offensive_third: f64,
}

impl Default for MatchRecord {
    fn default() -> Self {
        Self {
            replay_id: String::new(),
            date: String::new(),
            duration: 0,
            playlist: None,
            team: String::new(),
            won: false,
            goals: 0,
            assists: 0,
            saves: 0,
            shots: 0,
            score: 0,
            shooting_percentage: 0.0,
            boost_collected: 0.0,
            boost_stolen: 0,
            boost_used: 0,
            avg_speed: 0.0,
            time_supersonic: 0.0,
            time_defensive_third: 0.0,
            time_neutral_third: 0.0,
            time_offensive_third: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_record_default_is_zeroed() {
        let record = MatchRecord::default();
        assert_eq!(record.goals, 0);
        assert_eq!(record.shooting_percentage, 0.0);
        assert!(record.playlist.is_none());
        assert!(!record.won);
    }

    #[test]
    fn test_match_record_serialization_round_trip() {
        let record = MatchRecord {
            replay_id: "r1".to_string(),
            date: "2026-02-10T18:00:00Z".to_string(),
            playlist: Some("Ranked Doubles 2v2".to_string()),
            team: "blue".to_string(),
            won: true,
            goals: 2,
            ..Default::default()
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: MatchRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
