//! SQLite persistence for players and their match history.
//!
//! Two tables joined by a foreign key: `players` (one row per tracked name)
//! and `match_history` (one row per player per replay). The
//! `UNIQUE (player_id, replay_id)` constraint makes ingestion idempotent:
//! re-inserting a replay a player already has is a silent per-row skip, so
//! the same batch can be stored twice without duplicating anything.
//!
//! Every operation opens a connection, runs a short transaction, and closes
//! it again; no connection is held across calls.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{MatchRecord, PlayerRow};

/// Storage-layer errors. Everything here is fatal to the current operation;
/// duplicate-row inserts never surface as errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result of one ingestion batch.
#[derive(Debug, Clone, Copy)]
pub struct UpsertSummary {
    /// Rows actually inserted (duplicates excluded).
    pub games_added: usize,

    /// Player's stored game count after the batch.
    pub total_games: i64,
}

/// File-backed match store.
#[derive(Debug, Clone)]
pub struct MatchStore {
    db_path: PathBuf,
}

impl MatchStore {
    /// Open (or create) the store at the given path and ensure the schema
    /// exists.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.as_ref().to_path_buf(),
        };

        let conn = store.connect()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS players (
                player_id    INTEGER PRIMARY KEY AUTOINCREMENT,
                player_name  TEXT UNIQUE NOT NULL,
                last_updated TEXT,
                total_games  INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS match_history (
                match_id             INTEGER PRIMARY KEY AUTOINCREMENT,
                player_id            INTEGER NOT NULL REFERENCES players (player_id),
                replay_id            TEXT NOT NULL,
                date                 TEXT NOT NULL,
                duration             INTEGER NOT NULL DEFAULT 0,
                playlist             TEXT,
                team                 TEXT NOT NULL DEFAULT '',
                won                  INTEGER NOT NULL DEFAULT 0,
                goals                INTEGER NOT NULL DEFAULT 0,
                assists              INTEGER NOT NULL DEFAULT 0,
                saves                INTEGER NOT NULL DEFAULT 0,
                shots                INTEGER NOT NULL DEFAULT 0,
                score                INTEGER NOT NULL DEFAULT 0,
                shooting_percentage  REAL NOT NULL DEFAULT 0,
                boost_collected      REAL NOT NULL DEFAULT 0,
                boost_stolen         INTEGER NOT NULL DEFAULT 0,
                boost_used           INTEGER NOT NULL DEFAULT 0,
                avg_speed            REAL NOT NULL DEFAULT 0,
                time_supersonic      REAL NOT NULL DEFAULT 0,
                time_defensive_third REAL NOT NULL DEFAULT 0,
                time_neutral_third   REAL NOT NULL DEFAULT 0,
                time_offensive_third REAL NOT NULL DEFAULT 0,
                UNIQUE (player_id, replay_id)
            );",
        )?;

        debug!("Match store ready at {}", store.db_path.display());
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(conn)
    }

    /// Check whether a player has been ingested before.
    pub fn player_exists(&self, name: &str) -> Result<bool, StoreError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM players WHERE player_name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Fetch a player's row, if present.
    pub fn get_player(&self, name: &str) -> Result<Option<PlayerRow>, StoreError> {
        let conn = self.connect()?;
        let row = conn
            .query_row(
                "SELECT player_id, player_name, last_updated, total_games
                 FROM players WHERE player_name = ?1",
                params![name],
                |row| {
                    Ok(PlayerRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        last_updated: row.get(2)?,
                        total_games: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Store a batch of match records for a player.
    ///
    /// Creates the player row when absent, inserts each record with
    /// insert-or-ignore semantics keyed on `(player_id, replay_id)`, then
    /// recomputes the player's `total_games` and `last_updated`. Returns how
    /// many rows were actually new.
    pub fn upsert_match_history(
        &self,
        name: &str,
        records: &[MatchRecord],
    ) -> Result<UpsertSummary, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO players (player_name, last_updated) VALUES (?1, ?2)",
            params![name, Utc::now().to_rfc3339()],
        )?;

        let player_id: i64 = tx.query_row(
            "SELECT player_id FROM players WHERE player_name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        let mut games_added = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO match_history (
                    player_id, replay_id, date, duration, playlist,
                    team, won, goals, assists, saves, shots, score,
                    shooting_percentage, boost_collected, boost_stolen,
                    boost_used, avg_speed, time_supersonic,
                    time_defensive_third, time_neutral_third, time_offensive_third
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                          ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
            )?;

            for record in records {
                games_added += stmt.execute(params![
                    player_id,
                    record.replay_id,
                    record.date,
                    record.duration,
                    record.playlist,
                    record.team,
                    record.won,
                    record.goals,
                    record.assists,
                    record.saves,
                    record.shots,
                    record.score,
                    record.shooting_percentage,
                    record.boost_collected,
                    record.boost_stolen,
                    record.boost_used,
                    record.avg_speed,
                    record.time_supersonic,
                    record.time_defensive_third,
                    record.time_neutral_third,
                    record.time_offensive_third,
                ])?;
            }
        }

        tx.execute(
            "UPDATE players
             SET last_updated = ?1,
                 total_games = (SELECT COUNT(*) FROM match_history WHERE player_id = ?2)
             WHERE player_id = ?2",
            params![Utc::now().to_rfc3339(), player_id],
        )?;

        let total_games: i64 = tx.query_row(
            "SELECT total_games FROM players WHERE player_id = ?1",
            params![player_id],
            |row| row.get(0),
        )?;

        tx.commit()?;

        info!("Added {} new games to store for {}", games_added, name);

        Ok(UpsertSummary {
            games_added,
            total_games,
        })
    }

    /// All stored match records for a player, most recent first.
    pub fn get_player_stats(&self, name: &str) -> Result<Vec<MatchRecord>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT m.replay_id, m.date, m.duration, m.playlist, m.team, m.won,
                    m.goals, m.assists, m.saves, m.shots, m.score,
                    m.shooting_percentage, m.boost_collected, m.boost_stolen,
                    m.boost_used, m.avg_speed, m.time_supersonic,
                    m.time_defensive_third, m.time_neutral_third, m.time_offensive_third
             FROM match_history m
             JOIN players p ON m.player_id = p.player_id
             WHERE p.player_name = ?1
             ORDER BY m.date DESC",
        )?;

        let rows = stmt.query_map(params![name], |row| {
            Ok(MatchRecord {
                replay_id: row.get(0)?,
                date: row.get(1)?,
                duration: row.get(2)?,
                playlist: row.get(3)?,
                team: row.get(4)?,
                won: row.get(5)?,
                goals: row.get(6)?,
                assists: row.get(7)?,
                saves: row.get(8)?,
                shots: row.get(9)?,
                score: row.get(10)?,
                shooting_percentage: row.get(11)?,
                boost_collected: row.get(12)?,
                boost_stolen: row.get(13)?,
                boost_used: row.get(14)?,
                avg_speed: row.get(15)?,
                time_supersonic: row.get(16)?,
                time_defensive_third: row.get(17)?,
                time_neutral_third: row.get(18)?,
                time_offensive_third: row.get(19)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, MatchStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MatchStore::open(dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn record(replay_id: &str, date: &str) -> MatchRecord {
        MatchRecord {
            replay_id: replay_id.to_string(),
            date: date.to_string(),
            playlist: Some("Ranked Doubles 2v2".to_string()),
            team: "blue".to_string(),
            won: true,
            goals: 2,
            assists: 1,
            saves: 3,
            score: 450,
            shooting_percentage: 40.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_player_exists_after_upsert() {
        let (_dir, store) = test_store();

        assert!(!store.player_exists("Squishy").unwrap());

        store
            .upsert_match_history("Squishy", &[record("r1", "2026-02-10T18:00:00Z")])
            .unwrap();

        assert!(store.player_exists("Squishy").unwrap());
        // Name matching in the store is exact.
        assert!(!store.player_exists("squishy").unwrap());
    }

    #[test]
    fn test_upsert_reports_new_rows_and_totals() {
        let (_dir, store) = test_store();

        let summary = store
            .upsert_match_history(
                "Squishy",
                &[
                    record("r1", "2026-02-10T18:00:00Z"),
                    record("r2", "2026-02-11T18:00:00Z"),
                ],
            )
            .unwrap();

        assert_eq!(summary.games_added, 2);
        assert_eq!(summary.total_games, 2);
    }

    #[test]
    fn test_reingest_is_idempotent() {
        let (_dir, store) = test_store();
        let batch = vec![
            record("r1", "2026-02-10T18:00:00Z"),
            record("r2", "2026-02-11T18:00:00Z"),
        ];

        store.upsert_match_history("Squishy", &batch).unwrap();
        let first = store.get_player_stats("Squishy").unwrap();

        let summary = store.upsert_match_history("Squishy", &batch).unwrap();
        let second = store.get_player_stats("Squishy").unwrap();

        assert_eq!(summary.games_added, 0);
        assert_eq!(summary.total_games, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_partial_overlap_only_inserts_new() {
        let (_dir, store) = test_store();

        store
            .upsert_match_history("Squishy", &[record("r1", "2026-02-10T18:00:00Z")])
            .unwrap();

        let summary = store
            .upsert_match_history(
                "Squishy",
                &[
                    record("r1", "2026-02-10T18:00:00Z"),
                    record("r3", "2026-02-12T18:00:00Z"),
                ],
            )
            .unwrap();

        assert_eq!(summary.games_added, 1);
        assert_eq!(summary.total_games, 2);
    }

    #[test]
    fn test_same_replay_allowed_for_two_players() {
        let (_dir, store) = test_store();
        let shared = record("r1", "2026-02-10T18:00:00Z");

        let a = store.upsert_match_history("Squishy", &[shared.clone()]).unwrap();
        let b = store.upsert_match_history("justin.", &[shared]).unwrap();

        assert_eq!(a.games_added, 1);
        assert_eq!(b.games_added, 1);
        assert_eq!(store.get_player_stats("Squishy").unwrap().len(), 1);
        assert_eq!(store.get_player_stats("justin.").unwrap().len(), 1);
    }

    #[test]
    fn test_get_player_stats_date_descending() {
        let (_dir, store) = test_store();

        store
            .upsert_match_history(
                "Squishy",
                &[
                    record("r1", "2026-02-10T18:00:00Z"),
                    record("r3", "2026-02-12T18:00:00Z"),
                    record("r2", "2026-02-11T18:00:00Z"),
                ],
            )
            .unwrap();

        let stats = store.get_player_stats("Squishy").unwrap();
        let dates: Vec<&str> = stats.iter().map(|r| r.date.as_str()).collect();

        assert_eq!(
            dates,
            vec![
                "2026-02-12T18:00:00Z",
                "2026-02-11T18:00:00Z",
                "2026-02-10T18:00:00Z"
            ]
        );
    }

    #[test]
    fn test_get_player_stats_round_trips_fields() {
        let (_dir, store) = test_store();

        let mut original = record("r1", "2026-02-10T18:00:00Z");
        original.boost_collected = 350.5;
        original.boost_stolen = 12;
        original.time_offensive_third = 82.0;
        original.playlist = None;

        store
            .upsert_match_history("Squishy", &[original.clone()])
            .unwrap();

        let stats = store.get_player_stats("Squishy").unwrap();
        assert_eq!(stats, vec![original]);
    }

    #[test]
    fn test_last_updated_set_on_ingest() {
        let (_dir, store) = test_store();

        store
            .upsert_match_history("Squishy", &[record("r1", "2026-02-10T18:00:00Z")])
            .unwrap();

        let player = store.get_player("Squishy").unwrap().unwrap();
        assert!(player.last_updated.is_some());
        assert_eq!(player.total_games, 1);
    }

    #[test]
    fn test_unknown_player_has_no_stats() {
        let (_dir, store) = test_store();
        assert!(store.get_player_stats("Nobody").unwrap().is_empty());
        assert!(store.get_player("Nobody").unwrap().is_none());
    }
}
