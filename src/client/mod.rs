//! Ballchasing API client.
//!
//! Talks to the external replay-hosting API: searches replays by player
//! name, fetches per-replay detail, and flattens one player's stat line out
//! of each detail payload. A fixed pacing delay between detail fetches keeps
//! the client under the API's request-rate ceiling.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::BallchasingConfig;
use crate::models::replay::{ReplayDetail, ReplaySearchResponse, ReplaySummary};
use crate::models::MatchRecord;

/// The search endpoint refuses counts above this.
const MAX_SEARCH_COUNT: usize = 200;

/// Errors that can occur while talking to the replay API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("API key is not a valid header value")]
    InvalidApiKey,
}

/// Client for the Ballchasing replay API.
pub struct ReplayClient {
    client: Client,
    base_url: String,
    rate_limit: Duration,
}

impl ReplayClient {
    /// Create a new client. The API token is sent as an `Authorization`
    /// header on every request.
    pub fn new(config: &BallchasingConfig, api_key: &str) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(api_key).map_err(|_| ClientError::InvalidApiKey)?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limit: Duration::from_millis(config.rate_limit_ms),
        })
    }

    /// Search for replays by player name, most recent first.
    ///
    /// Returns up to `min(count, 200)` replay summaries.
    pub async fn search_replays(
        &self,
        player_name: &str,
        count: usize,
    ) -> Result<Vec<ReplaySummary>, ClientError> {
        let url = format!("{}/replays", self.base_url);
        let count = count.min(MAX_SEARCH_COUNT);

        debug!("Searching replays for '{}' (count {})", player_name, count);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("player-name", player_name),
                ("count", &count.to_string()),
                ("sort-by", "replay-date"),
                ("sort-dir", "desc"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body: ReplaySearchResponse = response.json().await?;
        info!(
            "Found {} replays for player: {}",
            body.list.len(),
            player_name
        );

        Ok(body.list)
    }

    /// Fetch the full detail payload for one replay.
    pub async fn get_replay_detail(&self, replay_id: &str) -> Result<ReplayDetail, ClientError> {
        let url = format!("{}/replays/{}", self.base_url, replay_id);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch a player's match history: search, then fetch detail for each
    /// hit, keeping only replays where the exact name (case-insensitive) is
    /// on a roster. Single-replay failures are logged and skipped; the
    /// result may be shorter than requested.
    pub async fn get_player_match_history(
        &self,
        player_name: &str,
        num_games: usize,
    ) -> Vec<MatchRecord> {
        info!("Fetching match history for: {}", player_name);

        let replays = match self.search_replays(player_name, num_games).await {
            Ok(replays) => replays,
            Err(e) => {
                warn!("Replay search failed for '{}': {}", player_name, e);
                return Vec::new();
            }
        };

        if replays.is_empty() {
            info!("No replays found for {}", player_name);
            return Vec::new();
        }

        let total = replays.len();
        let mut history = Vec::new();

        for (i, replay) in replays.iter().enumerate() {
            debug!("Processing game {}/{}: {}", i + 1, total, replay.id);

            let detail = match self.get_replay_detail(&replay.id).await {
                Ok(detail) => detail,
                Err(e) => {
                    warn!("Skipping replay {}: {}", replay.id, e);
                    continue;
                }
            };

            // The search can fuzzy-match; only keep replays where the exact
            // requested name is actually on a roster.
            match extract_player_stats(&detail, player_name) {
                Some(record) => history.push(record),
                None => {
                    debug!(
                        "Skipping replay {}: player '{}' not in roster",
                        replay.id, player_name
                    );
                }
            }

            if i + 1 < total {
                tokio::time::sleep(self.rate_limit).await;
            }
        }

        info!(
            "Retrieved {} of {} games for {}",
            history.len(),
            total,
            player_name
        );

        history
    }
}

/// Flatten one player's stat line out of a replay detail payload.
///
/// Scans both rosters for a case-insensitive exact name match and determines
/// the outcome from the two teams' goal totals (strictly more goals wins).
/// Returns `None` when the player is not in the replay.
pub fn extract_player_stats(detail: &ReplayDetail, player_name: &str) -> Option<MatchRecord> {
    let (side, player) = detail.find_player(player_name)?;

    let blue_goals = detail.blue.stats.core.goals;
    let orange_goals = detail.orange.stats.core.goals;
    let won = match side {
        crate::models::TeamSide::Blue => blue_goals > orange_goals,
        crate::models::TeamSide::Orange => orange_goals > blue_goals,
    };

    let stats = &player.stats;

    Some(MatchRecord {
        replay_id: detail.id.clone(),
        date: detail.date.clone().unwrap_or_default(),
        duration: detail.duration,
        playlist: detail.playlist_name.clone(),
        team: side.as_str().to_string(),
        won,
        goals: stats.core.goals,
        assists: stats.core.assists,
        saves: stats.core.saves,
        shots: stats.core.shots,
        score: stats.core.score,
        shooting_percentage: stats.core.shooting_percentage,
        boost_collected: stats.boost.bcpm,
        boost_stolen: stats.boost.stolen,
        boost_used: stats.boost.used_while_supersonic,
        avg_speed: stats.movement.avg_speed,
        time_supersonic: stats.movement.time_supersonic_speed,
        time_defensive_third: stats.positioning.time_defensive_third,
        time_neutral_third: stats.positioning.time_neutral_third,
        time_offensive_third: stats.positioning.time_offensive_third,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay_detail_fixture() -> ReplayDetail {
        serde_json::from_str(
            r#"{
                "id": "replay-1",
                "date": "2026-02-10T18:00:00Z",
                "duration": 312,
                "playlist_name": "Ranked Doubles 2v2",
                "blue": {
                    "stats": {"core": {"goals": 3}},
                    "players": [
                        {
                            "name": "Foo",
                            "stats": {
                                "core": {
                                    "goals": 2,
                                    "assists": 1,
                                    "saves": 3,
                                    "shots": 5,
                                    "score": 450,
                                    "shooting_percentage": 40.0
                                },
                                "boost": {"bcpm": 350.5, "stolen": 12, "used_while_supersonic": 80},
                                "movement": {"avg_speed": 1450.0, "time_supersonic_speed": 42.0},
                                "positioning": {
                                    "time_defensive_third": 120.0,
                                    "time_neutral_third": 110.0,
                                    "time_offensive_third": 82.0
                                }
                            }
                        },
                        {"name": "Teammate"}
                    ]
                },
                "orange": {
                    "stats": {"core": {"goals": 1}},
                    "players": [{"name": "Rival"}]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_extract_blue_side_win() {
        let detail = replay_detail_fixture();
        let record = extract_player_stats(&detail, "Foo").unwrap();

        assert_eq!(record.replay_id, "replay-1");
        assert_eq!(record.team, "blue");
        assert!(record.won);
        assert_eq!(record.goals, 2);
        assert_eq!(record.assists, 1);
        assert_eq!(record.saves, 3);
        assert_eq!(record.score, 450);
        assert_eq!(record.shooting_percentage, 40.0);
        assert_eq!(record.boost_collected, 350.5);
        assert_eq!(record.boost_stolen, 12);
        assert_eq!(record.playlist.as_deref(), Some("Ranked Doubles 2v2"));
    }

    #[test]
    fn test_extract_orange_side_loss() {
        let detail = replay_detail_fixture();
        let record = extract_player_stats(&detail, "Rival").unwrap();

        assert_eq!(record.team, "orange");
        assert!(!record.won);
    }

    #[test]
    fn test_extract_case_insensitive_exact_match() {
        let detail = replay_detail_fixture();

        assert!(extract_player_stats(&detail, "foo").is_some());
        assert!(extract_player_stats(&detail, "FOO").is_some());
        assert!(extract_player_stats(&detail, "Foobar").is_none());
    }

    #[test]
    fn test_extract_missing_player() {
        let detail = replay_detail_fixture();
        assert!(extract_player_stats(&detail, "Nobody").is_none());
    }

    #[test]
    fn test_extract_defaults_missing_stats_to_zero() {
        let detail: ReplayDetail = serde_json::from_str(
            r#"{
                "id": "replay-2",
                "blue": {
                    "stats": {"core": {"goals": 0}},
                    "players": [{"name": "Foo"}]
                },
                "orange": {"stats": {"core": {"goals": 2}}}
            }"#,
        )
        .unwrap();

        let record = extract_player_stats(&detail, "Foo").unwrap();

        assert!(!record.won);
        assert_eq!(record.shooting_percentage, 0.0);
        assert_eq!(record.goals, 0);
        assert_eq!(record.avg_speed, 0.0);
        assert_eq!(record.date, "");
        assert!(record.playlist.is_none());
    }

    #[test]
    fn test_extract_draw_is_not_a_win() {
        // Equal goal totals: strictly-greater comparison means neither side won.
        let detail: ReplayDetail = serde_json::from_str(
            r#"{
                "id": "replay-3",
                "blue": {"stats": {"core": {"goals": 2}}, "players": [{"name": "Foo"}]},
                "orange": {"stats": {"core": {"goals": 2}}, "players": [{"name": "Bar"}]}
            }"#,
        )
        .unwrap();

        assert!(!extract_player_stats(&detail, "Foo").unwrap().won);
        assert!(!extract_player_stats(&detail, "Bar").unwrap().won);
    }
}
