//! Ingestion orchestration.
//!
//! Glue between the replay client and the match store: decides whether a
//! player needs a fresh fetch or can be served from stored data, runs the
//! fetch → upsert pipeline, and reports how much was added.

use thiserror::Error;
use tracing::info;

use crate::client::ReplayClient;
use crate::store::{MatchStore, StoreError};

/// Ingestion errors. A player with no replays at all is reported as
/// `NoData` so callers can show "no replays found" instead of a failure.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No replays found for player '{0}'")]
    NoData(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Options for one ingestion run.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// How many recent games to request from the replay API.
    pub num_games: usize,

    /// Fetch even when the player is already stored.
    pub force: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            num_games: 30,
            force: false,
        }
    }
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Copy)]
pub struct IngestOutcome {
    /// Whether the replay API was consulted (false = served from store).
    pub fetched: bool,

    /// New rows stored this run.
    pub games_added: usize,

    /// Player's stored game count after the run.
    pub total_games: i64,
}

/// Ensure a player's match history is present in the store.
///
/// A player that is already stored is reused as-is unless `force` is set.
/// Otherwise the pipeline fetches from the replay API and upserts the
/// batch; partial fetches (some replays skipped) are fine and only visible
/// through the games-added count.
pub async fn refresh_player(
    client: &ReplayClient,
    store: &MatchStore,
    player_name: &str,
    options: IngestOptions,
) -> Result<IngestOutcome, IngestError> {
    if !options.force {
        if let Some(player) = store.get_player(player_name)? {
            info!(
                "Player {} already stored ({} games), skipping fetch",
                player_name, player.total_games
            );
            return Ok(IngestOutcome {
                fetched: false,
                games_added: 0,
                total_games: player.total_games,
            });
        }
    }

    let history = client
        .get_player_match_history(player_name, options.num_games)
        .await;

    if history.is_empty() {
        return Err(IngestError::NoData(player_name.to_string()));
    }

    let summary = store.upsert_match_history(player_name, &history)?;

    Ok(IngestOutcome {
        fetched: true,
        games_added: summary.games_added,
        total_games: summary.total_games,
    })
}
