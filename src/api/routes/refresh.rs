use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::ingest::{self, IngestError, IngestOptions};

#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    pub games: Option<usize>,
    pub force: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub player: String,
    pub fetched: bool,
    pub games_added: usize,
    pub total_games: i64,
}

/// Fetch a player's recent replays and store them. Returns 503 when the
/// server was started without a replay API key.
pub async fn trigger_refresh(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<RefreshParams>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let client = state
        .client
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Replay fetching is not configured".to_string()))?;

    let mut options = IngestOptions::default();
    if let Some(games) = params.games {
        if games == 0 {
            return Err(ApiError::BadRequest("games must be at least 1".to_string()));
        }
        options.num_games = games;
    }
    options.force = params.force.unwrap_or(false);

    let outcome = ingest::refresh_player(client, &state.store, &name, options)
        .await
        .map_err(|e| match e {
            IngestError::NoData(player) => {
                ApiError::NotFound(format!("No replays found for player: {}", player))
            }
            IngestError::Store(e) => ApiError::Internal(e.to_string()),
        })?;

    Ok(Json(RefreshResponse {
        player: name,
        fetched: outcome.fetched,
        games_added: outcome.games_added,
        total_games: outcome.total_games,
    }))
}
