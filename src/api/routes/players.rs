use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::analytics::{
    self, PerformanceComparison, PlaylistStats, RecentForm, StrengthsWeaknesses, SummaryStats,
    TrendPoint,
};
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::MatchRecord;

/// Default window for the recent-form endpoint.
const DEFAULT_FORM_GAMES: usize = 10;

/// Default window sizes for the early/recent comparison.
const DEFAULT_COMPARE_WINDOW: usize = 10;

/// Load a player's stored games, newest first. Unknown players and players
/// with nothing stored both surface as 404.
pub(super) fn load_records(state: &AppState, name: &str) -> Result<Vec<MatchRecord>, ApiError> {
    let records = state.store.get_player_stats(name)?;
    if records.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No stored games for player: {}",
            name
        )));
    }
    Ok(records)
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub player: String,
    pub summary: SummaryStats,
}

pub async fn get_summary(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let records = load_records(&state, &name)?;
    let summary = analytics::summary_stats(&records)
        .ok_or_else(|| ApiError::NotFound(format!("No stored games for player: {}", name)))?;

    Ok(Json(SummaryResponse {
        player: name,
        summary,
    }))
}

#[derive(Debug, Serialize)]
pub struct PlaylistsResponse {
    pub player: String,
    pub playlists: BTreeMap<String, PlaylistStats>,
}

pub async fn get_playlists(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlaylistsResponse>, ApiError> {
    let records = load_records(&state, &name)?;

    Ok(Json(PlaylistsResponse {
        player: name,
        playlists: analytics::stats_by_playlist(&records),
    }))
}

#[derive(Debug, Deserialize)]
pub struct FormParams {
    pub games: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub player: String,
    pub form: RecentForm,
}

pub async fn get_recent_form(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<FormParams>,
) -> Result<Json<FormResponse>, ApiError> {
    let n = params.games.unwrap_or(DEFAULT_FORM_GAMES);
    if n == 0 {
        return Err(ApiError::BadRequest("games must be at least 1".to_string()));
    }

    let records = load_records(&state, &name)?;
    let form = analytics::recent_form(&records, n)
        .ok_or_else(|| ApiError::NotFound(format!("No stored games for player: {}", name)))?;

    Ok(Json(FormResponse { player: name, form }))
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub player: String,
    pub points: Vec<TrendPoint>,
}

pub async fn get_trend(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TrendResponse>, ApiError> {
    let records = load_records(&state, &name)?;

    Ok(Json(TrendResponse {
        player: name,
        points: analytics::performance_trend(&records),
    }))
}

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub first: Option<usize>,
    pub last: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub player: String,
    #[serde(flatten)]
    pub comparison: PerformanceComparison,
}

pub async fn get_comparison(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<CompareParams>,
) -> Result<Json<CompareResponse>, ApiError> {
    let first_n = params.first.unwrap_or(DEFAULT_COMPARE_WINDOW);
    let last_n = params.last.unwrap_or(DEFAULT_COMPARE_WINDOW);
    if first_n == 0 || last_n == 0 {
        return Err(ApiError::BadRequest(
            "window sizes must be at least 1".to_string(),
        ));
    }

    let records = load_records(&state, &name)?;
    let comparison = analytics::compare_performance(&records, first_n, last_n).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Need at least {} stored games to compare, have {}",
            first_n + last_n,
            records.len()
        ))
    })?;

    Ok(Json(CompareResponse {
        player: name,
        comparison,
    }))
}

#[derive(Debug, Serialize)]
pub struct StrengthsResponse {
    pub player: String,
    #[serde(flatten)]
    pub analysis: StrengthsWeaknesses,
}

pub async fn get_strengths(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StrengthsResponse>, ApiError> {
    let records = load_records(&state, &name)?;
    let analysis = analytics::strengths_and_weaknesses(&records)
        .ok_or_else(|| ApiError::NotFound(format!("No stored games for player: {}", name)))?;

    Ok(Json(StrengthsResponse {
        player: name,
        analysis,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListMatchesParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    pub player: String,
    pub total: usize,
    pub matches: Vec<MatchRecord>,
}

pub async fn list_matches(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ListMatchesParams>,
) -> Result<Json<MatchListResponse>, ApiError> {
    let mut records = load_records(&state, &name)?;
    let total = records.len();

    if let Some(limit) = params.limit {
        records.truncate(limit);
    }

    Ok(Json(MatchListResponse {
        player: name,
        total,
        matches: records,
    }))
}
