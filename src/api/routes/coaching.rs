use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::analytics;
use crate::api::routes::players::load_records;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::coach::{self, CoachError};

/// Recent-form window fed into the coaching prompt.
const COACHING_FORM_GAMES: usize = 10;

#[derive(Debug, Serialize)]
pub struct QuickTipsResponse {
    pub player: String,
    pub tips: Vec<String>,
}

/// Rule-based tips; always available, no model call.
pub async fn get_quick_tips(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<QuickTipsResponse>, ApiError> {
    let records = load_records(&state, &name)?;
    let summary = analytics::summary_stats(&records)
        .ok_or_else(|| ApiError::NotFound(format!("No stored games for player: {}", name)))?;

    Ok(Json(QuickTipsResponse {
        player: name,
        tips: coach::quick_tips(&summary),
    }))
}

#[derive(Debug, Serialize)]
pub struct CoachingResponse {
    pub player: String,
    pub advice: String,
    pub backend: String,
}

/// AI-generated coaching advice. Returns 503 when no coach backend is
/// configured.
pub async fn get_coaching(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CoachingResponse>, ApiError> {
    let backend = state
        .coach
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("AI coaching is not configured".to_string()))?;

    let records = load_records(&state, &name)?;
    let not_found = || ApiError::NotFound(format!("No stored games for player: {}", name));

    let summary = analytics::summary_stats(&records).ok_or_else(not_found)?;
    let recent = analytics::recent_form(&records, COACHING_FORM_GAMES).ok_or_else(not_found)?;
    let strengths = analytics::strengths_and_weaknesses(&records).ok_or_else(not_found)?;
    let playlists = analytics::stats_by_playlist(&records);

    let advice =
        coach::generate_coaching_tips(backend.as_ref(), &summary, &recent, &strengths, &playlists)
            .await
            .map_err(|e| match e {
                CoachError::Unavailable(msg) => ApiError::Unavailable(msg),
                other => ApiError::Internal(other.to_string()),
            })?;

    Ok(Json(CoachingResponse {
        player: name,
        advice,
        backend: backend.name().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::api::state::AppState;
    use crate::api::build_router;
    use crate::coach::backend::MockCoachBackend;
    use crate::models::MatchRecord;
    use crate::store::MatchStore;

    fn seeded_state(dir: &tempfile::TempDir, with_coach: bool) -> AppState {
        let store = MatchStore::open(dir.path().join("test.db")).unwrap();
        let records: Vec<MatchRecord> = (0..6)
            .map(|i| MatchRecord {
                replay_id: format!("r{}", i),
                date: format!("2026-03-{:02}T18:00:00Z", i + 1),
                won: i % 2 == 0,
                goals: 2,
                shots: 4,
                shooting_percentage: 50.0,
                ..Default::default()
            })
            .collect();
        store.upsert_match_history("Squishy", &records).unwrap();

        AppState {
            store,
            client: None,
            coach: with_coach.then(|| {
                Arc::new(MockCoachBackend::new("Shoot earlier."))
                    as Arc<dyn crate::coach::backend::CoachBackend>
            }),
        }
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
        let app = build_router(state);
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        (status, value)
    }

    #[tokio::test]
    async fn test_quick_tips_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(seeded_state(&dir, false), "/api/players/Squishy/tips").await;

        assert_eq!(status, StatusCode::OK);
        let tips = body["tips"].as_array().unwrap();
        assert!(!tips.is_empty());
    }

    #[tokio::test]
    async fn test_coaching_without_backend_is_503() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) =
            get_json(seeded_state(&dir, false), "/api/players/Squishy/coaching").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_coaching_with_mock_backend() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) =
            get_json(seeded_state(&dir, true), "/api/players/Squishy/coaching").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["advice"], "Shoot earlier.");
        assert_eq!(body["backend"], "mock");
    }

    #[tokio::test]
    async fn test_coaching_unknown_player_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _) = get_json(seeded_state(&dir, true), "/api/players/Nobody/coaching").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
