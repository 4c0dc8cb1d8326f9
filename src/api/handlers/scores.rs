use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::{state::AppState, types::*};
use crate::domain::{ProcessedBatch, ScoreResult};

/// GET /api/v1/scores
pub async fn get_scores(
    State(state): State<AppState>,
) -> std::result::Result<Json<ProcessedBatch>, (StatusCode, String)> {
    let batch = state.orchestrator.get_latest().await;
    if batch.is_empty() {
        return Err((StatusCode::NOT_FOUND, "No scores available".to_string()));
    }
    Ok(Json(batch))
}

/// GET /api/v1/scores/:entity
pub async fn get_entity_score(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> std::result::Result<Json<ScoreResult>, (StatusCode, String)> {
    let entity_id = entity.to_uppercase();
    let mut batch = state.orchestrator.get_latest().await;
    batch
        .scores
        .remove(&entity_id)
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Entity {entity} not found")))
}

/// GET /api/v1/history/:entity
pub async fn get_entity_history(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Json<HistoryResponse> {
    let entity_id = entity.to_uppercase();
    let history = state.orchestrator.get_history(&entity_id).await;
    Json(HistoryResponse {
        count: history.len(),
        entity_id,
        history,
    })
}

/// GET /api/v1/entities
pub async fn get_entities(State(state): State<AppState>) -> Json<EntitiesResponse> {
    let batch = state.orchestrator.get_latest().await;
    Json(EntitiesResponse::from_batch(&batch))
}

/// GET /api/v1/analytics
pub async fn get_analytics(State(state): State<AppState>) -> Response {
    let batch = state.orchestrator.get_latest().await;
    match Analytics::from_batch(&batch) {
        Some(analytics) => Json(analytics).into_response(),
        None => Json(NoData::default()).into_response(),
    }
}
