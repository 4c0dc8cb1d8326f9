use axum::{extract::State, http::header, response::IntoResponse, Json};
use chrono::Utc;
use tracing::info;

use crate::api::{state::AppState, types::*};
use crate::domain::RefreshStatus;

/// GET /health -- liveness probe
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_seconds(),
    })
}

/// GET /metrics -- Prometheus text format
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics()
        .prometheus(state.orchestrator.is_refreshing());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

/// GET /api/v1/
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Credit Intelligence API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/v1/refresh -- runs in the background, returns immediately
pub async fn trigger_refresh(State(state): State<AppState>) -> Json<RefreshAccepted> {
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        let batch = orchestrator.refresh_all().await;
        info!("Manual refresh finished ({} entities)", batch.entity_count);
    });

    Json(RefreshAccepted {
        success: true,
        message: "Score refresh triggered".to_string(),
        timestamp: Utc::now(),
    })
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<AppState>) -> Json<RefreshStatus> {
    Json(state.orchestrator.get_status().await)
}
