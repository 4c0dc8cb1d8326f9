use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let v1 = Router::new()
        .route("/", get(handlers::service_info))
        // Score endpoints
        .route("/scores", get(handlers::get_scores))
        .route("/scores/:entity", get(handlers::get_entity_score))
        .route("/history/:entity", get(handlers::get_entity_history))
        .route("/entities", get(handlers::get_entities))
        .route("/analytics", get(handlers::get_analytics))
        // Refresh control
        .route("/refresh", post(handlers::trigger_refresh))
        .route("/status", get(handlers::get_status));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/v1", v1)
        .with_state(state)
        .layer(cors)
}
