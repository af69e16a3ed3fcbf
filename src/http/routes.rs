use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/transcription/connect", post(handlers::connect_session))
        .route(
            "/transcription/disconnect",
            post(handlers::disconnect_session),
        )
        // Session queries
        .route("/transcription/status", get(handlers::get_status))
        .route("/transcription/transcript", get(handlers::get_transcript))
        // Request logging + permissive CORS for the editor frontend
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
