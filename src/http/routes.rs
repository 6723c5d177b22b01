use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let recordings_dir = state.config.audio.recordings_path.clone();

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // The live relay WebSocket
        .route("/live", get(handlers::live_relay))
        // Story documents (read-only)
        .route("/stories", get(handlers::list_stories))
        .route("/stories/:id", get(handlers::get_story))
        // Recording queries
        .route("/recordings", get(handlers::list_recordings))
        .route("/sessions", get(handlers::list_sessions))
        // Finished WAV files for playback
        .nest_service("/recordings/files", ServeDir::new(recordings_dir))
        // Browser clients connect cross-origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
