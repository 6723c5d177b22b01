use super::state::AppState;
use crate::audio::scan_recordings;
use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SessionListEntry {
    pub session_id: Uuid,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

/// GET /live
/// Upgrade to the relay WebSocket; one streaming session per connection.
pub async fn live_relay(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    info!("Relay WebSocket upgrade requested");
    ws.on_upgrade(move |socket| crate::relay::server::handle_connection(socket, state))
}

/// GET /stories
/// All finished stories, newest first.
pub async fn list_stories(State(state): State<AppState>) -> impl IntoResponse {
    match state.stories.list().await {
        Ok(stories) => (StatusCode::OK, Json(stories)).into_response(),
        Err(e) => {
            error!("Failed to list stories: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to list stories: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /stories/:id
pub async fn get_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.stories.get(&id).await {
        Ok(Some(story)) => (StatusCode::OK, Json(story)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Story {} not found", id),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to fetch story {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch story: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /recordings
/// Finished recordings on disk with their durations.
pub async fn list_recordings(State(state): State<AppState>) -> impl IntoResponse {
    match scan_recordings(&state.config.audio.recordings_path) {
        Ok(recordings) => (StatusCode::OK, Json(recordings)).into_response(),
        Err(e) => {
            error!("Failed to scan recordings: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to scan recordings: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /sessions
/// Active relay sessions.
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    let entries: Vec<SessionListEntry> = sessions
        .iter()
        .map(|(id, info)| SessionListEntry {
            session_id: *id,
            started_at: info.started_at,
        })
        .collect();
    (StatusCode::OK, Json(entries)).into_response()
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
