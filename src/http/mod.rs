//! HTTP surface of the relay service
//!
//! - GET /live - WebSocket relay endpoint (one session per connection)
//! - GET /stories, GET /stories/:id - finished story documents
//! - GET /recordings - finished recordings with durations
//! - GET /recordings/files/* - static WAV playback
//! - GET /sessions - active relay sessions
//! - GET /health - health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, SessionInfo};
