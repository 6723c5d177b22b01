use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::stories::StoryStore;
use crate::storage::BlobStore;
use crate::upstream::LiveConnector;

/// Registry entry for one active relay session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub started_at: DateTime<Utc>,
}

/// Shared application state for HTTP handlers and the relay endpoint.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub connector: Arc<dyn LiveConnector>,
    pub blob_store: Arc<dyn BlobStore>,
    pub stories: Arc<dyn StoryStore>,
    /// Active relay sessions (session id → info).
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionInfo>>>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        connector: Arc<dyn LiveConnector>,
        blob_store: Arc<dyn BlobStore>,
        stories: Arc<dyn StoryStore>,
    ) -> Self {
        Self {
            config,
            connector,
            blob_store,
            stories,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
