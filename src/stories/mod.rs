//! Read-only boundary to the story document store.
//!
//! Finished stories are produced by an offline pipeline outside this
//! service; the relay only lists and serves them. `FileStoryStore` reads
//! one JSON document per story from a directory.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// A finished narrative entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Story lookup, keyed by opaque id.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// All stories, newest first.
    async fn list(&self) -> Result<Vec<Story>>;

    /// One story by id, or None if it does not exist.
    async fn get(&self, id: &str) -> Result<Option<Story>>;
}

/// Store backed by a directory of `<id>.json` documents.
pub struct FileStoryStore {
    dir: PathBuf,
}

impl FileStoryStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn read_story(path: &Path) -> Result<Story> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read story file {:?}", path))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse story file {:?}", path))
    }
}

#[async_trait]
impl StoryStore for FileStoryStore {
    async fn list(&self) -> Result<Vec<Story>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut stories = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read story directory {:?}", self.dir))?
        {
            let path = entry?.path();
            if path.extension().map(|ext| ext == "json").unwrap_or(false) {
                match Self::read_story(&path) {
                    Ok(story) => stories.push(story),
                    Err(e) => warn!("Skipping unreadable story {:?}: {}", path, e),
                }
            }
        }

        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stories)
    }

    async fn get(&self, id: &str) -> Result<Option<Story>> {
        let path = self.dir.join(format!("{}.json", id));
        if !path.exists() {
            return Ok(None);
        }
        Self::read_story(&path).map(Some)
    }
}
