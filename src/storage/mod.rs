//! Blob store boundary for finalized recordings.
//!
//! Finished WAV files are handed off here after finalize. The upload runs as
//! a detached background task: it never blocks session teardown and its
//! failure is logged, not retried.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Destination for finalized recordings.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `local_path` under `destination`, returning the stored URL.
    async fn upload(&self, local_path: &Path, destination: &str) -> Result<String>;
}

/// Default store: copies finalized files into an archive directory.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, local_path: &Path, destination: &str) -> Result<String> {
        let target = self.root.join(destination);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create archive directory {:?}", parent))?;
        }
        tokio::fs::copy(local_path, &target)
            .await
            .with_context(|| format!("Failed to archive {:?} to {:?}", local_path, target))?;
        Ok(target.to_string_lossy().into_owned())
    }
}

/// Fire-and-forget upload of a finalized recording.
///
/// The file lands under `scope/` in the store; the caller scopes by session
/// so concurrent sessions finalizing in the same millisecond cannot collide.
pub fn offload(store: Arc<dyn BlobStore>, path: PathBuf, scope: String) {
    tokio::spawn(async move {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording.wav".to_string());
        let destination = format!("{}/{}", scope, file_name);

        match store.upload(&path, &destination).await {
            Ok(url) => info!("Uploaded {:?} to {}", path, url),
            Err(e) => error!("Failed to upload {:?}: {}", path, e),
        }
    });
}
