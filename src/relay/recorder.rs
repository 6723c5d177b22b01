use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::audio::WavStreamWriter;
use crate::storage::BlobStore;

/// One direction of a connection's recording (user audio or AI audio).
///
/// Opened lazily on the first chunk of its direction and written by exactly
/// one producer. Storage failures abandon recording for this direction only;
/// the live relay is never interrupted on its account.
pub enum RecordingStream {
    /// No chunk has arrived yet; no file exists.
    Pending {
        dir: PathBuf,
        prefix: &'static str,
    },
    /// Open file accepting appends.
    Active(WavStreamWriter),
    /// Recording gave up after a storage error, or was already finalized.
    Disabled,
}

impl RecordingStream {
    pub fn new(dir: impl AsRef<Path>, prefix: &'static str) -> Self {
        Self::Pending {
            dir: dir.as_ref().to_path_buf(),
            prefix,
        }
    }

    /// Append one chunk, opening the file on the first call. The sample rate
    /// is fixed at open time by the first chunk's declared rate.
    pub fn append(&mut self, pcm: &[u8], sample_rate: u32) {
        if let Self::Pending { dir, prefix } = self {
            let file_name = format!("{}_{}.wav", prefix, chrono::Utc::now().timestamp_millis());
            let path = dir.join(file_name);
            match WavStreamWriter::create(&path, sample_rate) {
                Ok(writer) => *self = Self::Active(writer),
                Err(e) => {
                    warn!("Failed to open recording stream {:?}: {}", path, e);
                    *self = Self::Disabled;
                }
            }
        }

        if let Self::Active(writer) = self {
            if let Err(e) = writer.append(pcm) {
                warn!("Abandoning recording after append failure: {}", e);
                *self = Self::Disabled;
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Finalize the file if one was opened, returning its path. Subsequent
    /// calls are no-ops, so repeated teardown signals are safe.
    pub fn finalize(&mut self) -> Option<PathBuf> {
        match std::mem::replace(self, Self::Disabled) {
            Self::Active(writer) => match writer.finalize() {
                Ok((path, bytes)) => {
                    info!("Recording saved to {:?} ({} bytes PCM)", path, bytes);
                    Some(path)
                }
                Err(e) => {
                    warn!("Failed to finalize recording: {}", e);
                    None
                }
            },
            _ => None,
        }
    }

    /// Finalize and hand the file to the blob store in a detached task,
    /// scoped under `scope` in the archive. The upload never blocks teardown
    /// and its failure is log-only.
    pub fn finalize_and_offload(
        &mut self,
        store: Arc<dyn BlobStore>,
        scope: &str,
    ) -> Option<PathBuf> {
        let path = self.finalize()?;
        crate::storage::offload(store, path.clone(), scope.to_string());
        Some(path)
    }
}
