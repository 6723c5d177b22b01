use anyhow::{Context, Result};
use hound::WavReader;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

/// Metadata for one finished recording on disk.
#[derive(Debug, Clone, Serialize)]
pub struct RecordingInfo {
    pub file_name: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub payload_bytes: u64,
}

impl RecordingInfo {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file {:?}", path))?;

        let spec = reader.spec();
        let sample_count = reader.len() as u64;
        let duration_seconds =
            sample_count as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            file_name,
            duration_seconds,
            sample_rate: spec.sample_rate,
            payload_bytes: sample_count * u64::from(spec.bits_per_sample / 8),
        })
    }
}

/// List all readable WAV recordings in a directory, newest first.
pub fn scan_recordings(dir: impl AsRef<Path>) -> Result<Vec<RecordingInfo>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read recordings directory {:?}", dir))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "wav").unwrap_or(false))
        .collect();
    entries.sort();
    entries.reverse();

    let mut recordings = Vec::with_capacity(entries.len());
    for path in entries {
        match RecordingInfo::open(&path) {
            Ok(info) => recordings.push(info),
            Err(e) => warn!("Skipping unreadable recording {:?}: {}", path, e),
        }
    }
    Ok(recordings)
}
