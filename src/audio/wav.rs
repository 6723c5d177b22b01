use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Size of the fixed WAV header written at create time.
pub const HEADER_LEN: u64 = 44;

/// Byte offset of the RIFF total-chunk-size field.
const RIFF_SIZE_OFFSET: u64 = 4;

/// Byte offset of the data-chunk-size field.
const DATA_SIZE_OFFSET: u64 = 40;

/// Streaming WAV writer for mono 16-bit PCM of unknown total length.
///
/// The header is written up front with both size fields zeroed; payload bytes
/// are appended sequentially; `finalize` patches the two size fields in place
/// once the stream ends. A handle has exactly one writer for its lifetime.
pub struct WavStreamWriter {
    file: Option<File>,
    path: PathBuf,
    data_bytes: u64,
}

impl WavStreamWriter {
    /// Create the file and write the 44-byte header with placeholder sizes.
    pub fn create(path: impl AsRef<Path>, sample_rate: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create recording directory {:?}", parent))?;
        }

        let mut file = File::create(&path)
            .with_context(|| format!("Failed to create WAV file {:?}", path))?;
        file.write_all(&build_header(sample_rate))
            .context("Failed to write WAV header")?;

        info!("Opened recording stream at {:?} ({} Hz)", path, sample_rate);

        Ok(Self {
            file: Some(file),
            path,
            data_bytes: 0,
        })
    }

    /// Append raw PCM16 payload bytes after the header.
    pub fn append(&mut self, pcm: &[u8]) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .context("WAV writer already finalized")?;
        file.write_all(pcm)
            .with_context(|| format!("Failed to append to {:?}", self.path))?;
        self.data_bytes += pcm.len() as u64;
        Ok(())
    }

    /// Payload bytes written so far.
    pub fn data_bytes(&self) -> u64 {
        self.data_bytes
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Patch the two header size fields and close the file.
    ///
    /// Consumes the writer, so a handle cannot be finalized twice. A stream
    /// with zero payload bytes still produces a valid (silent) file.
    pub fn finalize(mut self) -> Result<(PathBuf, u64)> {
        let mut file = self
            .file
            .take()
            .context("WAV writer already finalized")?;
        patch_sizes(&mut file, self.data_bytes)?;
        file.flush().context("Failed to flush WAV file")?;

        info!(
            "Finalized recording {:?} ({} payload bytes)",
            self.path, self.data_bytes
        );

        Ok((self.path.clone(), self.data_bytes))
    }
}

impl Drop for WavStreamWriter {
    fn drop(&mut self) {
        // Abrupt teardown still leaves a playable file behind.
        if let Some(mut file) = self.file.take() {
            if let Err(e) = patch_sizes(&mut file, self.data_bytes) {
                warn!("Failed to finalize WAV header on drop: {}", e);
            }
        }
    }
}

fn build_header(sample_rate: u32) -> [u8; HEADER_LEN as usize] {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * num_channels as u32 * bits_per_sample as u32 / 8;
    let block_align = num_channels * bits_per_sample / 8;

    let mut header = [0u8; HEADER_LEN as usize];
    header[0..4].copy_from_slice(b"RIFF");
    // Total-chunk-size placeholder at offset 4, patched at finalize.
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    header[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM format code
    header[22..24].copy_from_slice(&num_channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bits_per_sample.to_le_bytes());
    header[36..40].copy_from_slice(b"data");
    // Data-chunk-size placeholder at offset 40, patched at finalize.
    header
}

fn patch_sizes(file: &mut File, data_bytes: u64) -> Result<()> {
    let data_size = data_bytes as u32;
    let riff_size = 36 + data_size;

    file.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))
        .context("Failed to seek to RIFF size field")?;
    file.write_all(&riff_size.to_le_bytes())
        .context("Failed to patch RIFF size field")?;

    file.seek(SeekFrom::Start(DATA_SIZE_OFFSET))
        .context("Failed to seek to data size field")?;
    file.write_all(&data_size.to_le_bytes())
        .context("Failed to patch data size field")?;

    Ok(())
}
