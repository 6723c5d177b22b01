use super::pcm;

/// Default samples per transmitted frame (128 ms at 16 kHz).
pub const DEFAULT_FRAME_SAMPLES: usize = 2048;

/// Batches live f32 samples into fixed-size PCM16 frames for transmission.
///
/// The capture callback hands samples to `push`, which emits one encoded
/// frame per `frame_samples` accumulated. `flush` drains any partial
/// remainder when capture stops. Runs on the client's audio thread; the
/// only work per call is buffering and the PCM conversion.
pub struct CaptureEncoder {
    frame_samples: usize,
    pending: Vec<f32>,
}

impl CaptureEncoder {
    pub fn new(frame_samples: usize) -> Self {
        Self {
            frame_samples,
            pending: Vec::with_capacity(frame_samples),
        }
    }

    /// Buffer incoming samples, returning every completed frame in order.
    pub fn push(&mut self, samples: &[f32]) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        self.pending.extend_from_slice(samples);

        while self.pending.len() >= self.frame_samples {
            let rest = self.pending.split_off(self.frame_samples);
            let frame = std::mem::replace(&mut self.pending, rest);
            frames.push(pcm::encode(&frame));
        }

        frames
    }

    /// Emit the partial remainder, if any. Called once on stream stop.
    pub fn flush(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            return None;
        }
        let frame = pcm::encode(&self.pending);
        self.pending.clear();
        Some(frame)
    }

    pub fn pending_samples(&self) -> usize {
        self.pending.len()
    }
}

impl Default for CaptureEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_SAMPLES)
    }
}
