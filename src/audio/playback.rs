use anyhow::Result;
use std::collections::VecDeque;

use super::pcm;

/// A decoded chunk with its assigned output start time in seconds.
#[derive(Debug, Clone)]
pub struct ScheduledChunk {
    pub start: f64,
    pub samples: Vec<f32>,
}

impl ScheduledChunk {
    pub fn duration(&self, sample_rate: u32) -> f64 {
        self.samples.len() as f64 / sample_rate as f64
    }

    pub fn end(&self, sample_rate: u32) -> f64 {
        self.start + self.duration(sample_rate)
    }
}

/// Schedules incoming audio chunks for gapless, ordered playback.
///
/// Chunks are enqueued in arrival order. A drain pass assigns each chunk a
/// start time of `max(now, next_free_slot)` and advances the slot by the
/// chunk's duration, so chunks never overlap, never reorder, and playback
/// resumes at the current clock (not in the past) after the queue runs dry.
pub struct PlaybackScheduler {
    queue: VecDeque<Vec<f32>>,
    sample_rate: u32,
    next_free_slot: f64,
    draining: bool,
}

impl PlaybackScheduler {
    /// `sample_rate` is the fixed protocol playback rate, independent of the
    /// capture rate and not negotiated per chunk.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            sample_rate,
            next_free_slot: 0.0,
            draining: false,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn queued_chunks(&self) -> usize {
        self.queue.len()
    }

    /// Decode a PCM16 payload and enqueue it. Malformed payloads are
    /// rejected without touching the queue.
    pub fn enqueue_pcm(&mut self, bytes: &[u8]) -> Result<()> {
        let samples = pcm::decode(bytes)?;
        self.enqueue(samples);
        Ok(())
    }

    pub fn enqueue(&mut self, samples: Vec<f32>) {
        self.queue.push_back(samples);
    }

    /// Claim the single active drain. Returns false if a drain is already in
    /// progress, in which case the caller must not start another one; chunks
    /// it enqueued are picked up by the active drainer.
    pub fn begin_drain(&mut self) -> bool {
        if self.draining {
            return false;
        }
        self.draining = true;
        true
    }

    /// Pop the next queued chunk and assign its start time against the
    /// output clock `now`. Only the task that won `begin_drain` calls this.
    pub fn next_scheduled(&mut self, now: f64) -> Option<ScheduledChunk> {
        let samples = self.queue.pop_front()?;
        if self.next_free_slot < now {
            self.next_free_slot = now;
        }
        let start = self.next_free_slot;
        self.next_free_slot += samples.len() as f64 / self.sample_rate as f64;
        Some(ScheduledChunk { start, samples })
    }

    /// Release the drain claim once the queue has been emptied.
    pub fn finish_drain(&mut self) {
        self.draining = false;
    }

    /// Convenience: drain everything queued in one pass. Returns an empty
    /// vec if another drain is already in progress.
    pub fn drain(&mut self, now: f64) -> Vec<ScheduledChunk> {
        if !self.begin_drain() {
            return Vec::new();
        }
        let mut scheduled = Vec::with_capacity(self.queue.len());
        while let Some(chunk) = self.next_scheduled(now) {
            scheduled.push(chunk);
        }
        self.finish_drain();
        scheduled
    }

    /// The earliest time the next chunk may start.
    pub fn next_free_slot(&self) -> f64 {
        self.next_free_slot
    }
}
