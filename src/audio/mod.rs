pub mod capture;
pub mod file;
pub mod pcm;
pub mod playback;
pub mod wav;

pub use capture::{CaptureEncoder, DEFAULT_FRAME_SAMPLES};
pub use file::{scan_recordings, RecordingInfo};
pub use playback::{PlaybackScheduler, ScheduledChunk};
pub use wav::WavStreamWriter;
