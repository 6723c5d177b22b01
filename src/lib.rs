pub mod audio;
pub mod config;
pub mod http;
pub mod relay;
pub mod storage;
pub mod stories;
pub mod upstream;

pub use audio::{
    scan_recordings, CaptureEncoder, PlaybackScheduler, RecordingInfo, ScheduledChunk,
    WavStreamWriter, DEFAULT_FRAME_SAMPLES,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use relay::{ClientEvent, RecordingStream, ServerEvent, SessionOptions, StreamingSession};
pub use storage::{BlobStore, LocalBlobStore};
pub use stories::{FileStoryStore, Story, StoryStore};
pub use upstream::{
    GeminiLiveConnector, LiveConnector, LiveHandle, LiveSessionConfig, UpstreamEvent,
};
