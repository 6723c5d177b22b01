//! The bidirectional relay core.
//!
//! One `StreamingSession` per client connection bridges three channels of
//! traffic: inbound user audio, inbound control text, and outbound AI audio,
//! while teeing both audio directions into `RecordingStream`s.

pub mod protocol;
pub mod recorder;
pub mod server;
pub mod session;

pub use protocol::{ClientEvent, ServerEvent};
pub use recorder::RecordingStream;
pub use session::{SessionOptions, SessionState, StreamingSession};
