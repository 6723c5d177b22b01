use serde::{Deserialize, Serialize};

/// Events sent by the client over the relay WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// One batch of base64-encoded PCM16 mono audio at the capture rate.
    RealtimeAudio { audio: String },
    /// Contextual text forwarded upstream as a completed turn.
    ControlText { text: String },
    /// End of the user's audio stream; begins session teardown.
    EndStream,
}

/// Events sent by the relay to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// One batch of base64-encoded PCM16 mono AI audio. The sample rate is
    /// included when the upstream declared one; otherwise the protocol
    /// default (24 kHz) applies.
    AiAudio {
        audio: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        sample_rate: Option<u32>,
    },
    /// The session has closed; no further audio will arrive.
    SessionClosed {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// A non-fatal error surfaced to the client.
    Error { message: String },
}
