use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Events emitted by an upstream conversational-audio session.
///
/// The provider's callback surface is flattened into this single tagged
/// stream so the relay session can drive its own state machine from it.
#[derive(Debug)]
pub enum UpstreamEvent {
    /// The upstream acknowledged the session configuration.
    Opened,
    /// A chunk of synthesized audio. `sample_rate` comes from chunk metadata
    /// when the provider declares one.
    Audio {
        pcm: Vec<u8>,
        sample_rate: Option<u32>,
    },
    /// The model finished a conversational turn.
    TurnComplete,
    /// A mid-session error. Not necessarily terminal.
    Error(String),
    /// The upstream closed the session.
    Closed { reason: Option<String> },
}

/// Voice and persona parameters sent with the session setup.
#[derive(Debug, Clone)]
pub struct LiveSessionConfig {
    pub model: String,
    pub voice: String,
    pub system_instructions: String,
    /// Sample rate of the audio the client will send.
    pub input_sample_rate: u32,
}

/// Write half of a live upstream session.
#[async_trait]
pub trait LiveHandle: Send {
    /// Forward one PCM16 chunk of user audio.
    async fn send_audio(&mut self, pcm: &[u8]) -> Result<()>;

    /// Forward contextual text as a completed conversational turn.
    async fn send_control_text(&mut self, text: &str) -> Result<()>;

    /// Release the upstream session.
    async fn close(&mut self) -> Result<()>;
}

/// Factory for live upstream sessions. Process-wide and safe to share
/// across connections; each returned handle is exclusively owned by one
/// relay session.
#[async_trait]
pub trait LiveConnector: Send + Sync {
    async fn connect(
        &self,
        config: &LiveSessionConfig,
    ) -> Result<(Box<dyn LiveHandle>, mpsc::Receiver<UpstreamEvent>)>;
}
