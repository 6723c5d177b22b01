//! Upstream conversational-audio service boundary.
//!
//! The relay talks to the upstream through the `LiveConnector`/`LiveHandle`
//! traits and consumes provider callbacks as an explicit `UpstreamEvent`
//! stream. `GeminiLiveConnector` is the production implementation.

pub mod client;
pub mod gemini;
pub mod instructions;

pub use client::{LiveConnector, LiveHandle, LiveSessionConfig, UpstreamEvent};
pub use gemini::{parse_rate_from_mime, parse_server_message, GeminiLiveConnector};
pub use instructions::system_instructions;
