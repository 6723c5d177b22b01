use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub upstream: UpstreamConfig,
    pub storage: StorageConfig,
    pub stories: StoriesConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Directory receiving per-session recording streams.
    pub recordings_path: String,
    /// Rate of audio the client captures and sends (protocol constant).
    pub capture_sample_rate: u32,
    /// Rate of AI audio when the upstream declares none.
    pub playback_sample_rate: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamConfig {
    pub model: String,
    pub voice: String,
    pub host: String,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Archive directory for the local blob store.
    pub archive_path: String,
}

#[derive(Debug, Deserialize)]
pub struct StoriesConfig {
    /// Directory of finished story JSON documents.
    pub path: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
