use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use velmo_live::{
    create_router, AppState, Config, FileStoryStore, GeminiLiveConnector, LocalBlobStore,
};

#[derive(Parser, Debug)]
#[command(name = "velmo-live", about = "Live voice companion relay")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/velmo-live")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Arc::new(Config::load(&args.config)?);

    info!("{} starting", config.service.name);
    info!(
        "Recordings: {}, stories: {}",
        config.audio.recordings_path, config.stories.path
    );

    let api_key = std::env::var("GOOGLE_API_KEY")
        .context("Missing GOOGLE_API_KEY environment variable")?;

    let connector = Arc::new(GeminiLiveConnector::new(
        api_key,
        config.upstream.host.clone(),
    ));
    let blob_store = Arc::new(LocalBlobStore::new(&config.storage.archive_path));
    let stories = Arc::new(FileStoryStore::new(&config.stories.path));

    let state = AppState::new(Arc::clone(&config), connector, blob_store, stories);
    let router = create_router(state);

    let addr = format!("{}:{}", config.service.http.bind, config.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, router)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
