use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use linkbranch_backend::{
    blob::LocalBlobStore, config::Settings, create_router, storage::FlatFileStorage, AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// LinkBranch link-in-bio API server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(settings: &Settings, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let settings = Settings::load_from(&args.config)?;
    init_tracing(&settings, args.json_logs);

    let storage = FlatFileStorage::new(&settings.storage.path)?;
    let blobs = Arc::new(LocalBlobStore::new(
        settings.uploads_dir(),
        &settings.uploads.public_base_url,
    )?);

    let addr = settings.bind_addr()?;
    let state = Arc::new(AppState::new(storage, blobs, settings)?);
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
