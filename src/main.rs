use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use live_scribe::{
    create_router, AppState, CaptureFactory, Config, DefaultCaptureFactory, HttpTokenProvider,
    TokenProvider, TranscriptionSession,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "live-scribe", about = "Live transcription session service")]
struct Args {
    /// Config file (name without extension, per the config crate)
    #[arg(long, default_value = "config/live-scribe")]
    config: String,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config).context("Failed to load config")?;

    info!("Starting {}", cfg.service.name);
    info!("Recognition endpoint: {}", cfg.transcription.endpoint);

    let tokens: Arc<dyn TokenProvider> = Arc::new(HttpTokenProvider::new(
        cfg.transcription.key_url.clone(),
    ));
    let captures: Arc<dyn CaptureFactory> =
        Arc::new(DefaultCaptureFactory::new(cfg.capture_source()?));

    let session = Arc::new(TranscriptionSession::new(
        cfg.session_options(),
        tokens,
        captures,
    ));

    let router = create_router(AppState::new(Arc::clone(&session)));

    let port = args.port.unwrap_or(cfg.service.http.port);
    let addr = format!("{}:{}", cfg.service.http.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("HTTP API listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // Leave the device and socket clean on the way out.
    session.disconnect().await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
