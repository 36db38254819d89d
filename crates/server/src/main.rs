use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use moodscan_server::{router, telemetry, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init("moodscan")?;

    let config = ServiceConfig::load().context("Failed to load configuration")?;
    config.ensure_upload_dir().with_context(|| {
        format!("Failed to create upload directory {}", config.upload_dir.display())
    })?;

    info!(
        bind_addr = %config.bind_addr,
        upload_dir = %config.upload_dir.display(),
        tesseract = %config.ocr.tesseract_cmd.display(),
        language = %config.ocr.language,
        "Starting OCR API server"
    );

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    let app = router(AppState::from_config(config));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
    }
}
