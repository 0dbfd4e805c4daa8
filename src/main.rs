mod api;
mod classifier;
mod config;
mod engine;
mod error;
mod models;
mod observability;
mod state;
mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::classifier::GeminiClassifier;
use crate::config::LogFormat;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    let config = config::Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);
    match config.log_format {
        LogFormat::Compact => subscriber.compact().init(),
        LogFormat::Json => subscriber.json().init(),
    }

    let classifier = Arc::new(GeminiClassifier::new(&config.classifier)?);
    if config.classifier.api_key.is_none() {
        tracing::warn!("CLASSIFIER_API_KEY not set; photo verification will fail closed");
    }

    let app_state = state::AppState::in_memory(
        config.event_buffer_size,
        classifier,
        config.seed_batch_size,
        config.max_upload_bytes,
    );
    let shared_state = Arc::new(app_state);

    let seeded = shared_state.engine.ensure_seeded().await?;
    tracing::info!(outcome = ?seeded, "startup seed check done");

    let app = api::rest::router(shared_state.clone());

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| error::AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| error::AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
