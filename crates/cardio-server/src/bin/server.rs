//! cardio-server binary

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use cardio_server::api::{ApiState, create_router};
use cardio_server::{Predictor, ServerConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting cardio-server v{}", env!("CARGO_PKG_VERSION"));

    // Optional config path; defaults otherwise.
    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::load(Path::new(&path))
            .with_context(|| format!("Failed to load config file: {path}"))?,
        None => ServerConfig::default(),
    };

    let predictor = Predictor::load(&config).context("Failed to load model artifacts")?;
    info!(
        model_dir = %config.model_dir.display(),
        top_n = config.top_n,
        "Loaded models"
    );

    let state = Arc::new(ApiState { predictor });
    let app = create_router(state);

    info!("Listening on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    axum::serve(listener, app).await?;

    Ok(())
}
