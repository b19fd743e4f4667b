//! Credit Default Prediction API - Main Entry Point
//!
//! Loads the classifier and scaler once, then serves predictions over HTTP.
//! The server does not start if either artifact is missing or malformed.

use anyhow::{Context, Result};
use credit_default_api::{
    api::{router, AppState},
    config::{AppConfig, LoggingConfig},
    metrics::{MetricsReporter, PipelineMetrics},
    models::ModelLoader,
    service::InferenceContext,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration: from CLI arg, env var, or default location
    let config = load_config()?;

    init_logging(&config.logging)?;
    info!("Starting Credit Default Prediction API");
    info!(
        model = %config.artifacts.model_path,
        scaler = %config.artifacts.scaler_path,
        format = ?config.artifacts.model_format,
        "Configuration loaded successfully"
    );

    // Artifacts must be loaded before any request is accepted
    let artifacts = ModelLoader::new(&config.artifacts)
        .load_all()
        .context("Failed to load model artifacts")?;
    let context = InferenceContext::from_artifacts(artifacts)
        .context("Model artifacts are inconsistent")?;
    info!(
        model = %context.model_name(),
        features = context.schema().len(),
        "Model and scaler loaded"
    );

    let metrics = Arc::new(PipelineMetrics::new());
    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let state = Arc::new(AppState::new(Arc::new(context), metrics.clone()));
    let app = router(state);

    let listen_addr = config.server.listen_addr();
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;
    info!(%listen_addr, "Prediction server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    metrics.print_summary();

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let config_path: Option<PathBuf> = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CREDIT_API_CONFIG").ok())
        .map(PathBuf::from);

    match config_path {
        Some(path) => AppConfig::load_from_path(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => AppConfig::load(),
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
