mod config;
mod errors;
mod export;
mod ingest;
mod models;
mod planning;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, S3Config};
use crate::export::{ArtifactStore, LocalArtifactStore, S3ArtifactStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Restyler API v{}", env!("CARGO_PKG_VERSION"));

    // Artifact storage: S3 / MinIO when configured, local disk otherwise
    let artifacts: Arc<dyn ArtifactStore> = match &config.s3 {
        Some(s3) => {
            let client = build_s3_client(s3).await;
            info!("S3 artifact store initialized (bucket: {})", s3.bucket);
            Arc::new(S3ArtifactStore::new(client, s3.bucket.clone()))
        }
        None => {
            info!(
                "Local artifact store initialized at {}",
                config.artifact_dir.display()
            );
            Arc::new(LocalArtifactStore::new(config.artifact_dir.clone()))
        }
    };

    info!(
        "Export engine: {} workers, {:?} timeout",
        config.export_workers, config.export_timeout
    );

    // Build app state
    let state = AppState::new(config.clone(), artifacts);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(s3: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &s3.aws_access_key_id,
        &s3.aws_secret_access_key,
        None,
        None,
        "restyler-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&s3.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
