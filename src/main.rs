mod api;
mod club;
mod storage;
mod utils;

#[cfg(test)]
mod tests;

use axum::{extract::State, middleware, routing::get, Router};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::api::{ClubState, StatusState};
use crate::storage::{provision::TableProvisioner, DynamoStore, MemoryStore, S3Store, Store};
use crate::utils::{Config, Metrics, StorageBackend};

#[derive(Parser)]
#[command(name = "runclub-backend", version, about = "Running club backend API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Starte den API-Server (Default)
    Serve,
    /// Lege die DynamoDB-Tabellen an
    SetupTables,
    /// Lösche alle DynamoDB-Tabellen (nur Entwicklung)
    TeardownTables,
    /// Prüfe die Storage-Verbindung
    CheckConnection,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    let _log_guard = utils::init_logging(config.log_dir.as_deref());

    match Cli::parse().command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::SetupTables => {
            let provisioner =
                TableProvisioner::new(&config.table_prefix, config.sdk_region()).await?;
            provisioner.create_all().await
        }
        Command::TeardownTables => {
            let provisioner =
                TableProvisioner::new(&config.table_prefix, config.sdk_region()).await?;
            provisioner.delete_all().await
        }
        Command::CheckConnection => {
            let store = build_store(&config).await?;
            if store.check_connection().await {
                tracing::info!(backend = config.storage_backend.as_str(), "Storage reachable");
                Ok(())
            } else {
                anyhow::bail!("storage backend {} unreachable", config.storage_backend.as_str())
            }
        }
    }
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    Ok(match config.storage_backend {
        StorageBackend::DynamoDb => {
            Arc::new(DynamoStore::new(&config.table_prefix, config.sdk_region()).await?)
        }
        StorageBackend::S3 => Arc::new(S3Store::new(&config.s3_bucket, config.sdk_region()).await?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    })
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        backend = config.storage_backend.as_str(),
        port = config.api_port,
        "Starting running club backend"
    );

    // Initialize storage layer
    let store = build_store(&config).await?;

    // Initialize metrics
    let metrics = Arc::new(Metrics::new());

    let club_state = Arc::new(ClubState {
        store,
        metrics: metrics.clone(),
    });
    let status_state = Arc::new(StatusState::new(
        club_state.clone(),
        config.storage_backend,
    ));

    // Build routers
    let app = Router::new()
        // Health & Admin Routes
        .nest("/api/admin", api::admin_router(club_state.clone()))
        // Entity Routes
        .nest("/api/members", api::members_router(club_state.clone()))
        .nest("/api/records", api::records_router(club_state.clone()))
        .nest("/api/schedules", api::schedules_router(club_state.clone()))
        .nest("/api/milestones", api::milestones_router(club_state.clone()))
        // Statistics Routes
        .nest("/api/stats", api::stats_router(club_state.clone()))
        // V1 Status & Settings Routes
        .nest("/api/v1", api::status_router(status_state))
        // Root health check
        .route("/health", get(health_check))
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn_with_state(
                    club_state.clone(),
                    logging_middleware,
                )),
        );

    // Start server
    let listener =
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.api_port)).await?;

    tracing::info!("Server listening on port {}", config.api_port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Logging & Request-Metrics Middleware
async fn logging_middleware(
    State(state): State<Arc<ClubState>>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let start = std::time::Instant::now();
    let response = next.run(req).await;
    let duration = start.elapsed();

    state
        .metrics
        .api_request_count
        .with_label_values(&[uri.path(), response.status().as_str()])
        .inc();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}
