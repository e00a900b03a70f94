use axum::{response::Json, routing::get, Router};
use serde::Serialize;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber;
use tower_http::cors::{CorsLayer, Any};

mod agents;
mod api;
mod db;
mod generation;
mod history;
mod scheduler;
mod settings;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    // Initialize database
    let db_path = std::env::var("REELFORGE_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".cache/reelforge.db"));
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Arc::new(db::Database::new(&db_path)?);
    info!("Database initialized at {:?}", db_path);

    // Stores load once at startup; the in-memory copies stay authoritative
    let settings = Arc::new(settings::SettingsStore::new(db.clone()));
    let history = Arc::new(history::HistoryStore::new(db));

    let agents: Arc<dyn agents::AgentBackend> = Arc::new(agents::HttpAgentBackend::from_env());
    let generation = Arc::new(generation::Orchestrator::new(
        agents,
        settings.clone(),
        history.clone(),
    ));

    let scheduler_backend: Arc<dyn scheduler::SchedulerBackend> =
        Arc::new(scheduler::HttpSchedulerBackend::from_env());
    let schedule = Arc::new(scheduler::controller::ScheduleController::new(
        scheduler_backend,
    ));

    // Build the router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", api::router(settings, history, generation, schedule))
        .layer(cors);

    // Start the server
    let addr = SocketAddr::from(([127, 0, 0, 1], 7878));
    info!("Starting daemon server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
