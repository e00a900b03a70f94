use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use content::VisualPackage;
use std::sync::Arc;

use crate::generation::{GenerationSnapshot, Orchestrator};

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/", get(state))
        .route("/run", post(run))
        .route("/videos/:index/visuals", post(run_visuals))
        .route("/visuals", get(visuals))
        .with_state(orchestrator)
}

async fn state(State(orchestrator): State<Arc<Orchestrator>>) -> Json<GenerationSnapshot> {
    Json(orchestrator.snapshot())
}

/// Kick off the manager flow in the background; the caller polls the state
/// endpoint for phase transitions.
async fn run(
    State(orchestrator): State<Arc<Orchestrator>>,
) -> (StatusCode, Json<GenerationSnapshot>) {
    tokio::spawn(orchestrator.clone().run());
    (StatusCode::ACCEPTED, Json(orchestrator.snapshot()))
}

async fn run_visuals(
    State(orchestrator): State<Arc<Orchestrator>>,
    Path(index): Path<usize>,
) -> (StatusCode, Json<GenerationSnapshot>) {
    tokio::spawn(orchestrator.clone().run_visuals(index));
    (StatusCode::ACCEPTED, Json(orchestrator.snapshot()))
}

async fn visuals(State(orchestrator): State<Arc<Orchestrator>>) -> Json<Option<VisualPackage>> {
    Json(orchestrator.snapshot().visual)
}
