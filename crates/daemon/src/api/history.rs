use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;

use crate::history::{HistoryEntry, HistoryStore};

pub fn router(store: Arc<HistoryStore>) -> Router {
    Router::new()
        .route("/", get(list))
        .route("/:id", delete(remove))
        .with_state(store)
}

async fn list(State(store): State<Arc<HistoryStore>>) -> Json<Vec<HistoryEntry>> {
    Json(store.list())
}

/// Deleting an unknown id is a no-op, not an error.
async fn remove(State(store): State<Arc<HistoryStore>>, Path(id): Path<String>) -> StatusCode {
    store.delete(&id);
    StatusCode::NO_CONTENT
}
