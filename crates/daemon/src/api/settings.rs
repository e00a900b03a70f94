use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use content::Settings;
use std::sync::Arc;

use crate::settings::SettingsStore;

pub fn router(store: Arc<SettingsStore>) -> Router {
    Router::new()
        .route("/", get(get_settings).put(put_settings))
        .with_state(store)
}

async fn get_settings(State(store): State<Arc<SettingsStore>>) -> Json<Settings> {
    Json(store.get())
}

/// Explicit save; the stored value is replaced wholesale.
async fn put_settings(
    State(store): State<Arc<SettingsStore>>,
    Json(settings): Json<Settings>,
) -> StatusCode {
    store.save(settings);
    StatusCode::NO_CONTENT
}
