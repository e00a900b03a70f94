use axum::Router;
use std::sync::Arc;

use crate::generation::Orchestrator;
use crate::history::HistoryStore;
use crate::scheduler::controller::ScheduleController;
use crate::settings::SettingsStore;

pub mod generation;
pub mod history;
pub mod schedule;
pub mod settings;

pub fn router(
    settings: Arc<SettingsStore>,
    history: Arc<HistoryStore>,
    orchestrator: Arc<Orchestrator>,
    schedule: Arc<ScheduleController>,
) -> Router {
    Router::new()
        .nest("/settings", settings::router(settings))
        .nest("/history", history::router(history))
        .nest("/generation", generation::router(orchestrator))
        .nest("/schedule", schedule::router(schedule))
}
