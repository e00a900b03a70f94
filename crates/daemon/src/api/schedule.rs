use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::scheduler::controller::{ScheduleController, ScheduleState, DEFAULT_LOG_LIMIT};
use crate::scheduler::{cron_to_human, ExecutionLogEntry};

pub fn router(controller: Arc<ScheduleController>) -> Router {
    Router::new()
        .route("/", get(state))
        .route("/refresh", post(refresh))
        .route("/toggle", post(toggle))
        .route("/run-now", post(run_now))
        .route("/logs", get(logs))
        .with_state(controller)
}

#[derive(Serialize)]
struct ScheduleView {
    #[serde(flatten)]
    state: ScheduleState,
    cron_human: Option<String>,
}

fn view(state: ScheduleState) -> Json<ScheduleView> {
    let cron_human = state
        .schedule
        .as_ref()
        .map(|s| cron_to_human(&s.cron_expression));
    Json(ScheduleView { state, cron_human })
}

async fn state(State(controller): State<Arc<ScheduleController>>) -> Json<ScheduleView> {
    view(controller.snapshot())
}

async fn refresh(State(controller): State<Arc<ScheduleController>>) -> Json<ScheduleView> {
    controller.refresh().await;
    view(controller.snapshot())
}

async fn toggle(State(controller): State<Arc<ScheduleController>>) -> Json<ScheduleView> {
    controller.toggle().await;
    view(controller.snapshot())
}

async fn run_now(State(controller): State<Arc<ScheduleController>>) -> Json<ScheduleView> {
    controller.run_now().await;
    view(controller.snapshot())
}

#[derive(Deserialize)]
struct LogsQuery {
    limit: Option<usize>,
}

async fn logs(
    State(controller): State<Arc<ScheduleController>>,
    Query(query): Query<LogsQuery>,
) -> Json<Vec<ExecutionLogEntry>> {
    controller
        .load_logs(query.limit.unwrap_or(DEFAULT_LOG_LIMIT))
        .await;
    Json(controller.snapshot().logs)
}
