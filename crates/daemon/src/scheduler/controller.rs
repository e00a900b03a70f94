use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::warn;

use super::{ExecutionLogEntry, Schedule, SchedulerBackend, SCHEDULE_ID};

pub const DEFAULT_LOG_LIMIT: usize = 20;

const LOAD_FAILED_MSG: &str = "Failed to load schedule";
const TOGGLE_FAILED_MSG: &str = "Failed to toggle schedule";
const TRIGGER_FAILED_MSG: &str = "Failed to trigger schedule";

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleState {
    pub schedule: Option<Schedule>,
    pub logs: Vec<ExecutionLogEntry>,
    pub loading: bool,
    pub logs_loading: bool,
    pub action_in_flight: bool,
    pub error: Option<String>,
}

/// Operations over the single remote schedule. The mutating verbs share one
/// action-in-flight flag so pause/resume/trigger are mutually exclusive;
/// the read operations use their own flags and may run together. Visible
/// state only ever changes from a fresh read after the service confirms,
/// never optimistically.
pub struct ScheduleController {
    backend: Arc<dyn SchedulerBackend>,
    state: Mutex<ScheduleState>,
}

impl ScheduleController {
    pub fn new(backend: Arc<dyn SchedulerBackend>) -> Self {
        ScheduleController {
            backend,
            state: Mutex::new(ScheduleState::default()),
        }
    }

    pub fn snapshot(&self) -> ScheduleState {
        self.state.lock().unwrap().clone()
    }

    /// Fetch the schedule. On failure the previous value stays visible and
    /// an error message is surfaced (the service-supplied string when
    /// present).
    pub async fn load(&self) {
        self.state.lock().unwrap().loading = true;

        let fetched = self.backend.get_schedule(SCHEDULE_ID).await;

        let mut state = self.state.lock().unwrap();
        match fetched {
            Ok(fetch) => match fetch.schedule {
                Some(schedule) => {
                    state.schedule = Some(schedule);
                    state.error = None;
                }
                None => {
                    state.error =
                        Some(fetch.error.unwrap_or_else(|| LOAD_FAILED_MSG.to_string()));
                }
            },
            Err(e) => {
                warn!("Schedule load failed: {:?}", e);
                state.error = Some(LOAD_FAILED_MSG.to_string());
            }
        }
        state.loading = false;
    }

    /// Best-effort log fetch; failures are swallowed so a missing feed never
    /// blocks the schedule view.
    pub async fn load_logs(&self, limit: usize) {
        self.state.lock().unwrap().logs_loading = true;

        let fetched = self.backend.get_logs(SCHEDULE_ID, limit).await;

        let mut state = self.state.lock().unwrap();
        match fetched {
            Ok(logs) => state.logs = logs,
            Err(e) => warn!("Schedule log fetch failed: {:?}", e),
        }
        state.logs_loading = false;
    }

    /// Fetch schedule and logs together, as on mount and manual refresh.
    pub async fn refresh(&self) {
        tokio::join!(self.load(), self.load_logs(DEFAULT_LOG_LIMIT));
    }

    /// Pause when active, resume when not, then re-read the schedule.
    pub async fn toggle(&self) {
        let is_active = {
            let mut state = self.state.lock().unwrap();
            if state.action_in_flight {
                return;
            }
            let schedule = match state.schedule.as_ref() {
                Some(s) => s,
                None => return,
            };
            let is_active = schedule.is_active;
            state.action_in_flight = true;
            is_active
        };

        let outcome = if is_active {
            self.backend.pause(SCHEDULE_ID).await
        } else {
            self.backend.resume(SCHEDULE_ID).await
        };

        match outcome {
            Ok(()) => self.load().await,
            Err(e) => {
                warn!("Schedule toggle failed: {:?}", e);
                self.state.lock().unwrap().error = Some(TOGGLE_FAILED_MSG.to_string());
            }
        }
        self.state.lock().unwrap().action_in_flight = false;
    }

    /// Force an out-of-band run, then refresh the log feed. The schedule
    /// itself is not reloaded; a forced run does not necessarily move
    /// `next_run_time` synchronously.
    pub async fn run_now(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if state.action_in_flight {
                return;
            }
            state.action_in_flight = true;
        }

        match self.backend.trigger_now(SCHEDULE_ID).await {
            Ok(()) => self.load_logs(DEFAULT_LOG_LIMIT).await,
            Err(e) => {
                warn!("Schedule trigger failed: {:?}", e);
                self.state.lock().unwrap().error = Some(TRIGGER_FAILED_MSG.to_string());
            }
        }
        self.state.lock().unwrap().action_in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ScheduleFetch;
    use anyhow::Result;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Get,
        Pause,
        Resume,
        Trigger,
        Logs(usize),
    }

    /// Records every backend call and serves configurable outcomes. The
    /// served schedule's `is_active` flips to `toggled_active` after any
    /// pause/resume so reload-driven state changes are observable.
    struct MockScheduler {
        calls: Mutex<Vec<Call>>,
        active_before: bool,
        toggled_active: bool,
        fail_get: bool,
        fail_logs: bool,
        fail_mutations: bool,
        service_error: Option<String>,
    }

    impl MockScheduler {
        fn new(active: bool) -> Self {
            MockScheduler {
                calls: Mutex::new(Vec::new()),
                active_before: active,
                toggled_active: active,
                fail_get: false,
                fail_logs: false,
                fail_mutations: false,
                service_error: None,
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn schedule(&self, is_active: bool) -> Schedule {
            Schedule {
                is_active,
                cron_expression: "0 8 * * *".to_string(),
                timezone: "America/New_York".to_string(),
                next_run_time: Some("2026-08-07T08:00:00Z".to_string()),
                last_run_at: None,
                last_run_success: None,
            }
        }

        fn mutated(&self) -> bool {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .any(|c| matches!(c, Call::Pause | Call::Resume))
        }
    }

    #[async_trait::async_trait]
    impl SchedulerBackend for MockScheduler {
        async fn get_schedule(&self, _id: &str) -> Result<ScheduleFetch> {
            self.calls.lock().unwrap().push(Call::Get);
            if self.fail_get {
                return Err(anyhow::anyhow!("unreachable"));
            }
            if let Some(error) = &self.service_error {
                return Ok(ScheduleFetch {
                    schedule: None,
                    error: Some(error.clone()),
                });
            }
            let is_active = if self.mutated() {
                self.toggled_active
            } else {
                self.active_before
            };
            Ok(ScheduleFetch {
                schedule: Some(self.schedule(is_active)),
                error: None,
            })
        }

        async fn pause(&self, _id: &str) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Pause);
            if self.fail_mutations {
                return Err(anyhow::anyhow!("pause refused"));
            }
            Ok(())
        }

        async fn resume(&self, _id: &str) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Resume);
            if self.fail_mutations {
                return Err(anyhow::anyhow!("resume refused"));
            }
            Ok(())
        }

        async fn trigger_now(&self, _id: &str) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Trigger);
            if self.fail_mutations {
                return Err(anyhow::anyhow!("trigger refused"));
            }
            Ok(())
        }

        async fn get_logs(&self, _id: &str, limit: usize) -> Result<Vec<ExecutionLogEntry>> {
            self.calls.lock().unwrap().push(Call::Logs(limit));
            if self.fail_logs {
                return Err(anyhow::anyhow!("logs unavailable"));
            }
            Ok(vec![ExecutionLogEntry {
                id: "run-1".to_string(),
                executed_at: "2026-08-06T08:00:00Z".to_string(),
                success: true,
                attempt: 1,
                max_attempts: 3,
                response_status: "200".to_string(),
                error_message: None,
            }])
        }
    }

    fn controller(mock: MockScheduler) -> (ScheduleController, Arc<MockScheduler>) {
        let mock = Arc::new(mock);
        (ScheduleController::new(mock.clone()), mock)
    }

    #[tokio::test]
    async fn toggle_of_active_schedule_pauses_then_reloads_exactly_once() {
        let (controller, mock) = controller(MockScheduler {
            toggled_active: false,
            ..MockScheduler::new(true)
        });

        controller.load().await;
        assert!(controller.snapshot().schedule.unwrap().is_active);

        controller.toggle().await;

        assert_eq!(mock.calls(), vec![Call::Get, Call::Pause, Call::Get]);
        let state = controller.snapshot();
        // Visible state changed only via the post-mutation reload.
        assert!(!state.schedule.unwrap().is_active);
        assert!(!state.action_in_flight);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn toggle_of_paused_schedule_resumes() {
        let (controller, mock) = controller(MockScheduler {
            toggled_active: true,
            ..MockScheduler::new(false)
        });

        controller.load().await;
        controller.toggle().await;

        assert_eq!(mock.calls(), vec![Call::Get, Call::Resume, Call::Get]);
        assert!(controller.snapshot().schedule.unwrap().is_active);
    }

    #[tokio::test]
    async fn failed_toggle_keeps_prior_state_and_surfaces_message() {
        let (controller, mock) = controller(MockScheduler {
            fail_mutations: true,
            ..MockScheduler::new(true)
        });

        controller.load().await;
        controller.toggle().await;

        // No reload after a refused mutation; the old state stays.
        assert_eq!(mock.calls(), vec![Call::Get, Call::Pause]);
        let state = controller.snapshot();
        assert!(state.schedule.unwrap().is_active);
        assert_eq!(state.error.as_deref(), Some(TOGGLE_FAILED_MSG));
        assert!(!state.action_in_flight);
    }

    #[tokio::test]
    async fn toggle_without_a_loaded_schedule_is_a_noop() {
        let (controller, mock) = controller(MockScheduler::new(true));
        controller.toggle().await;
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn run_now_triggers_then_reloads_logs_not_the_schedule() {
        let (controller, mock) = controller(MockScheduler::new(true));

        controller.run_now().await;

        assert_eq!(
            mock.calls(),
            vec![Call::Trigger, Call::Logs(DEFAULT_LOG_LIMIT)]
        );
        let state = controller.snapshot();
        assert_eq!(state.logs.len(), 1);
        assert!(!state.action_in_flight);
    }

    #[tokio::test]
    async fn failed_trigger_surfaces_message_and_skips_log_reload() {
        let (controller, mock) = controller(MockScheduler {
            fail_mutations: true,
            ..MockScheduler::new(true)
        });

        controller.run_now().await;

        assert_eq!(mock.calls(), vec![Call::Trigger]);
        assert_eq!(
            controller.snapshot().error.as_deref(),
            Some(TRIGGER_FAILED_MSG)
        );
    }

    #[tokio::test]
    async fn failed_logs_leave_the_loaded_schedule_intact() {
        let (controller, _mock) = controller(MockScheduler {
            fail_logs: true,
            ..MockScheduler::new(true)
        });

        controller.refresh().await;

        let state = controller.snapshot();
        assert!(state.schedule.is_some());
        assert!(state.logs.is_empty());
        assert!(state.error.is_none());
        assert!(!state.loading && !state.logs_loading);
    }

    #[tokio::test]
    async fn load_failure_surfaces_generic_message() {
        let (controller, _mock) = controller(MockScheduler {
            fail_get: true,
            ..MockScheduler::new(true)
        });

        controller.load().await;

        let state = controller.snapshot();
        assert!(state.schedule.is_none());
        assert_eq!(state.error.as_deref(), Some(LOAD_FAILED_MSG));
    }

    #[tokio::test]
    async fn service_supplied_error_string_is_surfaced() {
        let (controller, _mock) = controller(MockScheduler {
            service_error: Some("Schedule not found".to_string()),
            ..MockScheduler::new(true)
        });

        controller.load().await;

        assert_eq!(
            controller.snapshot().error.as_deref(),
            Some("Schedule not found")
        );
    }

    #[tokio::test]
    async fn load_clears_a_previous_error() {
        let (controller, mock) = controller(MockScheduler::new(true));

        // Seed an error state via a refused trigger, then reload.
        mock.calls.lock().unwrap().clear();
        controller
            .state
            .lock()
            .unwrap()
            .error
            .replace("stale".to_string());

        controller.load().await;
        assert!(controller.snapshot().error.is_none());
    }
}
