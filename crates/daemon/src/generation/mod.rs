use chrono::Utc;
use content::{normalize, prompt, GenerationResult, VisualPackage};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::agents::{AgentBackend, MANAGER_AGENT_ID, VISUAL_AGENT_ID};
use crate::history::{new_history_id, HistoryEntry, HistoryStore};
use crate::settings::SettingsStore;

/// How long the Complete/Failed label stays visible before the trigger
/// re-enables. Cosmetic only; data correctness never depends on it.
const SETTLE_DELAY: Duration = Duration::from_millis(1500);

const GENERATION_FAILED_MSG: &str = "Generation failed. Please try again.";
const NO_DATA_MSG: &str = "Agent returned no data. Please try again.";
const VISUAL_FAILED_MSG: &str = "Visual generation failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Researching,
    WritingScripts,
    Complete,
    Failed,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Researching => "Researching...",
            Phase::WritingScripts => "Writing scripts...",
            Phase::Complete => "Complete!",
            Phase::Failed => "Failed",
        }
    }
}

struct GenerationState {
    phase: Phase,
    busy: bool,
    active_agent: Option<&'static str>,
    error: Option<String>,
    current: Option<GenerationResult>,
    visual: Option<VisualPackage>,
    visual_busy: bool,
    visual_seq: u64,
}

impl GenerationState {
    fn new() -> Self {
        GenerationState {
            phase: Phase::Idle,
            busy: false,
            active_agent: None,
            error: None,
            current: None,
            visual: None,
            visual_busy: false,
            visual_seq: 0,
        }
    }
}

/// Read-only view of the generation state, as served to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSnapshot {
    pub phase: Phase,
    pub phase_label: &'static str,
    pub busy: bool,
    pub active_agent: Option<&'static str>,
    pub error: Option<String>,
    pub result: Option<GenerationResult>,
    pub visual: Option<VisualPackage>,
    pub visual_busy: bool,
}

/// Drives the two generation flows. The manager flow walks
/// Idle -> Researching -> WritingScripts -> Complete/Failed behind a single
/// busy flag; the visual flow is independent, keyed to one video at a time,
/// last invocation wins. Neither flow can cancel a request already sent to
/// the service; superseded responses are simply never read into state.
pub struct Orchestrator {
    agents: Arc<dyn AgentBackend>,
    settings: Arc<SettingsStore>,
    history: Arc<HistoryStore>,
    settle_delay: Duration,
    state: Mutex<GenerationState>,
}

impl Orchestrator {
    pub fn new(
        agents: Arc<dyn AgentBackend>,
        settings: Arc<SettingsStore>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self::with_settle_delay(agents, settings, history, SETTLE_DELAY)
    }

    pub fn with_settle_delay(
        agents: Arc<dyn AgentBackend>,
        settings: Arc<SettingsStore>,
        history: Arc<HistoryStore>,
        settle_delay: Duration,
    ) -> Self {
        Orchestrator {
            agents,
            settings,
            history,
            settle_delay,
            state: Mutex::new(GenerationState::new()),
        }
    }

    pub fn snapshot(&self) -> GenerationSnapshot {
        let state = self.state.lock().unwrap();
        GenerationSnapshot {
            phase: state.phase,
            phase_label: state.phase.label(),
            busy: state.busy,
            active_agent: state.active_agent,
            error: state.error.clone(),
            result: state.current.clone(),
            visual: state.visual.clone(),
            visual_busy: state.visual_busy,
        }
    }

    /// Run the manager flow: research plus script authoring in one agent
    /// call. A missing product name makes this a silent no-op.
    pub async fn run(self: Arc<Self>) {
        let settings = self.settings.get();
        if settings.product_name.is_empty() {
            return;
        }

        {
            let mut state = self.state.lock().unwrap();
            state.phase = Phase::Researching;
            state.busy = true;
            state.error = None;
            state.active_agent = Some(MANAGER_AGENT_ID);
        }

        let brief = prompt::production_brief(&settings);

        // UX label only; the agent call itself is a single atomic request.
        self.state.lock().unwrap().phase = Phase::WritingScripts;

        let outcome = self.agents.invoke(&brief, MANAGER_AGENT_ID).await;

        match outcome {
            Ok(reply) => match reply.result {
                Some(raw) => {
                    let result = normalize::manager_result(&raw);
                    info!(
                        "Generation complete: {} videos for {}",
                        result.videos.len(),
                        settings.product_name
                    );
                    self.history.prepend(HistoryEntry {
                        id: new_history_id(),
                        created_at: Utc::now(),
                        product_name: settings.product_name.clone(),
                        videos: result.videos.clone(),
                        research_summary: result.research_summary.clone(),
                        content_strategy_notes: result.content_strategy_notes.clone(),
                        visual_style_recommendations: result
                            .visual_style_recommendations
                            .clone(),
                    });
                    let mut state = self.state.lock().unwrap();
                    state.current = Some(result);
                    state.phase = Phase::Complete;
                    state.active_agent = None;
                }
                None => {
                    let mut state = self.state.lock().unwrap();
                    state.phase = Phase::Failed;
                    state.error = Some(NO_DATA_MSG.to_string());
                    state.active_agent = None;
                }
            },
            Err(e) => {
                warn!("Manager agent call failed: {:?}", e);
                let mut state = self.state.lock().unwrap();
                state.phase = Phase::Failed;
                state.error = Some(GENERATION_FAILED_MSG.to_string());
                state.active_agent = None;
            }
        }

        // Keep the Complete/Failed label visible before re-enabling the
        // trigger.
        let orchestrator = self.clone();
        tokio::spawn(async move {
            sleep(orchestrator.settle_delay).await;
            orchestrator.state.lock().unwrap().busy = false;
        });
    }

    /// Run the visual flow for the video at `index` in the current result.
    /// Not gated by the manager flow. Starting a new visual request
    /// supersedes any outstanding one: the stale response is dropped at
    /// settlement, no cancellation is sent to the service.
    pub async fn run_visuals(self: Arc<Self>, index: usize) {
        let video = {
            let state = self.state.lock().unwrap();
            match state.current.as_ref().and_then(|r| r.videos.get(index)) {
                Some(v) => v.clone(),
                None => return,
            }
        };

        let token = {
            let mut state = self.state.lock().unwrap();
            state.visual_busy = true;
            state.visual = None;
            state.active_agent = Some(VISUAL_AGENT_ID);
            state.visual_seq += 1;
            state.visual_seq
        };

        let brief = prompt::visual_brief(&video);
        let outcome = self.agents.invoke(&brief, VISUAL_AGENT_ID).await;

        let mut state = self.state.lock().unwrap();
        if state.visual_seq != token {
            // A newer visual request owns the state now.
            return;
        }

        match outcome {
            Ok(reply) => {
                if reply.result.is_some() || !reply.artifact_urls.is_empty() {
                    let raw = reply.result.unwrap_or(Value::Null);
                    let mut package = normalize::visual_result(&raw, &video);
                    package.asset_urls = reply.artifact_urls;
                    state.visual = Some(package);
                }
            }
            Err(e) => {
                warn!("Visual agent call failed: {:?}", e);
                state.error = Some(VISUAL_FAILED_MSG.to_string());
            }
        }
        state.active_agent = None;
        state.visual_busy = false;
    }
}
