use chrono::{DateTime, Utc};
use content::{ResearchSummary, VideoScript};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::db::Database;

const HISTORY_KEY: &str = "history";

/// One durable record of a past generation. Immutable after creation; the
/// only mutation the store offers is deletion by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub videos: Vec<VideoScript>,
    pub research_summary: Option<ResearchSummary>,
    pub content_strategy_notes: String,
    pub visual_style_recommendations: String,
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    while n > 0 {
        out.insert(0, BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}

/// Collision-resistant within a session: eight random base-36 characters
/// plus the current epoch millis in base 36. Global uniqueness across
/// sessions is not required.
pub fn new_history_id() -> String {
    let mut rng = rand::thread_rng();
    let random: String = (0..8).map(|_| BASE36[rng.gen_range(0..36)] as char).collect();
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!("hist_{}{}", random, to_base36(millis))
}

/// Ordered log of past generation results, newest first. A new entry is
/// always prepended, never inserted by timestamp sort. Every mutation
/// rewrites the full serialized sequence so the slot never diverges from
/// the in-memory mirror; persist failures are logged and ignored.
pub struct HistoryStore {
    db: Arc<Database>,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore {
    pub fn new(db: Arc<Database>) -> Self {
        let entries = match db.kv_get(HISTORY_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to load history: {:?}", e);
                Vec::new()
            }
        };
        HistoryStore {
            db,
            entries: Mutex::new(entries),
        }
    }

    pub fn list(&self) -> Vec<HistoryEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn prepend(&self, entry: HistoryEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(0, entry);
        self.persist(&entries);
    }

    /// Removes at most one entry; an unknown id is a no-op.
    pub fn delete(&self, id: &str) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(pos) = entries.iter().position(|e| e.id == id) {
            entries.remove(pos);
            self.persist(&entries);
        }
    }

    fn persist(&self, entries: &[HistoryEntry]) {
        match serde_json::to_string(entries) {
            Ok(raw) => {
                if let Err(e) = self.db.kv_put(HISTORY_KEY, &raw) {
                    warn!("Failed to persist history: {:?}", e);
                }
            }
            Err(e) => warn!("Failed to serialize history: {:?}", e),
        }
    }
}
