use content::Settings;
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::db::Database;

const SETTINGS_KEY: &str = "settings";

/// The single current Settings value: loaded once at startup (seeding the
/// default when the slot is empty or unreadable), mutated only by explicit
/// save. The in-memory copy is authoritative for the session; persistence
/// failures are logged and ignored.
pub struct SettingsStore {
    db: Arc<Database>,
    current: Mutex<Settings>,
}

impl SettingsStore {
    pub fn new(db: Arc<Database>) -> Self {
        let current = match db.kv_get(SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            Ok(None) => {
                let seed = Settings::default();
                if let Ok(raw) = serde_json::to_string(&seed) {
                    if let Err(e) = db.kv_put(SETTINGS_KEY, &raw) {
                        warn!("Failed to seed settings: {:?}", e);
                    }
                }
                seed
            }
            Err(e) => {
                warn!("Failed to load settings: {:?}", e);
                Settings::default()
            }
        };
        SettingsStore {
            db,
            current: Mutex::new(current),
        }
    }

    pub fn get(&self) -> Settings {
        self.current.lock().unwrap().clone()
    }

    pub fn save(&self, settings: Settings) {
        *self.current.lock().unwrap() = settings.clone();
        match serde_json::to_string(&settings) {
            Ok(raw) => {
                if let Err(e) = self.db.kv_put(SETTINGS_KEY, &raw) {
                    warn!("Failed to persist settings: {:?}", e);
                }
            }
            Err(e) => warn!("Failed to serialize settings: {:?}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_db(dir: &tempfile::TempDir) -> Arc<Database> {
        Arc::new(Database::new(&dir.path().join("test.db")).unwrap())
    }

    #[test]
    fn first_run_seeds_the_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(open_db(&dir));
        assert_eq!(store.get(), Settings::default());

        // The seed is written through, not just held in memory.
        let raw = open_db(&dir).kv_get("settings").unwrap().unwrap();
        let persisted: Settings = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, Settings::default());
    }

    #[test]
    fn save_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(open_db(&dir));

        let mut settings = Settings::default();
        settings.product_name = "Acme".to_string();
        settings.key_features = vec!["Fast".to_string()];
        store.save(settings.clone());
        assert_eq!(store.get(), settings);

        let reloaded = SettingsStore::new(open_db(&dir));
        assert_eq!(reloaded.get(), settings);
    }

    #[test]
    fn corrupt_slot_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_db(&dir);
        db.kv_put("settings", "not json at all").unwrap();

        let store = SettingsStore::new(db);
        assert_eq!(store.get(), Settings::default());
    }
}
