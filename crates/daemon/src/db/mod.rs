use anyhow::Result;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// Local persistence behind a tiny key-value surface. Two logical slots are
/// in use (`settings` and `history`), each holding one serialized JSON
/// document that is read once at startup and rewritten wholesale on every
/// mutation.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query_map(params![key], |row| row.get(0))?;
        match rows.next() {
            Some(Ok(value)) => Ok(Some(value)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    pub fn kv_put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("test.db")).unwrap();

        assert!(db.kv_get("settings").unwrap().is_none());

        db.kv_put("settings", "{\"a\":1}").unwrap();
        assert_eq!(db.kv_get("settings").unwrap().as_deref(), Some("{\"a\":1}"));

        db.kv_put("settings", "{\"a\":2}").unwrap();
        assert_eq!(db.kv_get("settings").unwrap().as_deref(), Some("{\"a\":2}"));
    }

    #[test]
    fn slots_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("test.db")).unwrap();

        db.kv_put("settings", "s").unwrap();
        db.kv_put("history", "h").unwrap();
        assert_eq!(db.kv_get("settings").unwrap().as_deref(), Some("s"));
        assert_eq!(db.kv_get("history").unwrap().as_deref(), Some("h"));
    }
}
