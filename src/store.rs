//! Persisted state that must survive a restart.
//!
//! Two tables: `snapshots` holds timestamped JSON payloads (weather and
//! currency views reuse them on startup before the first live fetch), and
//! `settings` holds small preferences such as the selected UI language.
//! This store is separate from the in-memory TTL cache used per request.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS snapshots (
                key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                captured_at INTEGER NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Saves `payload` under `key`, stamped with the current wall-clock
    /// time. Overwrites any previous snapshot for the key.
    pub fn put_snapshot(&self, key: &str, payload: &Value) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO snapshots (key, payload, captured_at) VALUES (?, ?, ?)",
            params![key, payload.to_string(), Utc::now().timestamp()],
        )?;
        Ok(())
    }

    /// Returns the snapshot for `key` if it exists and is younger than
    /// `max_age`. A corrupt payload is dropped with a warning rather than
    /// surfaced as an error.
    pub fn get_snapshot(&self, key: &str, max_age: Duration) -> rusqlite::Result<Option<Value>> {
        let row = self
            .conn
            .query_row(
                "SELECT payload, captured_at FROM snapshots WHERE key = ?",
                [key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        let Some((payload, captured_at)) = row else {
            return Ok(None);
        };
        let age = Utc::now().timestamp().saturating_sub(captured_at);
        if age < 0 || age as u64 >= max_age.as_secs() {
            return Ok(None);
        }
        match serde_json::from_str(&payload) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Dropping corrupt snapshot '{}': {}", key, e);
                Ok(None)
            }
        }
    }

    pub fn set_language(&self, language: &str) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES ('language', ?)",
            [language],
        )?;
        Ok(())
    }

    pub fn language(&self) -> rusqlite::Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = 'language'",
                [],
                |row| row.get(0),
            )
            .optional()
    }
}
