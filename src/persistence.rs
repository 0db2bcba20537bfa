//! SQLite key-value persistence for settings, tasks, notes and daily stats.

use crate::models::{DailyStatsRecord, Settings};
use crate::tasks::Task;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::warn;

const SETTINGS_KEY: &str = "settings";
const TASKS_KEY: &str = "pomodoro_tasks";
const NOTES_KEY: &str = "pomodoro_notes";
const STATS_KEY_PREFIX: &str = "pomodoro_";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to create data directory {0}")]
    DirectoryCreation(PathBuf),
}

/// Storage for per-day focus statistics, keyed by a `YYYY-MM-DD` date key.
pub trait StatsStore {
    fn read(&self, date_key: &str) -> Result<Option<DailyStatsRecord>, DatabaseError>;
    fn write(&self, date_key: &str, record: &DailyStatsRecord) -> Result<(), DatabaseError>;
}

impl<T: StatsStore + ?Sized> StatsStore for Rc<T> {
    fn read(&self, date_key: &str) -> Result<Option<DailyStatsRecord>, DatabaseError> {
        (**self).read(date_key)
    }

    fn write(&self, date_key: &str, record: &DailyStatsRecord) -> Result<(), DatabaseError> {
        (**self).write(date_key, record)
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) `pomodesk.db` inside `dir`.
    pub fn open_in(dir: &Path) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(dir)
            .map_err(|_| DatabaseError::DirectoryCreation(dir.to_path_buf()))?;

        let conn = Connection::open(dir.join("pomodesk.db"))?;
        Self::initialize_tables(&conn)?;

        Ok(Self { conn })
    }

    /// Like [`Database::open_in`], but falls back to an in-memory database
    /// when `dir` cannot be used. Nothing is saved across runs in that case.
    pub fn open_or_in_memory(dir: &Path) -> Result<Self, DatabaseError> {
        Self::open_in(dir).or_else(|e| {
            warn!(error = %e, dir = %dir.display(), "database unavailable, keeping state in memory");
            Self::new_in_memory()
        })
    }

    /// Creates an in-memory database.
    pub fn new_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_tables(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    fn get_value(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_value(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Loads settings from the database, returning defaults if not found.
    pub fn load_settings(&self) -> Result<Settings, DatabaseError> {
        match self.get_value(SETTINGS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Settings::default()),
        }
    }

    /// Saves settings to the database.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), DatabaseError> {
        self.set_value(SETTINGS_KEY, &serde_json::to_string(settings)?)
    }

    /// Loads every stored task, oldest first.
    pub fn load_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        match self.get_value(TASKS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replaces the stored task list.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), DatabaseError> {
        self.set_value(TASKS_KEY, &serde_json::to_string(tasks)?)
    }

    pub fn load_notes(&self) -> Result<String, DatabaseError> {
        Ok(self.get_value(NOTES_KEY)?.unwrap_or_default())
    }

    pub fn save_notes(&self, notes: &str) -> Result<(), DatabaseError> {
        self.set_value(NOTES_KEY, notes)
    }
}

impl StatsStore for Database {
    fn read(&self, date_key: &str) -> Result<Option<DailyStatsRecord>, DatabaseError> {
        let key = format!("{STATS_KEY_PREFIX}{date_key}");
        match self.get_value(&key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write(&self, date_key: &str, record: &DailyStatsRecord) -> Result<(), DatabaseError> {
        let key = format!("{STATS_KEY_PREFIX}{date_key}");
        self.set_value(&key, &serde_json::to_string(record)?)
    }
}

/// Returns the platform data directory for pomodesk.
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "pomodesk", "Pomodesk")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".pomodesk"))
}

/// In-memory stats store that can be told to fail.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub records: std::cell::RefCell<std::collections::HashMap<String, DailyStatsRecord>>,
    pub failing: std::cell::Cell<bool>,
    pub writes: std::cell::Cell<usize>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_record(date_key: &str, record: DailyStatsRecord) -> Self {
        let store = Self::default();
        store.records.borrow_mut().insert(date_key.to_string(), record);
        store
    }

    pub fn get(&self, date_key: &str) -> Option<DailyStatsRecord> {
        self.records.borrow().get(date_key).copied()
    }

    fn busy() -> DatabaseError {
        DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ))
    }
}

#[cfg(test)]
impl StatsStore for MemoryStore {
    fn read(&self, date_key: &str) -> Result<Option<DailyStatsRecord>, DatabaseError> {
        if self.failing.get() {
            return Err(Self::busy());
        }
        Ok(self.get(date_key))
    }

    fn write(&self, date_key: &str, record: &DailyStatsRecord) -> Result<(), DatabaseError> {
        if self.failing.get() {
            return Err(Self::busy());
        }
        self.writes.set(self.writes.get() + 1);
        self.records
            .borrow_mut()
            .insert(date_key.to_string(), *record);
        Ok(())
    }
}
