// SQLite persistence for board state.
//
// Everything the board persists is a JSON value under a string key: the
// drafted ids (in draft order) and the last good copy of the player feed.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::board::player::PlayerId;

/// Key holding the drafted ids as a JSON array, oldest draft first.
pub const DRAFTED_KEY: &str = "ff_drafted";

/// Key holding the raw player records from the last successful load.
pub const CATALOG_CACHE_KEY: &str = "ff_data";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to (de)serialize state value: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("state store lock poisoned")]
    Poisoned,
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Durable key-value store for board state.
pub trait StateStore: Send {
    /// Load a previously saved value. `None` when the key was never written.
    fn load_state(&self, key: &str) -> Result<Option<Value>, PersistenceError>;

    /// Save `value` under `key`, replacing whatever was there.
    fn save_state(&self, key: &str, value: &Value) -> Result<(), PersistenceError>;

    /// Forget the drafted ids. The catalog cache is left alone.
    fn clear_board(&self) -> Result<(), PersistenceError>;
}

/// Read the persisted drafted ids.
///
/// Entries that are not valid ids are dropped with a warning; a value that is
/// not an array reads as empty.
pub fn load_drafted_ids(store: &dyn StateStore) -> Result<Vec<PlayerId>, PersistenceError> {
    let Some(value) = store.load_state(DRAFTED_KEY)? else {
        return Ok(Vec::new());
    };
    let Value::Array(items) = value else {
        warn!("Ignoring non-array value under {}", DRAFTED_KEY);
        return Ok(Vec::new());
    };

    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<PlayerId>(item.clone()) {
            Ok(id) => ids.push(id),
            Err(_) => warn!("Skipping unreadable drafted id: {}", item),
        }
    }
    Ok(ids)
}

/// Persist the drafted ids in ledger order.
pub fn save_drafted_ids(store: &dyn StateStore, ids: &[PlayerId]) -> Result<(), PersistenceError> {
    let value = serde_json::to_value(ids)?;
    store.save_state(DRAFTED_KEY, &value)
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// SQLite-backed state store.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral database.
    pub fn open(path: &str) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path).map_err(|source| PersistenceError::Open {
            path: path.to_string(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS board_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.conn.lock().map_err(|_| PersistenceError::Poisoned)
    }
}

impl StateStore for Database {
    fn load_state(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM board_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json_str) => Ok(Some(serde_json::from_str(&json_str)?)),
            None => Ok(None),
        }
    }

    fn save_state(&self, key: &str, value: &Value) -> Result<(), PersistenceError> {
        let json_str = serde_json::to_string(value)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO board_state (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )?;
        Ok(())
    }

    fn clear_board(&self) -> Result<(), PersistenceError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM board_state WHERE key = ?1", params![DRAFTED_KEY])?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process state store for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> Result<MutexGuard<'_, HashMap<String, Value>>, PersistenceError> {
        self.values.lock().map_err(|_| PersistenceError::Poisoned)
    }
}

impl StateStore for MemoryStore {
    fn load_state(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        Ok(self.values()?.get(key).cloned())
    }

    fn save_state(&self, key: &str, value: &Value) -> Result<(), PersistenceError> {
        self.values()?.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn clear_board(&self) -> Result<(), PersistenceError> {
        self.values()?.remove(DRAFTED_KEY);
        Ok(())
    }
}

/// Shared stores (e.g. a test holding onto the store it handed the session).
impl<S: StateStore + Sync + ?Sized> StateStore for std::sync::Arc<S> {
    fn load_state(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        (**self).load_state(key)
    }

    fn save_state(&self, key: &str, value: &Value) -> Result<(), PersistenceError> {
        (**self).save_state(key, value)
    }

    fn clear_board(&self) -> Result<(), PersistenceError> {
        (**self).clear_board()
    }
}
