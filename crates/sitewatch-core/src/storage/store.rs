//! SQLite-backed key-value persistence.
//!
//! The whole persisted state is one small key space (settings, counters,
//! watermarks) stored as JSON values in a `kv` table. Multi-key updates
//! run inside a transaction so no reader observes a partially-updated
//! set of counters at rest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{data_dir, keys};
use crate::error::StoreError;
use crate::reminder::ReminderState;
use crate::settings::Settings;

/// The full persisted document, as exported for user backup.
///
/// Field names match the key space verbatim; the export is the same
/// JSON the store holds, gathered into one object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub settings: Settings,
    pub daily_stats: BTreeMap<String, u64>,
    pub daily_total_secs: u64,
    pub hourly_buckets: BTreeMap<u32, u64>,
    pub lifetime_stats: BTreeMap<String, u64>,
    pub reminders_fired_today: u32,
    pub last_reminder_at_secs: u64,
    pub last_reset_date: Option<NaiveDate>,
}

/// Durable key-value store for the engine's persisted state.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the store at `~/.config/sitewatch/sitewatch.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()?.join("sitewatch.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path (tests, export tooling).
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Read a single key. Missing keys decode to `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        get_value(&self.conn, key)
    }

    /// Write a single key.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        put_value(&self.conn, key, value)
    }

    /// Start a write transaction covering several keys.
    ///
    /// The aggregator's read-modify-write cycle runs entirely inside one
    /// transaction; two racing commits cannot lose updates.
    pub fn transaction(&mut self) -> Result<StoreTx<'_>, StoreError> {
        let tx = self.conn.transaction()?;
        Ok(StoreTx { tx })
    }

    /// Gather the whole key space into one document.
    pub fn document(&self) -> Result<ExportDocument, StoreError> {
        Ok(ExportDocument {
            settings: self.get(keys::SETTINGS)?.unwrap_or_default(),
            daily_stats: self.get(keys::DAILY_STATS)?.unwrap_or_default(),
            daily_total_secs: self.get(keys::DAILY_TOTAL_SECS)?.unwrap_or_default(),
            hourly_buckets: self.get(keys::HOURLY_BUCKETS)?.unwrap_or_default(),
            lifetime_stats: self.get(keys::LIFETIME_STATS)?.unwrap_or_default(),
            reminders_fired_today: self.get(keys::REMINDERS_FIRED_TODAY)?.unwrap_or_default(),
            last_reminder_at_secs: self.get(keys::LAST_REMINDER_AT_SECS)?.unwrap_or_default(),
            last_reset_date: self.get(keys::LAST_RESET_DATE)?,
        })
    }

    /// Serialize the whole document to `sitewatch-export-YYYY-MM-DD.json`
    /// under `dir`. Returns the path written.
    pub fn export_to(&self, dir: &Path, date: NaiveDate) -> Result<PathBuf, StoreError> {
        let doc = self.document()?;
        let json = serde_json::to_string_pretty(&doc).map_err(|e| StoreError::CorruptValue {
            key: "document".into(),
            message: e.to_string(),
        })?;
        let path = dir.join(format!("sitewatch-export-{}.json", date.format("%Y-%m-%d")));
        std::fs::write(&path, json).map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(path)
    }

    /// Load persisted settings, or defaults if none were saved yet.
    pub fn settings(&self) -> Result<Settings, StoreError> {
        Ok(self.get(keys::SETTINGS)?.unwrap_or_default())
    }
}

/// An open write transaction over the key space.
pub struct StoreTx<'a> {
    tx: rusqlite::Transaction<'a>,
}

impl StoreTx<'_> {
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        get_value(&self.tx, key)
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        put_value(&self.tx, key, value)
    }

    pub fn commit(self) -> Result<(), StoreError> {
        self.tx.commit()?;
        Ok(())
    }

    /// Reset-state helper: zero daily stats, hourly buckets, and the
    /// reminder watermark. Used both by the lazy day rollover and by
    /// `RESET_TODAY`.
    pub fn clear_daily(&self) -> Result<(), StoreError> {
        self.put(keys::DAILY_STATS, &BTreeMap::<String, u64>::new())?;
        self.put(keys::DAILY_TOTAL_SECS, &0u64)?;
        self.put(keys::HOURLY_BUCKETS, &BTreeMap::<u32, u64>::new())?;
        self.put(keys::LAST_REMINDER_AT_SECS, &0u64)?;
        self.put(keys::REMINDERS_FIRED_TODAY, &0u32)?;
        Ok(())
    }

    pub fn reminder_state(&self) -> Result<ReminderState, StoreError> {
        Ok(ReminderState {
            last_reminder_at_secs: self.get(keys::LAST_REMINDER_AT_SECS)?.unwrap_or_default(),
            reminders_fired_today: self.get(keys::REMINDERS_FIRED_TODAY)?.unwrap_or_default(),
        })
    }

    pub fn put_reminder_state(&self, state: &ReminderState) -> Result<(), StoreError> {
        self.put(keys::LAST_REMINDER_AT_SECS, &state.last_reminder_at_secs)?;
        self.put(keys::REMINDERS_FIRED_TODAY, &state.reminders_fired_today)?;
        Ok(())
    }
}

fn get_value<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>, StoreError> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()?;
    match raw {
        Some(json) => {
            let value = serde_json::from_str(&json).map_err(|e| StoreError::CorruptValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn put_value<T: Serialize>(conn: &Connection, key: &str, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string(value).map_err(|e| StoreError::CorruptValue {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, json],
    )?;
    Ok(())
}
