pub mod store;

pub use store::{ExportDocument, Store, StoreTx};

use std::path::PathBuf;

use crate::error::StoreError;

/// Returns `~/.config/sitewatch[-dev]/` based on SITEWATCH_ENV.
///
/// Set SITEWATCH_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SITEWATCH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("sitewatch-dev")
    } else {
        base_dir.join("sitewatch")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StoreError::DataDir(e.to_string()))?;
    Ok(dir)
}

/// Persisted key space (spelled out in one place so the export document
/// and the engine agree on names).
pub mod keys {
    pub const SETTINGS: &str = "settings";
    pub const DAILY_STATS: &str = "daily_stats";
    pub const DAILY_TOTAL_SECS: &str = "daily_total_secs";
    pub const HOURLY_BUCKETS: &str = "hourly_buckets";
    pub const LIFETIME_STATS: &str = "lifetime_stats";
    pub const REMINDERS_FIRED_TODAY: &str = "reminders_fired_today";
    pub const LAST_REMINDER_AT_SECS: &str = "last_reminder_at_secs";
    pub const LAST_RESET_DATE: &str = "last_reset_date";
}
