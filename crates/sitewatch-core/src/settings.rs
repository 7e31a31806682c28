//! User settings.
//!
//! Settings live in the persisted store document alongside the counters;
//! `UPDATE_SETTINGS` is the only writer. The reminder interval is either
//! one of the preset values or a custom override; the custom value wins
//! whenever it is present.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Preset reminder intervals, in minutes.
pub const PRESET_INTERVALS_MIN: [u32; 3] = [15, 30, 45];

/// Default reminder interval, in minutes. Also the fallback when a
/// persisted interval turns out to be out of range.
pub const DEFAULT_INTERVAL_MIN: u32 = 15;

/// Allowed range for the custom interval, in minutes.
pub const CUSTOM_INTERVAL_RANGE_MIN: std::ops::RangeInclusive<u32> = 1..=180;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Preset reminder interval in minutes (15, 30, or 45).
    #[serde(default = "default_interval")]
    pub reminder_interval_min: u32,
    /// Custom interval override in minutes (1-180). Wins over the preset
    /// when set.
    #[serde(default)]
    pub custom_interval_min: Option<u32>,
    #[serde(default = "default_true")]
    pub enable_notifications: bool,
    #[serde(default = "default_true")]
    pub enable_page_interrupt: bool,
}

fn default_interval() -> u32 {
    DEFAULT_INTERVAL_MIN
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reminder_interval_min: DEFAULT_INTERVAL_MIN,
            custom_interval_min: None,
            enable_notifications: true,
            enable_page_interrupt: true,
        }
    }
}

impl Settings {
    /// Reject intervals outside the documented preset set / custom range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !PRESET_INTERVALS_MIN.contains(&self.reminder_interval_min) {
            return Err(SettingsError::InvalidPreset(self.reminder_interval_min));
        }
        if let Some(custom) = self.custom_interval_min {
            if !CUSTOM_INTERVAL_RANGE_MIN.contains(&custom) {
                return Err(SettingsError::InvalidCustom(custom));
            }
        }
        Ok(())
    }

    /// Effective reminder interval in minutes: custom wins over preset.
    ///
    /// A malformed persisted value falls back to the default interval
    /// rather than failing; the reminder loop must keep running.
    pub fn effective_interval_min(&self) -> u32 {
        let min = self.custom_interval_min.unwrap_or(self.reminder_interval_min);
        if min == 0 || min > *CUSTOM_INTERVAL_RANGE_MIN.end() {
            DEFAULT_INTERVAL_MIN
        } else {
            min
        }
    }

    /// Effective reminder interval in seconds.
    pub fn effective_interval_secs(&self) -> u64 {
        u64::from(self.effective_interval_min()) * 60
    }
}
