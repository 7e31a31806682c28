//! Stats snapshot and display helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// On-demand stats snapshot handed to presentation adapters.
///
/// `daily_total_secs` already includes the tracker's live elapsed time,
/// so the reading is current to the second without waiting for the next
/// flush.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub daily_stats: BTreeMap<String, u64>,
    pub daily_total_secs: u64,
    pub lifetime_stats: BTreeMap<String, u64>,
    pub lifetime_total_secs: u64,
    pub hourly_buckets: BTreeMap<u32, u64>,
    pub reminders_fired_today: u32,
    pub settings: Settings,
    pub current_hostname: Option<String>,
}

/// "2h 5m" above an hour, "12 minutes" below.
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes} minutes")
    }
}

/// Compact badge text: "45m" under an hour, then "1h30" / "2h".
pub fn badge_text(secs: u64) -> String {
    let minutes = secs / 60;
    if minutes < 60 {
        format!("{minutes}m")
    } else {
        let hours = minutes / 60;
        let mins = minutes % 60;
        if mins > 0 {
            format!("{hours}h{mins}")
        } else {
            format!("{hours}h")
        }
    }
}
