use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Every observable state change in the engine produces an Event.
/// Presentation adapters subscribe and pull a fresh snapshot when one
/// arrives, instead of re-rendering on a fixed poll interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TrackingStarted {
        hostname: String,
        at: DateTime<Utc>,
    },
    TrackingPaused {
        at: DateTime<Utc>,
    },
    /// Persisted aggregates changed (a flush was committed or a reset ran).
    StatsChanged {
        daily_total_secs: u64,
        at: DateTime<Utc>,
    },
    /// The lazy day-boundary reset ran during a commit.
    DayRolledOver {
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    /// The daily total crossed the configured reminder interval.
    ///
    /// Delivery is the subscriber's concern: adapters gate notification
    /// and in-page interrupt surfaces on `Settings::enable_notifications`
    /// and `Settings::enable_page_interrupt`. The watermark has already
    /// advanced by the time this event is observed, so a suppressed or
    /// failed delivery is never retried.
    ReminderDue {
        total_secs: u64,
        interval_min: u32,
        at: DateTime<Utc>,
    },
}
