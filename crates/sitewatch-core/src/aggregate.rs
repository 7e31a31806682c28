//! Aggregation of flushed seconds into persisted counters.
//!
//! A commit folds seconds into the daily per-site map, the daily total,
//! the hourly bucket for the current local hour, and the lifetime
//! per-site map. The day boundary is handled lazily here, at the first
//! commit after the stored reset date stops matching today's local date;
//! a timer-based reset would miss midnights spent asleep or suspended.
//!
//! The whole read-modify-write cycle runs inside one store transaction,
//! so racing commits cannot lose updates and no reader observes a
//! partially-updated set of counters at rest.

use std::collections::BTreeMap;

use crate::clock::Clock;
use crate::error::StoreError;
use crate::storage::{keys, Store};

/// Result of a commit, for the caller to feed the reminder policy and
/// the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Daily total after this commit.
    pub daily_total_secs: u64,
    /// Whether the lazy day-boundary reset ran as part of this commit.
    pub rolled_over: bool,
}

/// Commit `seconds` of browsing time for `hostname`.
///
/// `seconds` may be zero; the rollover check still runs, which keeps the
/// stored date fresh on quiet days.
pub fn commit(
    store: &mut Store,
    clock: &dyn Clock,
    hostname: &str,
    seconds: u64,
) -> Result<CommitOutcome, StoreError> {
    let today = clock.local_date();
    let hour = clock.local_hour();

    let tx = store.transaction()?;

    let last_reset: Option<chrono::NaiveDate> = tx.get(keys::LAST_RESET_DATE)?;
    let rolled_over = last_reset != Some(today);
    if rolled_over {
        tx.clear_daily()?;
        tx.put(keys::LAST_RESET_DATE, &today)?;
    }

    let mut daily: BTreeMap<String, u64> = if rolled_over {
        BTreeMap::new()
    } else {
        tx.get(keys::DAILY_STATS)?.unwrap_or_default()
    };
    *daily.entry(hostname.to_string()).or_insert(0) += seconds;

    let daily_total_secs = if rolled_over {
        seconds
    } else {
        tx.get::<u64>(keys::DAILY_TOTAL_SECS)?.unwrap_or(0) + seconds
    };

    let mut hourly: BTreeMap<u32, u64> = if rolled_over {
        BTreeMap::new()
    } else {
        tx.get(keys::HOURLY_BUCKETS)?.unwrap_or_default()
    };
    *hourly.entry(hour).or_insert(0) += seconds;

    // Lifetime stats survive the day boundary.
    let mut lifetime: BTreeMap<String, u64> = tx.get(keys::LIFETIME_STATS)?.unwrap_or_default();
    *lifetime.entry(hostname.to_string()).or_insert(0) += seconds;

    tx.put(keys::DAILY_STATS, &daily)?;
    tx.put(keys::DAILY_TOTAL_SECS, &daily_total_secs)?;
    tx.put(keys::HOURLY_BUCKETS, &hourly)?;
    tx.put(keys::LIFETIME_STATS, &lifetime)?;
    tx.commit()?;

    Ok(CommitOutcome {
        daily_total_secs,
        rolled_over,
    })
}
