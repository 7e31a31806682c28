//! Active-site tracking state machine.
//!
//! The tracker knows which hostname is active and since when. It holds no
//! timer of its own; the caller feeds it focus changes and a periodic
//! tick, both carrying "now" from the [`Clock`](crate::Clock). Any
//! operation that stops or re-bases the running clock returns a [`Flush`]
//! carrying the seconds accrued so far, which the caller commits to the
//! aggregator. Rebasing happens inside the same call that produces the
//! flush, so accrued time is never double-counted.
//!
//! Invariant: `active_hostname` and `tracking_since` are both set or
//! both `None`.

use chrono::{DateTime, Utc};

/// Seconds accrued for a hostname, ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flush {
    pub hostname: String,
    pub seconds: u64,
}

#[derive(Debug, Default)]
pub struct Tracker {
    active_hostname: Option<String>,
    tracking_since: Option<DateTime<Utc>>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking_since.is_some()
    }

    pub fn active_hostname(&self) -> Option<&str> {
        self.active_hostname.as_deref()
    }

    /// Seconds since tracking started, clamped to zero if the system
    /// clock regressed. Zero when not tracking.
    pub fn elapsed_since_start(&self, now: DateTime<Utc>) -> u64 {
        match self.tracking_since {
            Some(since) => (now - since).num_seconds().max(0) as u64,
            None => 0,
        }
    }

    /// Start tracking `hostname`. If a different hostname was being
    /// tracked, its accrued time is returned for the caller to commit.
    ///
    /// Switching to the hostname already being tracked is a no-op:
    /// `tracking_since` is kept, so a same-host navigation loses no time.
    pub fn switch_to(&mut self, hostname: &str, now: DateTime<Utc>) -> Option<Flush> {
        if self.is_tracking() && self.active_hostname.as_deref() == Some(hostname) {
            return None;
        }
        let flush = self.take_accrued(now);
        self.active_hostname = Some(hostname.to_string());
        self.tracking_since = Some(now);
        flush
    }

    /// Stop tracking, returning any accrued time.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Flush> {
        let flush = self.take_accrued(now);
        self.active_hostname = None;
        self.tracking_since = None;
        flush
    }

    /// Periodic flush: hand out the seconds accrued since the last
    /// rebase and restart the clock at `now`. Tracking continues on the
    /// same hostname. Returns `None` when not tracking or when less than
    /// a whole second has accrued.
    pub fn flush(&mut self, now: DateTime<Utc>) -> Option<Flush> {
        if !self.is_tracking() {
            return None;
        }
        let seconds = self.elapsed_since_start(now);
        if seconds == 0 {
            return None;
        }
        let hostname = self.active_hostname.clone()?;
        self.tracking_since = Some(now);
        Some(Flush { hostname, seconds })
    }

    fn take_accrued(&mut self, now: DateTime<Utc>) -> Option<Flush> {
        if !self.is_tracking() {
            return None;
        }
        let seconds = self.elapsed_since_start(now);
        let hostname = self.active_hostname.clone()?;
        if seconds == 0 {
            return None;
        }
        Some(Flush { hostname, seconds })
    }
}
