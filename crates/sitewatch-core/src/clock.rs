//! Time source abstraction.
//!
//! The engine never reads the system clock directly. Everything flows
//! through the [`Clock`] trait so the day-boundary comparison is
//! timezone-explicit and the whole engine can be driven deterministically
//! in tests via [`ManualClock`].

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

/// Wall-clock source.
///
/// `local_date` and `local_hour` define the day boundary and the hourly
/// bucket; they are civil time in the host's timezone, not UTC.
pub trait Clock: Send {
    fn now(&self) -> DateTime<Utc>;
    fn local_date(&self) -> NaiveDate;
    fn local_hour(&self) -> u32;
}

/// System clock backed by `chrono::Local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn local_hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// Manually advanced clock for tests.
///
/// Holds a single civil datetime; `now()` reports it as if it were UTC,
/// which keeps elapsed-time arithmetic and the local calendar consistent
/// with each other. Clones share state, so a test can keep a handle while
/// the engine owns the boxed trait object.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn starting_at(at: NaiveDateTime) -> Self {
        Self {
            current: Arc::new(Mutex::new(at)),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut cur = self.current.lock().unwrap();
        *cur = *cur + chrono::Duration::seconds(secs);
    }

    pub fn set(&self, at: NaiveDateTime) {
        *self.current.lock().unwrap() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.current.lock().unwrap())
    }

    fn local_date(&self) -> NaiveDate {
        self.current.lock().unwrap().date()
    }

    fn local_hour(&self) -> u32 {
        self.current.lock().unwrap().hour()
    }
}
