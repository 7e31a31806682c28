//! Engine implementation.
//!
//! A single owned `Engine` instance ties the tracker, aggregator,
//! reminder policy, and store together. It holds no timer of its own --
//! the caller invokes `tick()` on a fixed cadence (design target: once
//! per second) while tracking, which flushes accrued time in bounded
//! slices so a crash loses at most one tick's worth of seconds.
//!
//! Every mutating operation goes through `&mut self`, so focus changes,
//! ticks, settings updates, and resets are serialized; no two
//! read-modify-write cycles on the persisted counters can interleave.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::aggregate;
use crate::clock::{Clock, SystemClock};
use crate::error::CoreError;
use crate::events::Event;
use crate::hostname::hostname_of;
use crate::reminder;
use crate::settings::Settings;
use crate::stats::StatsSnapshot;
use crate::storage::{keys, Store};
use crate::tracker::{Flush, Tracker};

pub struct Engine {
    store: Store,
    clock: Box<dyn Clock>,
    tracker: Tracker,
    subscribers: Vec<Sender<Event>>,
}

impl Engine {
    /// Open the engine over the default on-disk store and system clock.
    pub fn open() -> Result<Self, CoreError> {
        Ok(Self::new(Store::open()?, Box::new(SystemClock)))
    }

    pub fn new(store: Store, clock: Box<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            tracker: Tracker::new(),
            subscribers: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_tracking(&self) -> bool {
        self.tracker.is_tracking()
    }

    pub fn current_hostname(&self) -> Option<&str> {
        self.tracker.active_hostname()
    }

    /// Current persisted settings. Adapters consult these to gate
    /// reminder delivery (`enable_notifications`, `enable_page_interrupt`).
    pub fn settings(&self) -> Result<Settings, CoreError> {
        Ok(self.store.settings()?)
    }

    /// Build a stats snapshot, folding the tracker's live elapsed time
    /// into the daily total so the reading is current to the second.
    pub fn stats(&self) -> Result<StatsSnapshot, CoreError> {
        let doc = self.store.document()?;
        let live = self.tracker.elapsed_since_start(self.clock.now());
        let lifetime_total_secs = doc.lifetime_stats.values().sum();
        Ok(StatsSnapshot {
            daily_stats: doc.daily_stats,
            daily_total_secs: doc.daily_total_secs + live,
            lifetime_stats: doc.lifetime_stats,
            lifetime_total_secs,
            hourly_buckets: doc.hourly_buckets,
            reminders_fired_today: doc.reminders_fired_today,
            settings: doc.settings,
            current_hostname: self.tracker.active_hostname().map(str::to_owned),
        })
    }

    /// Subscribe to engine events. The receiver end is the adapter's;
    /// once it is dropped, the sender is pruned on the next broadcast.
    pub fn subscribe(&mut self) -> Receiver<Event> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// React to a tab/window focus change.
    ///
    /// `candidate_url` absent or not trackable (browser-internal pages,
    /// lost window focus) pauses tracking; otherwise tracking switches
    /// to the URL's hostname. A switch to the hostname already being
    /// tracked keeps the running clock.
    ///
    /// Storage failures are logged and swallowed; the tracking loop
    /// must keep running and the next flush retries naturally.
    pub fn on_focus_changed(&mut self, candidate_url: Option<&str>) {
        match candidate_url.and_then(hostname_of) {
            Some(host) => {
                let now = self.clock.now();
                let already_here = self.tracker.is_tracking()
                    && self.tracker.active_hostname() == Some(host.as_str());
                if let Some(flush) = self.tracker.switch_to(&host, now) {
                    self.commit_flush(flush);
                }
                if !already_here {
                    self.broadcast(Event::TrackingStarted { hostname: host, at: now });
                }
            }
            None => self.pause(),
        }
    }

    /// Pause tracking, flushing any accrued time.
    pub fn pause(&mut self) {
        let was_tracking = self.tracker.is_tracking();
        let now = self.clock.now();
        if let Some(flush) = self.tracker.pause(now) {
            self.commit_flush(flush);
        }
        if was_tracking {
            self.broadcast(Event::TrackingPaused { at: now });
        }
    }

    /// Periodic flush. Call on a fixed cadence while tracking.
    ///
    /// Commits the seconds accrued since the last tick and re-bases the
    /// tracker inside the same call, so time is never double-counted and
    /// at most one tick's worth is lost on a crash or a failed write.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(flush) = self.tracker.flush(now) {
            self.commit_flush(flush);
        }
    }

    /// Validate and persist new settings, re-basing the reminder
    /// watermark to the current daily total so the new interval is
    /// measured from now.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), CoreError> {
        settings.validate()?;
        // Flush accrued time first so the rebase sees the total as of
        // this moment, not as of the last tick.
        self.tick();
        let tx = self.store.transaction()?;
        tx.put(keys::SETTINGS, &settings)?;
        let daily_total: u64 = tx.get(keys::DAILY_TOTAL_SECS)?.unwrap_or(0);
        let mut state = tx.reminder_state()?;
        reminder::rebase(&mut state, daily_total);
        tx.put_reminder_state(&state)?;
        tx.commit()?;
        Ok(())
    }

    /// Zero today's stats, hourly buckets, and reminder state. Lifetime
    /// stats are untouched; tracking, if active, continues.
    pub fn reset_today(&mut self) -> Result<(), CoreError> {
        let today = self.clock.local_date();
        let tx = self.store.transaction()?;
        tx.clear_daily()?;
        tx.put(keys::LAST_RESET_DATE, &today)?;
        tx.commit()?;
        let at = self.clock.now();
        self.broadcast(Event::StatsChanged {
            daily_total_secs: 0,
            at,
        });
        Ok(())
    }

    /// Zero everything, lifetime stats included, and restore default
    /// settings.
    pub fn reset_all(&mut self) -> Result<(), CoreError> {
        let today = self.clock.local_date();
        let tx = self.store.transaction()?;
        tx.clear_daily()?;
        tx.put(keys::LIFETIME_STATS, &std::collections::BTreeMap::<String, u64>::new())?;
        tx.put(keys::SETTINGS, &Settings::default())?;
        tx.put(keys::LAST_RESET_DATE, &today)?;
        tx.commit()?;
        let at = self.clock.now();
        self.broadcast(Event::StatsChanged {
            daily_total_secs: 0,
            at,
        });
        Ok(())
    }

    /// Write a timestamped JSON backup of the whole persisted document.
    pub fn export(&self, dir: &Path) -> Result<PathBuf, CoreError> {
        Ok(self.store.export_to(dir, self.clock.local_date())?)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Commit a flush and run the reminder policy on the new total.
    ///
    /// Storage failures are not fatal to the loop: the flush's seconds
    /// are dropped (bounded by the tick interval) and the failure is
    /// logged.
    fn commit_flush(&mut self, flush: Flush) {
        let outcome = match aggregate::commit(
            &mut self.store,
            self.clock.as_ref(),
            &flush.hostname,
            flush.seconds,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!(
                    "dropping flush of {}s for {}: {e}",
                    flush.seconds,
                    flush.hostname
                );
                return;
            }
        };

        let at = self.clock.now();
        if outcome.rolled_over {
            self.broadcast(Event::DayRolledOver {
                date: self.clock.local_date(),
                at,
            });
        }
        self.broadcast(Event::StatsChanged {
            daily_total_secs: outcome.daily_total_secs,
            at,
        });

        if let Err(e) = self.evaluate_reminder(outcome.daily_total_secs) {
            log::warn!("reminder evaluation failed: {e}");
        }
    }

    fn evaluate_reminder(&mut self, daily_total_secs: u64) -> Result<(), CoreError> {
        let settings = self.store.settings()?;
        let tx = self.store.transaction()?;
        let mut state = tx.reminder_state()?;
        let fire = reminder::evaluate(&settings, daily_total_secs, &mut state);
        if fire.is_some() {
            // The watermark advances even if no subscriber is listening;
            // a stale reminder is never re-delivered.
            tx.put_reminder_state(&state)?;
        }
        tx.commit()?;
        if let Some(fire) = fire {
            let at = self.clock.now();
            self.broadcast(Event::ReminderDue {
                total_secs: fire.total_secs,
                interval_min: fire.interval_min,
                at,
            });
        }
        Ok(())
    }

    fn broadcast(&mut self, event: Event) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}
