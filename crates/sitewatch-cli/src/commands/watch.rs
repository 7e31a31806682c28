//! The tracking loop.
//!
//! Reads focus events from stdin, one JSON object per line, the way a
//! native-messaging host hands browser events to a local process:
//!
//! ```text
//! {"url": "https://example.com/page"}
//! {"focused": false}
//! ```
//!
//! The engine is ticked against a fixed one-second deadline that does
//! not reset when a line arrives, so accrued time is flushed in bounded
//! slices even while focus events stream in faster than the tick
//! period. Engine events (stats changes, reminders) are printed as JSON
//! lines for whatever is driving the process; reminder lines are
//! suppressed when notifications are disabled in settings.

use std::io::BufRead;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;
use sitewatch_core::{Engine, Event};

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct FocusLine {
    #[serde(default)]
    url: Option<String>,
    #[serde(default = "default_true")]
    focused: bool,
}

fn default_true() -> bool {
    true
}

/// Loop state: the engine plus the next flush deadline.
///
/// Kept separate from `run` so the deadline arithmetic and line
/// handling can be driven directly in tests.
struct WatchLoop {
    engine: Engine,
    next_tick: Instant,
}

impl WatchLoop {
    fn new(engine: Engine, now: Instant) -> Self {
        Self {
            engine,
            next_tick: now + TICK_PERIOD,
        }
    }

    fn handle_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match serde_json::from_str::<FocusLine>(line) {
            Ok(focus) => {
                if focus.focused {
                    self.engine.on_focus_changed(focus.url.as_deref());
                } else {
                    self.engine.on_focus_changed(None);
                }
            }
            Err(e) => log::warn!("ignoring malformed focus line: {e}"),
        }
    }

    /// Tick once the deadline has passed, however busy the line stream
    /// is. The next deadline is measured from `now`, not stacked, so a
    /// late tick does not burst into several.
    fn tick_if_due(&mut self, now: Instant) {
        if now >= self.next_tick {
            self.engine.tick();
            self.next_tick = now + TICK_PERIOD;
        }
    }

    fn time_until_tick(&self, now: Instant) -> Duration {
        self.next_tick.saturating_duration_since(now)
    }

    /// Whether an event should be printed given current settings.
    /// Reminder delivery is gated on `enable_notifications`; everything
    /// else always passes through.
    fn should_emit(&self, event: &Event) -> bool {
        match event {
            Event::ReminderDue { .. } => match self.engine.settings() {
                Ok(settings) => settings.enable_notifications,
                Err(_) => true,
            },
            _ => true,
        }
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::open()?;
    let events = engine.subscribe();
    let mut watch = WatchLoop::new(engine, Instant::now());

    let (line_tx, line_rx) = channel::<String>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    loop {
        watch.tick_if_due(Instant::now());
        match line_rx.recv_timeout(watch.time_until_tick(Instant::now())) {
            Ok(line) => watch.handle_line(&line),
            Err(RecvTimeoutError::Timeout) => watch.tick_if_due(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => break,
        }

        for event in events.try_iter() {
            if watch.should_emit(&event) {
                print_event(&event);
            }
        }
    }

    // Stdin closed: flush whatever is still accrued before exiting.
    watch.engine.pause();
    for event in events.try_iter() {
        if watch.should_emit(&event) {
            print_event(&event);
        }
    }
    Ok(())
}

fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(json) => println!("{json}"),
        Err(e) => log::warn!("failed to serialize event: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sitewatch_core::{ManualClock, Settings, Store};

    fn manual_clock() -> ManualClock {
        ManualClock::starting_at(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        )
    }

    fn watch_with_clock(clock: &ManualClock, base: Instant) -> WatchLoop {
        let engine = Engine::new(Store::open_memory().unwrap(), Box::new(clock.clone()));
        WatchLoop::new(engine, base)
    }

    #[test]
    fn busy_line_stream_does_not_starve_the_flush() {
        let clock = manual_clock();
        let base = Instant::now();
        let mut watch = watch_with_clock(&clock, base);

        watch.handle_line(r#"{"url": "https://example.com/a"}"#);
        // Same-hostname navigations every 500ms: each line is a tracker
        // no-op, but the deadline keeps passing and flushes accrual.
        for i in 1..=10u64 {
            clock.advance_secs(1);
            watch.handle_line(r#"{"url": "https://example.com/b"}"#);
            watch.tick_if_due(base + Duration::from_millis(500 * i));
        }

        // Ticks fired at 1s, 2s, ... of loop time; all ten engine
        // seconds are persisted, none stuck in the tracker.
        let stats = watch.engine.stats().unwrap();
        assert_eq!(stats.daily_stats["example.com"], 10);
    }

    #[test]
    fn tick_deadline_does_not_reset_on_lines() {
        let clock = manual_clock();
        let base = Instant::now();
        let mut watch = watch_with_clock(&clock, base);

        watch.handle_line(r#"{"url": "https://example.com/"}"#);
        clock.advance_secs(3);
        // 900ms of lines, then the deadline at 1s passes.
        watch.tick_if_due(base + Duration::from_millis(900));
        assert!(watch.engine.stats().unwrap().daily_stats.is_empty());
        watch.tick_if_due(base + Duration::from_millis(1000));
        assert_eq!(watch.engine.stats().unwrap().daily_stats["example.com"], 3);
    }

    #[test]
    fn late_tick_rebases_deadline_without_bursting() {
        let clock = manual_clock();
        let base = Instant::now();
        let mut watch = watch_with_clock(&clock, base);

        watch.handle_line(r#"{"url": "https://example.com/"}"#);
        clock.advance_secs(5);
        // Deadline long past: one tick, and the next deadline is a full
        // period from "now".
        watch.tick_if_due(base + Duration::from_secs(5));
        assert_eq!(watch.engine.stats().unwrap().daily_stats["example.com"], 5);
        assert_eq!(
            watch.time_until_tick(base + Duration::from_secs(5)),
            TICK_PERIOD
        );
    }

    #[test]
    fn malformed_lines_are_ignored() {
        let clock = manual_clock();
        let mut watch = watch_with_clock(&clock, Instant::now());
        watch.handle_line("not json at all");
        watch.handle_line("");
        assert!(!watch.engine.is_tracking());
    }

    #[test]
    fn unfocused_line_pauses_tracking() {
        let clock = manual_clock();
        let mut watch = watch_with_clock(&clock, Instant::now());
        watch.handle_line(r#"{"url": "https://example.com/"}"#);
        assert!(watch.engine.is_tracking());
        watch.handle_line(r#"{"focused": false}"#);
        assert!(!watch.engine.is_tracking());
    }

    #[test]
    fn reminder_lines_respect_notification_setting() {
        let clock = manual_clock();
        let base = Instant::now();
        let mut watch = watch_with_clock(&clock, base);
        watch
            .engine
            .update_settings(Settings {
                enable_notifications: false,
                ..Settings::default()
            })
            .unwrap();

        let reminder = Event::ReminderDue {
            total_secs: 900,
            interval_min: 15,
            at: clock_now(&clock),
        };
        let stats_changed = Event::StatsChanged {
            daily_total_secs: 900,
            at: clock_now(&clock),
        };
        assert!(!watch.should_emit(&reminder));
        assert!(watch.should_emit(&stats_changed));
    }

    fn clock_now(clock: &ManualClock) -> chrono::DateTime<chrono::Utc> {
        use sitewatch_core::Clock;
        clock.now()
    }
}
