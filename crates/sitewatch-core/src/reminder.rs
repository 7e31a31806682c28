//! Break reminder policy.
//!
//! Eligibility is measured against the daily total, not wall-clock time:
//! the watermark records the daily total at the last firing, and a
//! reminder is due once the total has grown by a full interval. Time the
//! user spends away from the browser therefore never counts toward the
//! next reminder.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Persisted reminder bookkeeping; reset alongside the daily stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderState {
    /// Daily-total seconds at which the last reminder fired.
    pub last_reminder_at_secs: u64,
    pub reminders_fired_today: u32,
}

/// A reminder that became due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderFire {
    pub total_secs: u64,
    pub interval_min: u32,
}

/// Fire iff the daily total has advanced a full interval past the
/// watermark. On fire the watermark moves to the current total and the
/// daily counter increments.
pub fn evaluate(
    settings: &Settings,
    daily_total_secs: u64,
    state: &mut ReminderState,
) -> Option<ReminderFire> {
    let interval_secs = settings.effective_interval_secs();
    if daily_total_secs.saturating_sub(state.last_reminder_at_secs) < interval_secs {
        return None;
    }
    state.last_reminder_at_secs = daily_total_secs;
    state.reminders_fired_today += 1;
    Some(ReminderFire {
        total_secs: daily_total_secs,
        interval_min: settings.effective_interval_min(),
    })
}

/// Re-base the watermark to the current total. Called when the interval
/// changes mid-session, so the new interval is measured from "now" and
/// not from whenever the old interval last fired.
pub fn rebase(state: &mut ReminderState, daily_total_secs: u64) {
    state.last_reminder_at_secs = daily_total_secs;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_exactly_at_interval_boundary() {
        let settings = Settings::default(); // 15 min = 900s
        let mut state = ReminderState::default();

        assert_eq!(evaluate(&settings, 899, &mut state), None);
        let fire = evaluate(&settings, 900, &mut state).unwrap();
        assert_eq!(fire.total_secs, 900);
        assert_eq!(fire.interval_min, 15);
        assert_eq!(state.last_reminder_at_secs, 900);
        assert_eq!(state.reminders_fired_today, 1);

        assert_eq!(evaluate(&settings, 1799, &mut state), None);
        assert!(evaluate(&settings, 1800, &mut state).is_some());
        assert_eq!(state.reminders_fired_today, 2);
    }

    #[test]
    fn custom_interval_drives_eligibility() {
        let settings = Settings {
            custom_interval_min: Some(2),
            ..Settings::default()
        };
        let mut state = ReminderState::default();
        assert_eq!(evaluate(&settings, 119, &mut state), None);
        assert!(evaluate(&settings, 120, &mut state).is_some());
    }

    #[test]
    fn rebase_pushes_next_fire_out() {
        let settings = Settings::default();
        let mut state = ReminderState::default();
        rebase(&mut state, 500);
        assert_eq!(state.last_reminder_at_secs, 500);
        // 500 + 900 = 1400 is the earliest next firing.
        assert_eq!(evaluate(&settings, 1399, &mut state), None);
        assert!(evaluate(&settings, 1400, &mut state).is_some());
    }

    #[test]
    fn rebase_does_not_touch_fired_count() {
        let settings = Settings::default();
        let mut state = ReminderState::default();
        evaluate(&settings, 900, &mut state);
        rebase(&mut state, 950);
        assert_eq!(state.reminders_fired_today, 1);
    }

    #[test]
    fn watermark_above_total_never_underflows() {
        // Stale state: watermark ahead of a freshly reset total.
        let settings = Settings::default();
        let mut state = ReminderState {
            last_reminder_at_secs: 5_000,
            reminders_fired_today: 3,
        };
        assert_eq!(evaluate(&settings, 100, &mut state), None);
    }
}
