//! # Sitewatch Core Library
//!
//! This library provides the core business logic for Sitewatch, a
//! per-hostname browsing-time tracker with periodic break reminders.
//! It implements a CLI-first philosophy where all operations are available
//! via a standalone CLI binary, with any GUI surface (popup, dashboard)
//! being a thin presentation layer over the same command interface.
//!
//! ## Architecture
//!
//! - **Tracker**: a wall-clock-based state machine that knows which
//!   hostname is active and since when; the caller feeds it focus events
//!   and periodically invokes `tick()` to flush accrued time
//! - **Aggregator**: folds flushed seconds into daily, hourly, and
//!   lifetime counters with lazy day-boundary resets
//! - **Reminder policy**: decides when the accumulated daily total crosses
//!   the configured interval and a break reminder is due
//! - **Storage**: SQLite-backed key-value store holding the whole
//!   persisted document (settings, counters, watermarks)
//!
//! ## Key Components
//!
//! - [`Engine`]: single owned instance tying tracker, aggregator,
//!   reminder policy, and store together behind a serialized command surface
//! - [`Store`]: durable key-value persistence
//! - [`Settings`]: user preferences (reminder interval, delivery toggles)
//! - [`Event`]: change notifications consumed by presentation adapters

pub mod aggregate;
pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod hostname;
pub mod reminder;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::Engine;
pub use error::{CoreError, SettingsError, StoreError};
pub use events::Event;
pub use hostname::hostname_of;
pub use reminder::{ReminderFire, ReminderState};
pub use settings::Settings;
pub use stats::StatsSnapshot;
pub use storage::Store;
pub use tracker::{Flush, Tracker};
