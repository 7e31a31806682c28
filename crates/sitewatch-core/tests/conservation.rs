//! Property tests over the aggregator's counters.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use sitewatch_core::storage::keys;
use sitewatch_core::{aggregate, ManualClock, Store};

fn hostname_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "example.com".to_string(),
        "other.org".to_string(),
        "news.site.net".to_string(),
        "mail.example.com".to_string(),
    ])
}

proptest! {
    /// For any sequence of commits within one day,
    /// `daily_total_secs == sum(daily_stats.values())`.
    #[test]
    fn daily_total_equals_sum_of_daily_stats(
        commits in prop::collection::vec((hostname_strategy(), 0u64..500), 1..40)
    ) {
        let mut store = Store::open_memory().unwrap();
        let clock = ManualClock::starting_at(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );

        for (hostname, seconds) in &commits {
            aggregate::commit(&mut store, &clock, hostname, *seconds).unwrap();
            clock.advance_secs(60); // Stays well within the same day.
        }

        let daily: BTreeMap<String, u64> = store.get(keys::DAILY_STATS).unwrap().unwrap();
        let total: u64 = store.get(keys::DAILY_TOTAL_SECS).unwrap().unwrap();
        prop_assert_eq!(total, daily.values().sum::<u64>());
        prop_assert_eq!(total, commits.iter().map(|(_, s)| s).sum::<u64>());
    }

    /// Lifetime counters never decrease across commits, day boundaries
    /// included.
    #[test]
    fn lifetime_is_monotonic(
        commits in prop::collection::vec(
            (hostname_strategy(), 0u64..500, 0i64..48 * 3600),
            1..30,
        )
    ) {
        let mut store = Store::open_memory().unwrap();
        let clock = ManualClock::starting_at(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );

        let mut previous: BTreeMap<String, u64> = BTreeMap::new();
        for (hostname, seconds, gap) in &commits {
            clock.advance_secs(*gap); // May cross one or more midnights.
            aggregate::commit(&mut store, &clock, hostname, *seconds).unwrap();

            let lifetime: BTreeMap<String, u64> =
                store.get(keys::LIFETIME_STATS).unwrap().unwrap();
            for (host, &secs) in &previous {
                prop_assert!(lifetime.get(host).copied().unwrap_or(0) >= secs);
            }
            previous = lifetime;
        }
    }

    /// Per host, lifetime is always at least the daily figure.
    #[test]
    fn lifetime_dominates_daily(
        commits in prop::collection::vec((hostname_strategy(), 0u64..500), 1..40)
    ) {
        let mut store = Store::open_memory().unwrap();
        let clock = ManualClock::starting_at(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );

        for (hostname, seconds) in &commits {
            aggregate::commit(&mut store, &clock, hostname, *seconds).unwrap();
        }

        let daily: BTreeMap<String, u64> = store.get(keys::DAILY_STATS).unwrap().unwrap();
        let lifetime: BTreeMap<String, u64> = store.get(keys::LIFETIME_STATS).unwrap().unwrap();
        for (host, &secs) in &daily {
            prop_assert!(lifetime[host] >= secs);
        }
    }
}
