//! Property-based tests for the free/busy engine

use super::*;
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

fn minutes(m: i64) -> DateTime<Utc> {
    base() + Duration::minutes(m)
}

/// Intervals within a two-day span, measured in minutes from `base()`
fn arb_range() -> impl Strategy<Value = TimeRange> {
    (0i64..2880, 0i64..600).prop_map(|(start, len)| TimeRange {
        start: minutes(start),
        end: minutes(start + len),
    })
}

fn arb_busy() -> impl Strategy<Value = Vec<TimeRange>> {
    prop::collection::vec(arb_range(), 0..20)
}

fn arb_window() -> impl Strategy<Value = TimeRange> {
    (0i64..1440, 1i64..1440).prop_map(|(start, len)| TimeRange {
        start: minutes(start),
        end: minutes(start + len),
    })
}

fn arb_min_duration() -> impl Strategy<Value = Duration> {
    (0i64..120).prop_map(Duration::minutes)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn merge_is_idempotent(busy in arb_busy()) {
        let once = merge_busy(&busy);
        let twice = merge_busy(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merged_runs_are_sorted_and_separated(busy in arb_busy()) {
        let merged = merge_busy(&busy);
        for pair in merged.windows(2) {
            prop_assert!(pair[0].end < pair[1].start);
        }
        for run in &merged {
            prop_assert!(run.start < run.end);
        }
    }

    #[test]
    fn busy_outside_window_yields_whole_window(
        window in arb_window(),
        busy in arb_busy(),
        min in arb_min_duration(),
    ) {
        let outside: Vec<TimeRange> = busy
            .into_iter()
            .filter(|b| b.end <= window.start || b.start >= window.end)
            .collect();
        let slots = compute_free_slots(&window, &outside, min);
        if window.duration() >= min {
            prop_assert_eq!(slots, vec![window]);
        } else {
            prop_assert!(slots.is_empty());
        }
    }

    #[test]
    fn busy_equal_to_window_yields_nothing(window in arb_window(), min in arb_min_duration()) {
        let slots = compute_free_slots(&window, &[window], min);
        prop_assert!(slots.is_empty());
    }

    #[test]
    fn slots_are_disjoint_non_adjacent_and_long_enough(
        window in arb_window(),
        busy in arb_busy(),
        min in arb_min_duration(),
    ) {
        let slots = compute_free_slots(&window, &busy, min);
        for slot in &slots {
            prop_assert!(slot.duration() >= min);
            prop_assert!(slot.start >= window.start && slot.end <= window.end);
        }
        for pair in slots.windows(2) {
            prop_assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn slots_never_overlap_busy(
        window in arb_window(),
        busy in arb_busy(),
        min in arb_min_duration(),
    ) {
        let slots = compute_free_slots(&window, &busy, min);
        for slot in &slots {
            for b in busy.iter().filter(|b| !b.is_empty()) {
                prop_assert!(!slot.overlaps(b));
            }
        }
    }

    #[test]
    fn output_is_deterministic(window in arb_window(), busy in arb_busy()) {
        let mut reversed = busy.clone();
        reversed.reverse();
        prop_assert_eq!(
            compute_free_slots(&window, &busy, Duration::zero()),
            compute_free_slots(&window, &reversed, Duration::zero())
        );
    }
}
