//! Property-based tests for merging and slot classification using proptest.
//!
//! These verify invariants that hold for *any* interval set, not just the
//! hand-picked cases in `merge_tests.rs` and `slot_tests.rs`.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;
use schedule_engine::appointments::AppointmentBlock;
use schedule_engine::exceptions::ResolvedInterval;
use schedule_engine::merge::{merge, merge_blocks};
use schedule_engine::model::{AppointmentStatus, SourceId};
use schedule_engine::slots::{render_slots, SlotClass, SlotGrid};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()
}

fn midnight() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 4, 0, 0, 0).unwrap()
}

fn quarter(q: u32) -> DateTime<Utc> {
    midnight() + Duration::minutes(q as i64 * 15)
}

/// Intervals on quarter-hour boundaries within one UTC day, zero-length allowed.
fn arb_intervals() -> impl Strategy<Value = Vec<ResolvedInterval>> {
    prop::collection::vec((0u32..96, 0u32..16, any::<bool>(), 0usize..6), 0..12).prop_map(|raw| {
        raw.into_iter()
            .map(|(start, len, is_modified, id)| ResolvedInterval {
                date: day(),
                start: quarter(start),
                end: quarter((start + len).min(96)),
                source: SourceId::rule(format!("r{id}")),
                is_modified,
            })
            .collect()
    })
}

fn arb_appointments() -> impl Strategy<Value = Vec<AppointmentBlock>> {
    prop::collection::vec((0u32..96, 1u32..8), 0..4).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (start, len))| AppointmentBlock {
                id: format!("a{i}"),
                client_id: "client".to_string(),
                start: quarter(start),
                end: quarter((start + len).min(96)),
                appointment_type: "therapy".to_string(),
                status: AppointmentStatus::Scheduled,
            })
            .collect()
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

fn covered(intervals: &[ResolvedInterval], t: DateTime<Utc>) -> bool {
    intervals.iter().any(|i| i.start <= t && t < i.end)
}

// ---------------------------------------------------------------------------
// Property 1: Merge idempotence
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn merge_is_idempotent(intervals in arb_intervals()) {
        let once = merge(&intervals);
        let twice = merge_blocks(once.clone());
        prop_assert_eq!(once, twice);
    }
}

// ---------------------------------------------------------------------------
// Property 2: Merge is independent of input order
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn merge_ignores_input_order(
        (original, shuffled) in arb_intervals().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        prop_assert_eq!(merge(&original), merge(&shuffled));
    }
}

// ---------------------------------------------------------------------------
// Property 3: Blocks are sorted, non-empty, and separated by real gaps
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn blocks_are_sorted_and_disjoint(intervals in arb_intervals()) {
        let blocks = merge(&intervals);
        for block in &blocks {
            prop_assert!(block.start < block.end);
            prop_assert!(!block.source_ids.is_empty());
        }
        for pair in blocks.windows(2) {
            prop_assert!(pair[0].end < pair[1].start, "blocks touch or overlap: {:?}", pair);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: Merging preserves coverage exactly
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn merge_preserves_coverage(intervals in arb_intervals()) {
        let blocks = merge(&intervals);
        for q in 0..96 {
            let t = quarter(q);
            let in_block = blocks.iter().any(|b| b.contains(t));
            prop_assert_eq!(in_block, covered(&intervals, t), "coverage differs at {}", t);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: A slot is Available iff availability covers it and no
// appointment does
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn slot_classification_matches_coverage(
        intervals in arb_intervals(),
        appointments in arb_appointments(),
    ) {
        let grid = SlotGrid { start_hour: 0, end_hour: 24, step_minutes: 15 };
        let blocks = merge(&intervals);
        let slots = render_slots(&blocks, &appointments, &grid, day(), &Tz::UTC);
        prop_assert_eq!(slots.len(), 96);

        for slot in &slots {
            let booked = appointments.iter().any(|a| a.contains(slot.instant));
            let available = covered(&intervals, slot.instant) && !booked;
            prop_assert_eq!(slot.classification == SlotClass::Available, available);
            prop_assert_eq!(slot.classification == SlotClass::Booked, booked);
        }
    }
}
