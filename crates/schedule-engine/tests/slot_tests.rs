//! Tests for slot grid classification and boundary flags.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::America::New_York;
use schedule_engine::appointments::AppointmentBlock;
use schedule_engine::merge::TimeBlock;
use schedule_engine::model::{AppointmentStatus, SourceId};
use schedule_engine::slots::{render_slots, RenderSlot, SlotClass, SlotGrid};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()
}

/// Wall-clock time on 2024-06-04 in New York (EDT, UTC-4) as a UTC instant.
fn local(hour: u32, min: u32) -> DateTime<Utc> {
    New_York
        .with_ymd_and_hms(2024, 6, 4, hour, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn block(start: (u32, u32), end: (u32, u32)) -> TimeBlock {
    TimeBlock {
        start: local(start.0, start.1),
        end: local(end.0, end.1),
        source_ids: vec![SourceId::rule("r1")],
        is_modified: false,
    }
}

fn appointment(id: &str, start: (u32, u32), end: (u32, u32)) -> AppointmentBlock {
    AppointmentBlock {
        id: id.to_string(),
        client_id: "client-1".to_string(),
        start: local(start.0, start.1),
        end: local(end.0, end.1),
        appointment_type: "individual".to_string(),
        status: AppointmentStatus::Scheduled,
    }
}

fn slot_at(slots: &[RenderSlot], hour: u32, min: u32) -> &RenderSlot {
    let instant = local(hour, min);
    slots
        .iter()
        .find(|s| s.instant == instant)
        .unwrap_or_else(|| panic!("no slot at {hour:02}:{min:02}"))
}

fn render(blocks: &[TimeBlock], appointments: &[AppointmentBlock]) -> Vec<RenderSlot> {
    render_slots(blocks, appointments, &SlotGrid::default(), tuesday(), &New_York)
}

// ── Classification ──────────────────────────────────────────────────────────

#[test]
fn default_grid_renders_32_slots_from_six_to_ten() {
    let slots = render(&[], &[]);
    assert_eq!(slots.len(), 32);
    assert_eq!(slots[0].instant, local(6, 0));
    assert_eq!(slots[31].instant, local(21, 30));
    assert!(slots.iter().all(|s| s.classification == SlotClass::Unavailable));
}

#[test]
fn appointment_takes_precedence_over_availability() {
    let slots = render(&[block((9, 0), (10, 0))], &[appointment("a1", (9, 30), (10, 0))]);

    assert_eq!(slot_at(&slots, 9, 0).classification, SlotClass::Available);
    assert_eq!(slot_at(&slots, 9, 30).classification, SlotClass::Booked);
    assert_eq!(slot_at(&slots, 9, 30).appointment_id.as_deref(), Some("a1"));
    assert_eq!(slot_at(&slots, 10, 0).classification, SlotClass::Unavailable);
}

#[test]
fn appointment_outside_availability_is_still_booked() {
    let slots = render(&[], &[appointment("a1", (15, 0), (16, 0))]);
    assert_eq!(slot_at(&slots, 15, 0).classification, SlotClass::Booked);
    assert_eq!(slot_at(&slots, 15, 30).classification, SlotClass::Booked);
    assert_eq!(slot_at(&slots, 16, 0).classification, SlotClass::Unavailable);
}

#[test]
fn overlapping_appointments_last_one_wins() {
    let slots = render(
        &[],
        &[appointment("early", (10, 0), (11, 0)), appointment("late", (10, 30), (11, 30))],
    );
    assert_eq!(slot_at(&slots, 10, 0).appointment_id.as_deref(), Some("early"));
    assert_eq!(slot_at(&slots, 10, 30).appointment_id.as_deref(), Some("late"));
    assert_eq!(slot_at(&slots, 11, 0).appointment_id.as_deref(), Some("late"));
}

// ── Boundary flags ──────────────────────────────────────────────────────────

#[test]
fn aligned_block_flags_first_and_last_slot() {
    let slots = render(&[block((9, 0), (12, 0))], &[]);

    assert!(slot_at(&slots, 9, 0).is_block_start);
    assert!(!slot_at(&slots, 9, 0).is_block_end);
    assert!(!slot_at(&slots, 10, 30).is_block_start);
    assert!(!slot_at(&slots, 10, 30).is_block_end);
    assert!(slot_at(&slots, 11, 30).is_block_end);
    assert_eq!(slot_at(&slots, 11, 30).block_index, Some(0));
    assert_eq!(slot_at(&slots, 12, 0).block_index, None);
}

#[test]
fn off_grid_block_boundaries_flag_nearest_slots() {
    // 09:15–11:00: 09:00 is outside, 09:30 is the first covered slot.
    let slots = render(&[block((9, 15), (11, 0))], &[]);

    assert_eq!(slot_at(&slots, 9, 0).classification, SlotClass::Unavailable);
    assert!(slot_at(&slots, 9, 30).is_block_start);
    assert!(!slot_at(&slots, 10, 0).is_block_start);
    assert!(!slot_at(&slots, 10, 0).is_block_end);
    assert!(slot_at(&slots, 10, 30).is_block_end);
}

#[test]
fn single_slot_block_is_both_start_and_end() {
    let slots = render(&[block((14, 0), (14, 30))], &[]);
    let slot = slot_at(&slots, 14, 0);
    assert!(slot.is_block_start);
    assert!(slot.is_block_end);
}

#[test]
fn block_index_points_at_owning_block() {
    let slots = render(&[block((9, 0), (10, 0)), block((13, 0), (14, 0))], &[]);
    assert_eq!(slot_at(&slots, 9, 30).block_index, Some(0));
    assert_eq!(slot_at(&slots, 13, 30).block_index, Some(1));
}

#[test]
fn appointment_start_and_end_flags() {
    let slots = render(&[], &[appointment("a1", (9, 0), (10, 30))]);
    assert!(slot_at(&slots, 9, 0).is_appointment_start);
    assert!(!slot_at(&slots, 9, 30).is_appointment_start);
    assert!(!slot_at(&slots, 9, 30).is_appointment_end);
    assert!(slot_at(&slots, 10, 0).is_appointment_end);
}

// ── DST ─────────────────────────────────────────────────────────────────────

#[test]
fn spring_forward_grid_collapses_missing_hour() {
    // 2024-03-10: 02:00 and 02:30 do not exist; both shift onto 03:00.
    let grid = SlotGrid { start_hour: 0, end_hour: 6, step_minutes: 30 };
    let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let slots = render_slots(&[], &[], &grid, date, &New_York);

    assert_eq!(grid.times().len(), 12);
    assert_eq!(slots.len(), 10);
    assert_eq!(slots[4].instant, Utc.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).unwrap());
    for pair in slots.windows(2) {
        assert!(pair[0].instant < pair[1].instant);
    }
}
