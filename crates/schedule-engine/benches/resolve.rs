//! Benchmarks for day and month resolution over a busy clinician's rows.

use std::hint::black_box;

use chrono::{Duration, NaiveDate};
use chrono_tz::America::Chicago;
use criterion::{criterion_group, criterion_main, Criterion};
use schedule_engine::model::{Appointment, AppointmentStatus, AvailabilityException, AvailabilityRule, DateRange};
use schedule_engine::{resolve_day_schedule, resolve_range_summary, EngineConfig, ScheduleInputs};

fn busy_clinician() -> ScheduleInputs {
    let month_start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    // Morning and afternoon blocks every weekday.
    let rules: Vec<AvailabilityRule> = (1..=5)
        .flat_map(|day| {
            [("08:00", "12:00"), ("13:00", "18:00")]
                .into_iter()
                .enumerate()
                .map(move |(i, (start, end))| AvailabilityRule {
                    id: format!("r{day}-{i}"),
                    clinician_id: "c1".to_string(),
                    day_of_week: day.to_string(),
                    start_time: start.to_string(),
                    end_time: end.to_string(),
                    is_active: true,
                })
        })
        .collect();

    let exceptions: Vec<AvailabilityException> = (0..30)
        .step_by(7)
        .map(|offset| AvailabilityException {
            id: format!("x{offset}"),
            clinician_id: "c1".to_string(),
            specific_date: month_start + Duration::days(offset),
            original_rule_id: None,
            start_time: Some("18:00".to_string()),
            end_time: Some("20:00".to_string()),
            is_deleted: false,
        })
        .collect();

    let appointments: Vec<Appointment> = (0..30)
        .flat_map(|offset| {
            let date = month_start + Duration::days(offset);
            (8..17).step_by(2).map(move |hour| Appointment {
                id: format!("a{offset}-{hour}"),
                clinician_id: "c1".to_string(),
                client_id: format!("p{hour}"),
                date,
                start_time: format!("{hour:02}:00"),
                end_time: format!("{hour:02}:50"),
                appointment_type: "individual".to_string(),
                status: AppointmentStatus::Scheduled,
            })
        })
        .collect();

    ScheduleInputs {
        rules,
        exceptions,
        single_dates: vec![],
        appointments,
    }
}

fn bench_resolution(c: &mut Criterion) {
    let inputs = busy_clinician();
    let config = EngineConfig::default();
    let day = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
    let month = DateRange::month_of(day);

    c.bench_function("resolve_day_schedule", |b| {
        b.iter(|| resolve_day_schedule(black_box(&inputs), day, &Chicago, &config))
    });

    c.bench_function("resolve_range_summary_month", |b| {
        b.iter(|| resolve_range_summary(black_box(&inputs), &month, &Chicago, &config))
    });
}

criterion_group!(benches, bench_resolution);
criterion_main!(benches);
