use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use temporal_engine::{
    build_recurrence, expand_recurring_windows, resolve_instant, resolve_search_window, DayCode,
    DefaultTimePolicy, Frequency, OffsetUnit, PartialDateSpec, RecurrenceDescriptor,
    RecurrenceOptions,
};

const NOW: &str = "2024-06-01T09:00";

fn bench_instant(c: &mut Criterion) {
    let weekday = PartialDateSpec::new().with_iso_weekday(3).with_time("14:30");
    let offsets = PartialDateSpec::new()
        .with_offset(OffsetUnit::Month, 1)
        .with_offset(OffsetUnit::Day, 3)
        .with_offset(OffsetUnit::Hour, 2);

    c.bench_function("resolve_instant_weekday", |b| {
        b.iter(|| {
            resolve_instant(
                black_box(&weekday),
                NOW,
                "America/New_York",
                DefaultTimePolicy::Keep,
            )
        })
    });

    c.bench_function("resolve_instant_offsets", |b| {
        b.iter(|| {
            resolve_instant(
                black_box(&offsets),
                NOW,
                "Europe/Berlin",
                DefaultTimePolicy::Keep,
            )
        })
    });
}

fn bench_window(c: &mut Criterion) {
    let old = PartialDateSpec::new().with_day(10);
    let target = PartialDateSpec::new().with_offset(OffsetUnit::Week, 2);

    c.bench_function("resolve_search_window", |b| {
        b.iter(|| {
            resolve_search_window(Some(black_box(&old)), Some(black_box(&target)), NOW, "UTC")
        })
    });
}

fn bench_recurrence(c: &mut Criterion) {
    let weekly = RecurrenceDescriptor::new(Frequency::Weekly, 1)
        .with_week_days(&[DayCode::Mo, DayCode::We])
        .with_count(6);
    let monthly = RecurrenceDescriptor::new(Frequency::Monthly, 1)
        .with_week_days(&[DayCode::Fr])
        .with_month_days(&[13])
        .with_count(24)
        .with_start("2024-01-01T09:00");
    let daily = RecurrenceDescriptor::new(Frequency::Daily, 1).with_count(365);

    c.bench_function("build_recurrence_weekly", |b| {
        b.iter(|| build_recurrence(black_box(&weekly), "UTC"))
    });

    c.bench_function("build_recurrence_monthly_pattern", |b| {
        b.iter(|| build_recurrence(black_box(&monthly), "America/New_York"))
    });

    c.bench_function("expand_recurring_windows_daily_365", |b| {
        b.iter(|| {
            expand_recurring_windows(
                "2024-01-01T09:00",
                "2024-01-01T09:30",
                black_box(&daily),
                "UTC",
                &RecurrenceOptions::default(),
            )
        })
    });
}

criterion_group!(benches, bench_instant, bench_window, bench_recurrence);
criterion_main!(benches);
