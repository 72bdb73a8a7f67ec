// ABOUTME: Criterion benchmarks for the analytics algorithms
// ABOUTME: Measures stress estimation, training load, and per-ride stream analysis
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

//! Criterion benchmarks for the analytics crate.
//!
//! Measures stress estimation over activity batches, the weekly training-load
//! recomputation, and the per-second stream analyses run at ingestion.

#![allow(clippy::missing_docs_in_private_items, missing_docs)]

use chrono::{Duration, NaiveDate, NaiveTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ridelog::intelligence::algorithms::{estimate_stress, DailyStressSeries};
use ridelog::intelligence::ride_analytics::{
    analyze_ride, best_efforts, normalized_power, RideContext, RideStreams,
};
use ridelog::models::{Activity, ActivityBuilder, Provider, SportType};
use uuid::Uuid;

/// Large history for stress testing (two years of daily activities)
const LARGE_HISTORY_SIZE: usize = 730;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).unwrap_or_default()
}

/// Deterministic mixed-sport history, one activity per day going back from `base_date`
#[allow(clippy::cast_possible_wrap)]
fn generate_history(count: usize) -> Vec<Activity> {
    let athlete_id = Uuid::new_v4();
    let start_of_day = base_date().and_time(NaiveTime::MIN).and_utc();
    (0..count)
        .map(|index| {
            let sport_type = match index % 4 {
                0 => SportType::Run,
                1 | 2 => SportType::Ride,
                _ => SportType::Swim,
            };
            let duration_seconds = 1800_u64 + ((index * 137) % 3600) as u64;
            let distance_meters = 5000.0 + ((index * 251) % 30_000) as f64;
            let start = start_of_day - Duration::days(index as i64) + Duration::hours(7);

            let builder = ActivityBuilder::new(
                athlete_id,
                Provider::Strava,
                format!("bench_{index}"),
                sport_type,
                start,
            )
            .moving_time_seconds(duration_seconds)
            .distance_meters(distance_meters)
            .average_heart_rate(130.0 + ((index * 17) % 40) as f64);

            if index % 3 == 1 {
                builder
                    .kilojoules(400.0 + ((index * 13) % 600) as f64)
                    .build()
            } else {
                builder.build()
            }
        })
        .collect()
}

/// Deterministic one-hour power/heart-rate/cadence streams with surges
fn generate_streams(seconds: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let power = (0..seconds)
        .map(|second| {
            let base = if (second / 60) % 5 == 0 { 340.0 } else { 210.0 };
            base + (second % 7) as f64
        })
        .collect();
    let heart_rate = (0..seconds)
        .map(|second| 135.0 + (second as f64 / seconds as f64) * 25.0)
        .collect();
    let cadence = (0..seconds)
        .map(|second| if second % 300 < 10 { 0.0 } else { 88.0 + (second % 11) as f64 })
        .collect();
    (power, heart_rate, cadence)
}

fn bench_stress_estimation(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress_estimation");
    let activities = generate_history(100);

    group.bench_function("single_activity", |b| {
        let activity = &activities[1];
        b.iter(|| estimate_stress(black_box(activity)));
    });

    group.throughput(Throughput::Elements(activities.len() as u64));
    group.bench_function("batch_100_activities", |b| {
        b.iter(|| {
            black_box(&activities)
                .iter()
                .map(estimate_stress)
                .sum::<i64>()
        });
    });

    group.finish();
}

fn bench_training_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("training_load");
    let end = base_date() + Duration::days(1);

    for count in [90, 365, LARGE_HISTORY_SIZE] {
        let activities = generate_history(count);
        let start = end - Duration::days(90);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::new("weekly_recompute", count),
            &activities,
            |b, activities| {
                b.iter(|| {
                    DailyStressSeries::from_activities(black_box(activities), start, end)
                        .training_load()
                });
            },
        );
    }

    group.finish();
}

fn bench_ride_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("ride_analysis");
    let context = RideContext {
        ftp: Some(260.0),
        max_heart_rate: Some(188.0),
        ..RideContext::default()
    };

    for seconds in [3600, 4 * 3600] {
        let (power, heart_rate, cadence) = generate_streams(seconds);
        group.throughput(Throughput::Elements(seconds as u64));

        group.bench_with_input(BenchmarkId::new("normalized_power", seconds), &power, |b, power| {
            b.iter(|| normalized_power(black_box(power)));
        });

        group.bench_with_input(BenchmarkId::new("best_efforts", seconds), &power, |b, power| {
            b.iter(|| best_efforts(black_box(power)));
        });

        group.bench_function(BenchmarkId::new("analyze_ride", seconds), |b| {
            b.iter(|| {
                analyze_ride(
                    black_box(
                        RideStreams::power(&power)
                            .with_heart_rate(&heart_rate)
                            .with_cadence(&cadence),
                    ),
                    &context,
                )
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_stress_estimation,
    bench_training_load,
    bench_ride_analysis
);
criterion_main!(benches);
