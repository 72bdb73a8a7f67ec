// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Quiet logging, in-memory stores, services, and activity builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `ridelog`

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use ridelog::config::{DedupConfig, SnapshotConfig};
use ridelog::database::{InMemoryStore, Stores};
use ridelog::models::{ActivityBuilder, Provider, SportType};
use ridelog::services::{DuplicateResolver, SnapshotService};
use std::sync::Once;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; quiet by default
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// UTC timestamp helper
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap()
}

/// Calendar date helper
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Fresh in-memory store bundle
pub fn memory_stores() -> Stores {
    init_test_logging();
    Stores::from_backend(InMemoryStore::new())
}

/// Snapshot service over a store bundle with default settings
pub fn snapshot_service(stores: &Stores) -> SnapshotService {
    SnapshotService::new(
        stores.activities.clone(),
        stores.snapshots.clone(),
        stores.preferences.clone(),
        SnapshotConfig::default(),
    )
}

/// Duplicate resolver over a store bundle with default tolerances
pub fn resolver(stores: &Stores) -> DuplicateResolver {
    DuplicateResolver::new(stores.activities.clone(), DedupConfig::default())
}

/// One-hour ride with a declared stress score
pub fn ride_with_stress(
    athlete_id: Uuid,
    provider_activity_id: &str,
    start: DateTime<Utc>,
    stress: f64,
) -> ActivityBuilder {
    ActivityBuilder::new(
        athlete_id,
        Provider::Strava,
        provider_activity_id,
        SportType::Ride,
        start,
    )
    .moving_time_seconds(3600)
    .training_stress_score(stress)
}

/// Ride with distance, reported by `provider`
pub fn reported_ride(
    athlete_id: Uuid,
    provider: Provider,
    provider_activity_id: &str,
    start: DateTime<Utc>,
    distance_meters: f64,
) -> ActivityBuilder {
    ActivityBuilder::new(
        athlete_id,
        provider,
        provider_activity_id,
        SportType::Ride,
        start,
    )
    .moving_time_seconds(3600)
    .distance_meters(distance_meters)
}
