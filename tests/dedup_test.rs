// ABOUTME: Integration tests for cross-provider duplicate detection, takeover, and merge
// ABOUTME: Exercises matching tolerances, self-match guard, audit trail, and gap filling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Duration;
use common::{at, memory_stores, reported_ride, resolver};
use ridelog::errors::ErrorCode;
use ridelog::models::{ActivityData, Provider};
use ridelog::services::{DuplicateVerdict, Resolution};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_higher_priority_provider_takes_over() {
    let stores = memory_stores();
    let resolver = resolver(&stores);
    let athlete_id = Uuid::new_v4();
    let start = at(2025, 3, 11, 7, 0);

    let strava = reported_ride(athlete_id, Provider::Strava, "s-1", start, 40_000.0).build();
    stores.activities.upsert_activity(&strava).await.unwrap();

    let verdict = resolver
        .check_for_duplicate(
            athlete_id,
            start + Duration::minutes(2),
            Some(40_150.0),
            &Provider::Garmin,
            "g-1",
        )
        .await
        .unwrap();

    let found = verdict.matched().unwrap();
    assert_eq!(found.existing_activity_id, strava.id);
    assert_eq!(found.existing_provider, Provider::Strava);
    assert_eq!(found.time_difference_seconds, 120);
    assert_eq!(found.distance_difference_meters, Some(150.0));
    assert_eq!(found.resolution, Resolution::Takeover);
}

#[tokio::test]
async fn test_lower_or_equal_priority_merges() {
    let stores = memory_stores();
    let resolver = resolver(&stores);
    let athlete_id = Uuid::new_v4();
    let start = at(2025, 3, 11, 7, 0);

    let garmin = reported_ride(athlete_id, Provider::Garmin, "g-1", start, 40_000.0).build();
    stores.activities.upsert_activity(&garmin).await.unwrap();

    let from_strava = resolver
        .check_for_duplicate(athlete_id, start, Some(40_000.0), &Provider::Strava, "s-1")
        .await
        .unwrap();
    assert_eq!(from_strava.matched().unwrap().resolution, Resolution::Merge);

    let from_second_garmin = resolver
        .check_for_duplicate(athlete_id, start, Some(40_000.0), &Provider::Garmin, "g-2")
        .await
        .unwrap();
    assert_eq!(from_second_garmin.matched().unwrap().resolution, Resolution::Merge);
}

#[tokio::test]
async fn test_report_never_matches_itself() {
    let stores = memory_stores();
    let resolver = resolver(&stores);
    let athlete_id = Uuid::new_v4();
    let start = at(2025, 3, 11, 7, 0);

    let ride = reported_ride(athlete_id, Provider::Strava, "s-1", start, 40_000.0).build();
    stores.activities.upsert_activity(&ride).await.unwrap();

    let verdict = resolver
        .check_for_duplicate(athlete_id, start, Some(40_000.0), &Provider::Strava, "s-1")
        .await
        .unwrap();
    assert_eq!(verdict, DuplicateVerdict::Unique);
}

#[tokio::test]
async fn test_outside_tolerances_is_unique() {
    let stores = memory_stores();
    let resolver = resolver(&stores);
    let athlete_id = Uuid::new_v4();
    let start = at(2025, 3, 11, 7, 0);

    let ride = reported_ride(athlete_id, Provider::Strava, "s-1", start, 40_000.0).build();
    stores.activities.upsert_activity(&ride).await.unwrap();

    let too_far = resolver
        .check_for_duplicate(athlete_id, start, Some(41_000.0), &Provider::Garmin, "g-1")
        .await
        .unwrap();
    assert!(!too_far.is_duplicate());

    let too_late = resolver
        .check_for_duplicate(
            athlete_id,
            start + Duration::seconds(301),
            Some(40_000.0),
            &Provider::Garmin,
            "g-1",
        )
        .await
        .unwrap();
    assert!(!too_late.is_duplicate());

    // Exactly on the window edge still matches
    let on_edge = resolver
        .check_for_duplicate(
            athlete_id,
            start + Duration::seconds(300),
            Some(40_000.0),
            &Provider::Garmin,
            "g-1",
        )
        .await
        .unwrap();
    assert!(on_edge.is_duplicate());

    // Another athlete's ride never matches
    let other_athlete = resolver
        .check_for_duplicate(Uuid::new_v4(), start, Some(40_000.0), &Provider::Garmin, "g-1")
        .await
        .unwrap();
    assert!(!other_athlete.is_duplicate());
}

#[tokio::test]
async fn test_unknown_distance_matches_on_time_alone() {
    let stores = memory_stores();
    let resolver = resolver(&stores);
    let athlete_id = Uuid::new_v4();
    let start = at(2025, 3, 11, 7, 0);

    let ride = reported_ride(athlete_id, Provider::Strava, "s-1", start, 40_000.0).build();
    stores.activities.upsert_activity(&ride).await.unwrap();

    let verdict = resolver
        .check_for_duplicate(athlete_id, start, None, &Provider::Wahoo, "w-1")
        .await
        .unwrap();
    let found = verdict.matched().unwrap();
    assert!(found.distance_difference_meters.is_none());
    assert_eq!(found.resolution, Resolution::Takeover);
}

#[tokio::test]
async fn test_hidden_activities_still_match_and_closest_wins() {
    let stores = memory_stores();
    let resolver = resolver(&stores);
    let athlete_id = Uuid::new_v4();
    let start = at(2025, 3, 11, 7, 0);

    let hidden = reported_ride(athlete_id, Provider::Strava, "s-1", start, 40_000.0)
        .hidden(true)
        .build();
    let farther = reported_ride(
        athlete_id,
        Provider::Manual,
        "m-1",
        start - Duration::minutes(4),
        40_000.0,
    )
    .build();
    stores.activities.upsert_activity(&hidden).await.unwrap();
    stores.activities.upsert_activity(&farther).await.unwrap();

    let verdict = resolver
        .check_for_duplicate(
            athlete_id,
            start + Duration::seconds(30),
            Some(40_000.0),
            &Provider::Garmin,
            "g-1",
        )
        .await
        .unwrap();
    assert_eq!(verdict.matched().unwrap().existing_activity_id, hidden.id);
}

#[tokio::test]
async fn test_takeover_replaces_identity_and_keeps_audit_trail() {
    let stores = memory_stores();
    let resolver = resolver(&stores);
    let athlete_id = Uuid::new_v4();
    let start = at(2025, 3, 11, 7, 0);

    let ride = reported_ride(athlete_id, Provider::Strava, "s-1", start, 40_000.0)
        .average_power(180.0)
        .average_heart_rate(140.0)
        .build();
    stores.activities.upsert_activity(&ride).await.unwrap();

    let mut garmin = ActivityData {
        distance_meters: Some(40_120.0),
        average_power: Some(185.0),
        ..ActivityData::default()
    };
    garmin
        .source_fields
        .insert("device".to_owned(), json!("Edge 840"));

    let updated = resolver
        .takeover(ride.id, &garmin, &Provider::Garmin, "g-1")
        .await
        .unwrap();
    assert_eq!(updated.id, ride.id);
    assert_eq!(updated.provider, Provider::Garmin);
    assert_eq!(updated.provider_activity_id, "g-1");
    assert_eq!(updated.distance_meters, Some(40_120.0));
    assert_eq!(updated.average_power, Some(185.0));
    // Absent incoming fields keep their stored values
    assert_eq!(updated.average_heart_rate, Some(140.0));
    assert_eq!(updated.start_date, start);

    let original = updated.raw_payload.original_provider.as_ref().unwrap();
    assert_eq!(original.provider, Provider::Strava);
    assert_eq!(original.provider_activity_id, "s-1");
    assert_eq!(updated.raw_payload.takeover_history.len(), 1);
    assert_eq!(updated.raw_payload.source_fields["device"], json!("Edge 840"));

    // A second takeover keeps the very first provider as the original
    let twice = resolver
        .takeover(ride.id, &ActivityData::default(), &Provider::Other("coros".to_owned()), "c-1")
        .await
        .unwrap();
    assert_eq!(
        twice.raw_payload.original_provider.as_ref().unwrap().provider,
        Provider::Strava
    );
    assert_eq!(twice.raw_payload.takeover_history.len(), 2);
    assert_eq!(twice.raw_payload.takeover_history[1].from.provider, Provider::Garmin);

    let stored = stores.activities.get_activity(ride.id).await.unwrap().unwrap();
    assert_eq!(stored, twice);
}

#[tokio::test]
async fn test_merge_only_fills_gaps() {
    let stores = memory_stores();
    let resolver = resolver(&stores);
    let athlete_id = Uuid::new_v4();
    let start = at(2025, 3, 11, 7, 0);

    let ride = reported_ride(athlete_id, Provider::Garmin, "g-1", start, 40_000.0)
        .average_power(200.0)
        .build();
    stores.activities.upsert_activity(&ride).await.unwrap();

    let strava = ActivityData {
        distance_meters: Some(39_000.0),
        average_power: Some(150.0),
        average_heart_rate: Some(145.0),
        polyline: Some("abc123".to_owned()),
        ..ActivityData::default()
    };

    let merged = resolver
        .merge(ride.id, &strava, &Provider::Strava)
        .await
        .unwrap();
    assert_eq!(merged.provider, Provider::Garmin);
    assert_eq!(merged.distance_meters, Some(40_000.0));
    assert_eq!(merged.average_power, Some(200.0));
    assert_eq!(merged.average_heart_rate, Some(145.0));
    assert_eq!(merged.polyline.as_deref(), Some("abc123"));

    let payload = &merged.raw_payload;
    assert_eq!(payload.contributing_providers, vec![Provider::Strava]);
    assert_eq!(payload.merge_history.len(), 1);
    assert_eq!(
        payload.merge_history[0].fields_filled,
        vec!["average_heart_rate".to_owned(), "polyline".to_owned()]
    );

    // Merging the same provider again adds history but not a second contributor
    let again = resolver
        .merge(ride.id, &strava, &Provider::Strava)
        .await
        .unwrap();
    assert_eq!(again.raw_payload.contributing_providers.len(), 1);
    assert_eq!(again.raw_payload.merge_history.len(), 2);
    assert!(again.raw_payload.merge_history[1].fields_filled.is_empty());
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let stores = memory_stores();
    let resolver = resolver(&stores);

    let error = resolver
        .takeover(Uuid::new_v4(), &ActivityData::default(), &Provider::Garmin, "g-1")
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceNotFound);

    let error = resolver
        .merge(Uuid::new_v4(), &ActivityData::default(), &Provider::Strava)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceNotFound);
}
