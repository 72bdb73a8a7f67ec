// ABOUTME: Integration tests for the ingestion pipeline over in-memory stores
// ABOUTME: Stream analysis, create/takeover/merge/refresh decisions, execution scores, and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Duration;
use common::{at, date, memory_stores, resolver, snapshot_service};
use ridelog::database::{ActivityQuery, Stores};
use ridelog::errors::ErrorCode;
use ridelog::intelligence::longitudinal::WorkoutTargets;
use ridelog::models::{
    ActivityData, ActivityStreams, AthletePreferences, Provider, RideMetricsSummary, SportType,
};
use ridelog::services::{ActivityReport, IngestAction, IngestService};
use uuid::Uuid;

fn ingest_service(stores: &Stores) -> IngestService {
    IngestService::new(
        stores.activities.clone(),
        stores.preferences.clone(),
        resolver(stores),
        snapshot_service(stores),
    )
}

fn report(provider: Provider, id: &str, data: ActivityData) -> ActivityReport {
    ActivityReport {
        provider,
        provider_activity_id: id.to_owned(),
        data,
        streams: None,
        planned: None,
    }
}

fn ride_data(minutes_after: i64, distance_meters: f64) -> ActivityData {
    ActivityData {
        sport_type: Some(SportType::Ride),
        start_date: Some(at(2025, 3, 11, 7, 0) + Duration::minutes(minutes_after)),
        moving_time_seconds: Some(600),
        distance_meters: Some(distance_meters),
        ..ActivityData::default()
    }
}

#[tokio::test]
async fn test_streams_are_analysed_and_stored_metrics_kept() {
    let stores = memory_stores();
    let service = ingest_service(&stores);
    let athlete_id = Uuid::new_v4();
    stores
        .preferences
        .upsert_preferences(
            athlete_id,
            &AthletePreferences {
                ftp: Some(250.0),
                ..AthletePreferences::default()
            },
        )
        .await
        .unwrap();

    let mut strava = report(Provider::Strava, "s-1", ride_data(0, 10_000.0));
    strava.streams = Some(ActivityStreams {
        power: Some(vec![250.0; 600]),
        heart_rate: Some(vec![150.0; 600]),
        cadence: None,
    });

    let outcome = service.ingest(athlete_id, strava).await.unwrap();
    assert_eq!(outcome.action, IngestAction::Created);
    assert_eq!(outcome.week_start, date(2025, 3, 10));

    let stored = stores
        .activities
        .get_activity(outcome.activity_id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.streams.is_none());
    assert!((stored.normalized_power.unwrap() - 250.0).abs() < 1e-6);
    let metrics = stored.ride_metrics.as_ref().unwrap();
    assert!((metrics.intensity_factor.unwrap() - 1.0).abs() < 1e-6);
    assert!((metrics.efficiency_factor.unwrap() - 250.0 / 150.0).abs() < 1e-6);
    let efforts = stored.best_efforts.as_ref().unwrap();
    assert!(efforts.get(300).is_some());
    assert!(efforts.get(1200).is_none());

    let snapshot = stores
        .snapshots
        .get_snapshot(athlete_id, date(2025, 3, 10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.ride_count, 1);
    assert!(snapshot.avg_efficiency_factor.is_some());
}

#[tokio::test]
async fn test_same_ride_from_three_providers() {
    let stores = memory_stores();
    let service = ingest_service(&stores);
    let athlete_id = Uuid::new_v4();

    let created = service
        .ingest(athlete_id, report(Provider::Strava, "s-1", ride_data(0, 40_000.0)))
        .await
        .unwrap();
    assert_eq!(created.action, IngestAction::Created);

    let took_over = service
        .ingest(athlete_id, report(Provider::Garmin, "g-1", ride_data(1, 40_100.0)))
        .await
        .unwrap();
    assert_eq!(took_over.action, IngestAction::TookOver);
    assert_eq!(took_over.activity_id, created.activity_id);

    let mut manual_data = ride_data(2, 40_000.0);
    manual_data.average_heart_rate = Some(142.0);
    let merged = service
        .ingest(athlete_id, report(Provider::Manual, "m-1", manual_data))
        .await
        .unwrap();
    assert_eq!(merged.action, IngestAction::Merged);
    assert_eq!(merged.activity_id, created.activity_id);

    let canonical = stores
        .activities
        .get_activity(created.activity_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(canonical.provider, Provider::Garmin);
    assert_eq!(canonical.provider_activity_id, "g-1");
    assert_eq!(canonical.start_date, at(2025, 3, 11, 7, 1));
    assert_eq!(canonical.average_heart_rate, Some(142.0));
    assert_eq!(canonical.raw_payload.contributing_providers, vec![Provider::Manual]);

    let snapshot = stores
        .snapshots
        .get_snapshot(athlete_id, date(2025, 3, 10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.ride_count, 1);
}

#[tokio::test]
async fn test_resync_of_same_report_refreshes_in_place() {
    let stores = memory_stores();
    let service = ingest_service(&stores);
    let athlete_id = Uuid::new_v4();

    let mut data = ride_data(0, 40_000.0);
    data.training_stress_score = Some(80.0);
    let first = service
        .ingest(athlete_id, report(Provider::Garmin, "g-1", data.clone()))
        .await
        .unwrap();
    assert_eq!(first.action, IngestAction::Created);

    data.name = Some("Morning loop".to_owned());
    let second = service
        .ingest(athlete_id, report(Provider::Garmin, "g-1", data))
        .await
        .unwrap();
    assert_eq!(second.action, IngestAction::Refreshed);
    assert_eq!(second.activity_id, first.activity_id);

    let all = stores
        .activities
        .query_activities(
            &ActivityQuery::for_athlete(athlete_id)
                .include_hidden(true)
                .include_duplicates(true),
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name.as_deref(), Some("Morning loop"));
    assert!(all[0].raw_payload.merge_history.is_empty());
    assert!(all[0].raw_payload.takeover_history.is_empty());

    let snapshot = stores
        .snapshots
        .get_snapshot(athlete_id, date(2025, 3, 10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.weekly_tss, 80);
    assert_eq!(snapshot.ride_count, 1);
}

#[tokio::test]
async fn test_resync_after_takeover_merges_into_canonical() {
    let stores = memory_stores();
    let service = ingest_service(&stores);
    let athlete_id = Uuid::new_v4();

    let created = service
        .ingest(athlete_id, report(Provider::Strava, "s-1", ride_data(0, 40_000.0)))
        .await
        .unwrap();
    service
        .ingest(athlete_id, report(Provider::Garmin, "g-1", ride_data(1, 40_000.0)))
        .await
        .unwrap();

    // Strava no longer owns the record, so its re-sync only fills gaps
    let resync = service
        .ingest(athlete_id, report(Provider::Strava, "s-1", ride_data(0, 40_000.0)))
        .await
        .unwrap();
    assert_eq!(resync.action, IngestAction::Merged);
    assert_eq!(resync.activity_id, created.activity_id);

    let canonical = stores
        .activities
        .query_activities(&ActivityQuery::for_athlete(athlete_id))
        .await
        .unwrap();
    assert_eq!(canonical.len(), 1);
    assert_eq!(canonical[0].provider, Provider::Garmin);
}

#[tokio::test]
async fn test_resync_moving_a_ride_recomputes_both_weeks() {
    let stores = memory_stores();
    let service = ingest_service(&stores);
    let athlete_id = Uuid::new_v4();

    let mut data = ride_data(0, 40_000.0);
    data.training_stress_score = Some(80.0);
    service
        .ingest(athlete_id, report(Provider::Wahoo, "w-1", data.clone()))
        .await
        .unwrap();

    data.start_date = Some(at(2025, 3, 18, 7, 0));
    let moved = service
        .ingest(athlete_id, report(Provider::Wahoo, "w-1", data))
        .await
        .unwrap();
    assert_eq!(moved.action, IngestAction::Refreshed);
    assert_eq!(moved.week_start, date(2025, 3, 17));

    let old_week = stores
        .snapshots
        .get_snapshot(athlete_id, date(2025, 3, 10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(old_week.ride_count, 0);
    assert_eq!(old_week.weekly_tss, 0);

    let new_week = stores
        .snapshots
        .get_snapshot(athlete_id, date(2025, 3, 17))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(new_week.ride_count, 1);
    assert_eq!(new_week.weekly_tss, 80);
}

#[tokio::test]
async fn test_reported_execution_score_survives_stream_analysis() {
    let stores = memory_stores();
    let service = ingest_service(&stores);
    let athlete_id = Uuid::new_v4();

    let mut data = ride_data(0, 20_000.0);
    data.ride_metrics = Some(RideMetricsSummary {
        execution_score: Some(88.0),
        ..RideMetricsSummary::default()
    });
    let mut with_streams = report(Provider::Garmin, "g-7", data);
    with_streams.streams = Some(ActivityStreams {
        power: Some(vec![220.0; 600]),
        heart_rate: None,
        cadence: None,
    });

    let outcome = service.ingest(athlete_id, with_streams).await.unwrap();
    assert_eq!(outcome.execution_score, Some(88.0));

    let stored = stores
        .activities
        .get_activity(outcome.activity_id)
        .await
        .unwrap()
        .unwrap();
    let metrics = stored.ride_metrics.unwrap();
    assert_eq!(metrics.execution_score, Some(88.0));
    assert!(metrics.normalized_power.is_some());

    let snapshot = stores
        .snapshots
        .get_snapshot(athlete_id, date(2025, 3, 10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.avg_execution_score, Some(88.0));
}

#[tokio::test]
async fn test_planned_targets_are_scored_into_the_snapshot() {
    let stores = memory_stores();
    let service = ingest_service(&stores);
    let athlete_id = Uuid::new_v4();

    // Ten minutes ridden against a twenty-minute plan
    let mut planned_ride = report(Provider::Garmin, "g-8", ride_data(0, 20_000.0));
    planned_ride.planned = Some(WorkoutTargets {
        duration_seconds: Some(1200.0),
        ..WorkoutTargets::default()
    });

    let outcome = service.ingest(athlete_id, planned_ride).await.unwrap();
    let score = outcome.execution_score.unwrap();
    assert!((score - 50.0).abs() < 1e-9);

    let stored = stores
        .activities
        .get_activity(outcome.activity_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.ride_metrics.and_then(|metrics| metrics.execution_score),
        Some(score)
    );

    let snapshot = stores
        .snapshots
        .get_snapshot(athlete_id, date(2025, 3, 10))
        .await
        .unwrap()
        .unwrap();
    assert!((snapshot.avg_execution_score.unwrap() - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_report_without_start_or_sport_is_rejected() {
    let stores = memory_stores();
    let service = ingest_service(&stores);
    let athlete_id = Uuid::new_v4();

    let mut no_start = ride_data(0, 40_000.0);
    no_start.start_date = None;
    let error = service
        .ingest(athlete_id, report(Provider::Strava, "s-1", no_start))
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);

    let mut no_sport = ride_data(0, 40_000.0);
    no_sport.sport_type = None;
    let error = service
        .ingest(athlete_id, report(Provider::Strava, "s-2", no_sport))
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
}

#[test]
fn test_report_json_shape() {
    let json = r#"[
        {
            "provider": "Garmin",
            "provider_activity_id": "g-9",
            "sport_type": "ride",
            "start_date": "2025-03-11T07:00:00Z",
            "distance_meters": 40000.0,
            "streams": { "power": [200.0, 210.0], "heart_rate": null, "cadence": null }
        }
    ]"#;

    let reports: Vec<ActivityReport> = serde_json::from_str(json).unwrap();
    assert_eq!(reports.len(), 1);
    let parsed = &reports[0];
    assert_eq!(parsed.provider, Provider::Garmin);
    assert_eq!(parsed.data.sport_type, Some(SportType::Ride));
    assert_eq!(parsed.data.start_date, Some(at(2025, 3, 11, 7, 0)));
    assert_eq!(parsed.data.distance_meters, Some(40_000.0));
    assert!(parsed.data.average_power.is_none());
    assert_eq!(parsed.streams.as_ref().unwrap().power.as_ref().unwrap().len(), 2);
}

#[test]
fn test_provider_sport_labels_and_plan_parse() {
    let json = r#"[
        {
            "provider": "strava",
            "provider_activity_id": "s-10",
            "sport_type": "VirtualRide",
            "start_date": "2025-03-11T07:00:00Z",
            "planned": { "duration_seconds": 3600.0, "stress": 70.0 }
        },
        {
            "provider": "garmin",
            "provider_activity_id": "g-10",
            "sport_type": "TrailRun",
            "start_date": "2025-03-12T07:00:00Z"
        },
        {
            "provider": "garmin",
            "provider_activity_id": "g-11",
            "sport_type": "Kayaking",
            "start_date": "2025-03-13T07:00:00Z"
        }
    ]"#;

    let reports: Vec<ActivityReport> = serde_json::from_str(json).unwrap();
    assert_eq!(reports[0].data.sport_type, Some(SportType::VirtualRide));
    let planned = reports[0].planned.unwrap();
    assert_eq!(planned.duration_seconds, Some(3600.0));
    assert_eq!(planned.stress, Some(70.0));
    assert!(planned.intensity_factor.is_none());
    assert_eq!(reports[1].data.sport_type, Some(SportType::TrailRun));
    assert!(reports[1].planned.is_none());
    assert_eq!(
        reports[2].data.sport_type,
        Some(SportType::Other("Kayaking".to_owned()))
    );
}
