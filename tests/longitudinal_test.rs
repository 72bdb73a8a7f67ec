// ABOUTME: Integration tests for multi-activity analytics
// ABOUTME: FTP estimation, power-curve progression, monotony and strain, execution scoring
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{at, date, ride_with_stress};
use ridelog::intelligence::longitudinal::{
    analyze_monotony, classify_risk, estimate_ftp, estimate_ftp_from_best, mmp_progression,
    score_execution, DatedEfforts, ExecutionDimension, ExecutionRating, FtpRecommendation,
    ProgressionDirection, StrainTrend, WorkoutTargets, DEFAULT_MMP_WINDOW_DAYS,
};
use ridelog::models::{BestEfforts, RideMetricsSummary};
use ridelog_core::intelligence::{FtpConfidence, FtpEstimationMethod, OvertrainingRisk};
use uuid::Uuid;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn efforts(entries: &[(u32, f64)]) -> BestEfforts {
    entries.iter().copied().collect()
}

// ============================================================================
// FTP estimation
// ============================================================================

#[test]
fn test_ftp_from_twenty_minute_effort() {
    let estimate = estimate_ftp_from_best(&efforts(&[(1200, 300.0)]), None).unwrap();
    assert!(close(estimate.estimated_ftp, 285.0));
    assert_eq!(estimate.method, FtpEstimationMethod::TwentyMinute);
    assert_eq!(estimate.confidence, FtpConfidence::High);
    assert!(estimate.comparison.is_none());
}

#[test]
fn test_ftp_blends_hour_and_twenty_minute() {
    let estimate =
        estimate_ftp_from_best(&efforts(&[(1200, 250.0), (3600, 200.0)]), None).unwrap();
    // 0.4 × 237.5 + 0.6 × 200
    assert!(close(estimate.estimated_ftp, 215.0));
    assert_eq!(estimate.method, FtpEstimationMethod::Blended);
    assert_eq!(estimate.confidence, FtpConfidence::VeryHigh);
}

#[test]
fn test_ftp_falls_back_to_five_minute() {
    let estimate = estimate_ftp_from_best(&efforts(&[(5, 900.0), (300, 400.0)]), None).unwrap();
    assert!(close(estimate.estimated_ftp, 300.0));
    assert_eq!(estimate.method, FtpEstimationMethod::FiveMinute);
    assert_eq!(estimate.confidence, FtpConfidence::Moderate);

    assert!(estimate_ftp_from_best(&efforts(&[(60, 500.0)]), None).is_none());
}

#[test]
fn test_ftp_compared_with_declared() {
    let best = efforts(&[(1200, 300.0)]);

    let raise = estimate_ftp_from_best(&best, Some(250.0)).unwrap().comparison.unwrap();
    assert!(close(raise.delta_watts, 35.0));
    assert!(close(raise.delta_percent, 14.0));
    assert_eq!(raise.recommendation, FtpRecommendation::Raise);

    let keep = estimate_ftp_from_best(&best, Some(280.0)).unwrap().comparison.unwrap();
    assert_eq!(keep.recommendation, FtpRecommendation::Keep);

    let decline = estimate_ftp_from_best(&best, Some(330.0)).unwrap().comparison.unwrap();
    assert_eq!(decline.recommendation, FtpRecommendation::InvestigateDecline);

    // Non-positive declared FTP is treated as unknown
    assert!(estimate_ftp_from_best(&best, Some(0.0)).unwrap().comparison.is_none());
}

#[test]
fn test_ftp_takes_best_across_rides() {
    let tables = [
        efforts(&[(1200, 260.0), (300, 320.0)]),
        efforts(&[(1200, 300.0)]),
        efforts(&[(300, 350.0)]),
    ];
    let estimate = estimate_ftp(tables.iter(), None).unwrap();
    assert!(close(estimate.best_twenty_minute.unwrap(), 300.0));
    assert!(close(estimate.best_five_minute.unwrap(), 350.0));
    assert_eq!(estimate.method, FtpEstimationMethod::TwentyMinute);
}

// ============================================================================
// MMP progression
// ============================================================================

#[test]
fn test_mmp_progression_improving() {
    let history = vec![
        DatedEfforts {
            date: date(2025, 1, 1),
            efforts: efforts(&[(300, 300.0), (1200, 250.0)]),
        },
        DatedEfforts {
            date: date(2025, 4, 1),
            efforts: efforts(&[(300, 330.0), (1200, 275.0)]),
        },
    ];

    let progression = mmp_progression(&history, DEFAULT_MMP_WINDOW_DAYS).unwrap();
    assert_eq!(progression.windows.len(), 4);
    assert_eq!(progression.windows[0].end, date(2025, 1, 1));
    assert_eq!(progression.windows[3].end, date(2025, 4, 1));
    assert_eq!(progression.trends.len(), 2);
    assert!(progression
        .trends
        .iter()
        .all(|trend| close(trend.change_percent, 10.0)));
    assert_eq!(progression.direction, Some(ProgressionDirection::Improving));
}

#[test]
fn test_mmp_progression_short_history() {
    let history = vec![DatedEfforts {
        date: date(2025, 1, 1),
        efforts: efforts(&[(300, 300.0)]),
    }];
    let progression = mmp_progression(&history, DEFAULT_MMP_WINDOW_DAYS).unwrap();
    assert_eq!(progression.windows.len(), 1);
    assert!(progression.trends.is_empty());
    assert!(progression.direction.is_none());

    assert!(mmp_progression(&[], DEFAULT_MMP_WINDOW_DAYS).is_none());
}

// ============================================================================
// Monotony and strain
// ============================================================================

#[test]
fn test_identical_days_have_zero_monotony() {
    let analysis = analyze_monotony(&[100.0; 7]).unwrap();
    assert!(close(analysis.current.total_stress, 700.0));
    assert!(close(analysis.current.monotony, 0.0));
    assert!(close(analysis.current.strain, 0.0));
    assert_eq!(analysis.risk, OvertrainingRisk::Low);
    assert!(analysis.previous.is_none());
}

#[test]
fn test_strain_trend_over_two_weeks() {
    let mut daily = vec![100.0, 0.0, 100.0, 0.0, 100.0, 0.0, 100.0];
    daily.extend([200.0, 0.0, 200.0, 0.0, 200.0, 0.0, 200.0]);

    let analysis = analyze_monotony(&daily).unwrap();
    let previous = analysis.previous.unwrap();
    assert!(close(previous.total_stress, 400.0));
    assert!(close(analysis.current.total_stress, 800.0));
    assert!(close(analysis.current.monotony, previous.monotony));
    assert_eq!(analysis.strain_trend, Some(StrainTrend::Increasing));
    assert_eq!(analysis.risk, OvertrainingRisk::Low);
}

#[test]
fn test_uniform_heavy_week_is_high_risk() {
    let daily = [1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 900.0];
    let analysis = analyze_monotony(&daily).unwrap();
    assert!(analysis.current.monotony > 2.0);
    assert!(analysis.current.strain > 5000.0);
    assert_eq!(analysis.risk, OvertrainingRisk::High);

    assert_eq!(classify_risk(1.6, 100.0), OvertrainingRisk::Watch);
}

// ============================================================================
// Execution score
// ============================================================================

#[test]
fn test_execution_exact_match() {
    let planned = WorkoutTargets {
        duration_seconds: Some(3600.0),
        stress: Some(100.0),
        ..WorkoutTargets::default()
    };
    let score = score_execution(&planned, &planned).unwrap();
    assert!(close(score.score, 100.0));
    assert_eq!(score.rating, ExecutionRating::NailedIt);
    assert_eq!(score.dimensions.len(), 2);
}

#[test]
fn test_execution_half_done_and_unscored_dimensions() {
    let planned = WorkoutTargets {
        duration_seconds: Some(3600.0),
        stress: Some(100.0),
        intensity_factor: Some(0.85),
        distance_meters: Some(0.0),
    };
    let actual = WorkoutTargets {
        duration_seconds: Some(1800.0),
        stress: Some(50.0),
        intensity_factor: None,
        distance_meters: Some(20_000.0),
    };
    let score = score_execution(&planned, &actual).unwrap();
    assert!(close(score.score, 50.0));
    assert_eq!(score.rating, ExecutionRating::Deviated);
    assert!(score.dimensions.iter().all(|entry| matches!(
        entry.dimension,
        ExecutionDimension::Duration | ExecutionDimension::Stress
    )));

    assert!(score_execution(&WorkoutTargets::default(), &actual).is_none());
}

#[test]
fn test_execution_targets_from_activity() {
    let activity = ride_with_stress(Uuid::new_v4(), "r1", at(2025, 3, 10, 7, 0), 80.0)
        .distance_meters(30_000.0)
        .ride_metrics(RideMetricsSummary {
            intensity_factor: Some(0.8),
            ..RideMetricsSummary::default()
        })
        .build();

    let actual = WorkoutTargets::from_activity(&activity);
    assert_eq!(actual.duration_seconds, Some(3600.0));
    assert_eq!(actual.stress, Some(80.0));
    assert_eq!(actual.intensity_factor, Some(0.8));
    assert_eq!(actual.distance_meters, Some(30_000.0));
}
