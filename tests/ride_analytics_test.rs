// ABOUTME: Integration tests for per-ride stream analytics
// ABOUTME: NP/VI, pacing, match burning, fatigue resistance, HR zones, cadence, composite analysis
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use ridelog::intelligence::ride_analytics::{
    analyze_cadence, analyze_fatigue, analyze_heart_rate, analyze_pacing, analyze_ride,
    best_efforts, best_rolling_mean, detect_matches, normalized_power, FatigueRating,
    PacingStrategy, RideContext, RideStreams,
};
use ridelog::models::{ActivityStreams, AthletePreferences};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_flat_power_normalized_equals_average() {
    let power = vec![250.0; 600];
    assert!(close(normalized_power(&power).unwrap(), 250.0));

    let analysis = analyze_ride(RideStreams::power(&power), &RideContext::default()).unwrap();
    assert!(close(analysis.variability_index.unwrap(), 1.0));
    assert!(close(analysis.average_power.unwrap(), 250.0));
    assert!(analysis.intensity_factor.is_none());
}

#[test]
fn test_normalized_power_weights_surges() {
    let mut surging = Vec::new();
    for _ in 0..10 {
        surging.extend(vec![400.0; 30]);
        surging.extend(vec![100.0; 30]);
    }
    let np = normalized_power(&surging).unwrap();
    assert!(np > 250.0);
    assert!(normalized_power(&surging[..29]).is_none());
}

#[test]
fn test_increasing_power_is_negative_split() {
    let power: Vec<f64> = (0..3600)
        .map(|second| 0.05f64.mul_add(f64::from(second), 100.0))
        .collect();
    let pacing = analyze_pacing(&power).unwrap();
    assert_eq!(pacing.strategy, PacingStrategy::NegativeSplit);
    assert_eq!(pacing.strategy.as_str(), "negative_split");
    assert!(pacing.first_half_power < pacing.second_half_power);
    assert_eq!(pacing.quarter_power.len(), 4);
    assert!(pacing.fade_percent.unwrap() > 0.0);
}

#[test]
fn test_pacing_bands() {
    assert_eq!(PacingStrategy::from_split_ratio(1.0), PacingStrategy::EvenSplit);
    assert_eq!(PacingStrategy::from_split_ratio(0.95), PacingStrategy::PositiveSplit);
    assert_eq!(PacingStrategy::from_split_ratio(0.90), PacingStrategy::PositiveSplitHeavy);
    assert!(analyze_pacing(&[200.0; 119]).is_none());
    assert!(analyze_pacing(&[0.0; 600]).is_none());
}

#[test]
fn test_single_match_above_threshold() {
    let mut power = vec![0.0; 20];
    power.extend(vec![300.0; 30]);
    power.extend(vec![0.0; 20]);

    let analysis = detect_matches(&power, 250.0, 10).unwrap();
    assert_eq!(analysis.summary.count, 1);
    let effort = &analysis.matches[0];
    assert_eq!(effort.start_offset_seconds, 20);
    assert_eq!(effort.duration_seconds, 30);
    assert!(close(effort.peak_power, 300.0));
    assert!(close(effort.work_above_threshold_kj, 1.5));
    assert!(close(analysis.summary.total_work_kj, 1.5));
}

#[test]
fn test_short_surges_are_not_matches() {
    let mut power = vec![200.0; 30];
    power.extend(vec![400.0; 5]);
    power.extend(vec![200.0; 30]);
    let analysis = detect_matches(&power, 250.0, 10).unwrap();
    assert_eq!(analysis.summary.count, 0);
    assert!(analysis.summary.peak_power.is_none());

    assert!(detect_matches(&[], 250.0, 10).is_none());
    assert!(detect_matches(&power, 0.0, 10).is_none());
}

#[test]
fn test_match_list_is_capped_but_summary_is_not() {
    let mut power = Vec::new();
    for _ in 0..25 {
        power.extend(vec![300.0; 12]);
        power.extend(vec![100.0; 5]);
    }
    let analysis = detect_matches(&power, 250.0, 10).unwrap();
    assert_eq!(analysis.summary.count, 25);
    assert_eq!(analysis.summary.total_seconds, 300);
    assert_eq!(analysis.matches.len(), 20);
    assert_eq!(analysis.matches[0].start_offset_seconds, 0);
    assert_eq!(analysis.matches[1].start_offset_seconds, 17);
}

#[test]
fn test_fatigue_resistance_and_cardiac_drift() {
    let mut power = vec![250.0; 300];
    power.extend(vec![200.0; 300]);
    let heart_rate = vec![150.0; 600];

    let fatigue = analyze_fatigue(&power, Some(heart_rate.as_slice())).unwrap();
    assert!(close(fatigue.fatigue_resistance_index, 0.8));
    assert_eq!(fatigue.rating, FatigueRating::Poor);
    assert_eq!(fatigue.decile_power.len(), 10);
    let drift = fatigue.cardiac_drift.unwrap();
    assert!(close(drift.change_percent, -20.0));

    // Heart-rate stream far shorter than power is not comparable
    let short_hr = vec![150.0; 300];
    let fatigue = analyze_fatigue(&power, Some(short_hr.as_slice())).unwrap();
    assert!(fatigue.cardiac_drift.is_none());

    assert!(analyze_fatigue(&power[..599], None).is_none());
    assert_eq!(FatigueRating::from_index(0.99), FatigueRating::Excellent);
    assert_eq!(FatigueRating::from_index(0.95), FatigueRating::Good);
    assert_eq!(FatigueRating::from_index(0.90), FatigueRating::Moderate);
}

#[test]
fn test_heart_rate_zones() {
    let mut heart_rate = vec![110.0; 60];
    heart_rate.extend(vec![150.0; 60]);
    heart_rate.extend(vec![230.0; 60]);
    heart_rate.extend(vec![20.0; 10]);

    let analysis = analyze_heart_rate(&heart_rate, Some(200.0), Some(60.0)).unwrap();
    assert_eq!(analysis.valid_samples, 180);
    assert_eq!(analysis.zones.len(), 5);
    assert_eq!(analysis.zones[0].seconds, 60);
    assert_eq!(analysis.zones[2].seconds, 60);
    // 115% of max falls outside every zone
    let counted: usize = analysis.zones.iter().map(|zone| zone.seconds).sum();
    assert_eq!(counted, 120);
    assert!(close(analysis.peak, 230.0));
    assert!(close(analysis.median, 150.0));
    assert!(close(analysis.average, 490.0 / 3.0));
}

#[test]
fn test_heart_rate_defaults_and_guards() {
    let heart_rate = vec![150.0; 60];
    let analysis = analyze_heart_rate(&heart_rate, None, None).unwrap();
    assert!(close(analysis.max_heart_rate, 150.0));
    assert!(close(analysis.resting_heart_rate, 50.0));
    assert_eq!(analysis.zones[4].seconds, 60);

    assert!(analyze_heart_rate(&heart_rate[..59], None, None).is_none());
    assert!(analyze_heart_rate(&heart_rate, Some(45.0), Some(60.0)).is_none());
}

#[test]
fn test_cadence_distribution_and_power_bins() {
    let mut cadence = vec![85.0; 100];
    cadence.extend(vec![95.0; 100]);
    cadence.extend(vec![0.0; 50]);
    let mut power = vec![200.0; 100];
    power.extend(vec![260.0; 100]);
    power.extend(vec![0.0; 50]);

    let analysis = analyze_cadence(&cadence, Some(power.as_slice())).unwrap();
    assert!(close(analysis.average, 90.0));
    assert!(close(analysis.coasting_percent, 20.0));
    assert_eq!(analysis.distribution.len(), 6);
    assert_eq!(analysis.distribution[3].label, "80-90");
    assert!(close(analysis.distribution[3].percent, 50.0));
    assert_eq!(analysis.power_by_cadence.len(), 2);
    assert_eq!(analysis.power_by_cadence[1].lower_rpm, 90);
    assert!(close(analysis.power_by_cadence[1].average_power, 260.0));
}

#[test]
fn test_best_efforts_use_sliding_window() {
    let mut power = vec![200.0; 400];
    power[100..105].copy_from_slice(&[900.0; 5]);
    assert!(close(best_rolling_mean(&power, 5).unwrap(), 900.0));
    assert!(best_rolling_mean(&power, 0).is_none());
    assert!(best_rolling_mean(&power, 401).is_none());

    let efforts = best_efforts(&power);
    assert!(close(efforts.get(5).unwrap(), 900.0));
    assert!(efforts.get(60).is_some());
    assert!(efforts.get(300).is_some());
    assert!(efforts.get(1200).is_none());
}

#[test]
fn test_composite_analysis_with_all_signals() {
    let power = vec![250.0; 600];
    let heart_rate = vec![150.0; 600];
    let cadence = vec![90.0; 600];
    let streams = ActivityStreams {
        power: Some(power),
        heart_rate: Some(heart_rate),
        cadence: Some(cadence),
    };
    let preferences = AthletePreferences {
        ftp: Some(250.0),
        ..AthletePreferences::default()
    };

    let analysis = analyze_ride(
        RideStreams::from(&streams),
        &RideContext::from_preferences(&preferences),
    )
    .unwrap();
    assert!(close(analysis.intensity_factor.unwrap(), 1.0));
    assert!(close(analysis.efficiency_factor.unwrap(), 250.0 / 150.0));
    assert_eq!(analysis.matches.as_ref().unwrap().summary.count, 0);
    assert_eq!(analysis.fatigue.as_ref().unwrap().rating, FatigueRating::Excellent);
    assert!(analysis.heart_rate.is_some());
    assert!(analysis.cadence.is_some());

    let summary = analysis.summary();
    assert!(close(summary.normalized_power.unwrap(), 250.0));
    assert!(close(summary.fatigue_resistance_index.unwrap(), 1.0));
    assert!(summary.execution_score.is_none());
}

#[test]
fn test_critical_power_overrides_match_threshold() {
    let mut power = vec![200.0; 600];
    power[100..130].copy_from_slice(&[270.0; 30]);
    let context = RideContext {
        ftp: Some(300.0),
        ..RideContext::default()
    };
    let by_ftp = analyze_ride(RideStreams::power(&power), &context).unwrap();
    assert_eq!(by_ftp.matches.unwrap().summary.count, 0);

    let by_cp =
        analyze_ride(RideStreams::power(&power), &context.with_critical_power(250.0)).unwrap();
    assert_eq!(by_cp.matches.unwrap().summary.count, 1);
}

#[test]
fn test_nothing_computable_is_none() {
    assert!(analyze_ride(RideStreams::default(), &RideContext::default()).is_none());
    assert!(analyze_ride(RideStreams::power(&[0.0; 10]), &RideContext::default()).is_none());
}
