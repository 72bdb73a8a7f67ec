// ABOUTME: Training Stress Score estimation for activities with or without power data
// ABOUTME: Trusts provider-declared stress, otherwise dispatches to running or cycling heuristics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use ridelog_core::models::Activity;
use serde::{Deserialize, Serialize};

/// Running base load per hour
const RUN_POINTS_PER_HOUR: f64 = 60.0;
/// Running climbing load: points per `RUN_CLIMB_METERS_PER_STEP`
const RUN_CLIMB_METERS_PER_STEP: f64 = 200.0;
/// Cycling base load per hour
const RIDE_POINTS_PER_HOUR: f64 = 50.0;
/// Cycling climbing load: points per `RIDE_CLIMB_METERS_PER_STEP`
const RIDE_CLIMB_METERS_PER_STEP: f64 = 300.0;
/// Points awarded per climbing step
const CLIMB_POINTS_PER_STEP: f64 = 10.0;
/// Divisor applied to kJ/hour when mechanical work is known
const KJ_PER_HOUR_DIVISOR: f64 = 1.2;
/// Average power the cycling duration heuristic is calibrated against
const BASELINE_POWER_WATTS: f64 = 150.0;
/// Clamp for the power scaling factor
const POWER_FACTOR_RANGE: (f64, f64) = (0.5, 1.8);
/// Trail terrain multiplier
const TRAIL_MULTIPLIER: f64 = 1.1;

/// Pace bands in min/km (upper bound, exclusive) with their intensity multipliers
///
/// Anything slower than the last bound is very easy running.
const PACE_BANDS: [(f64, f64); 6] = [
    (3.75, 1.6),
    (4.25, 1.4),
    (4.75, 1.2),
    (5.5, 1.0),
    (6.25, 0.85),
    (7.0, 0.7),
];
/// Multiplier for paces slower than every band
const EASY_PACE_MULTIPLIER: f64 = 0.55;

/// Heart-rate bands (lower bound, inclusive) with their intensity multipliers
const HEART_RATE_BANDS: [(f64, f64); 4] = [(175.0, 1.5), (160.0, 1.2), (145.0, 1.0), (130.0, 0.8)];

/// Which branch of the estimator produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressMethod {
    /// Provider-declared value trusted unmodified
    Declared,
    /// Running heuristic from pace, heart rate, and climbing
    Running,
    /// Cycling heuristic from mechanical work
    CyclingWork,
    /// Cycling heuristic from duration, climbing, and average power
    CyclingDuration,
    /// Duration unknown or zero
    NoDuration,
}

/// Stress points for one activity plus the branch that produced them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressEstimate {
    /// Dimensionless stress points
    pub stress: i64,
    /// Branch used
    pub method: StressMethod,
}

/// Converts one activity's summary metrics into a standardized stress score
#[derive(Debug, Clone, Copy, Default)]
pub struct StressEstimator;

impl StressEstimator {
    /// Estimate stress for an activity
    ///
    /// A positive provider-declared score wins. Otherwise the activity kind
    /// selects the running or cycling heuristic. Zero or unknown duration
    /// yields zero.
    #[must_use]
    pub fn estimate(activity: &Activity) -> StressEstimate {
        if let Some(declared) = activity
            .training_stress_score
            .filter(|tss| tss.is_finite() && *tss > 0.0)
        {
            return StressEstimate {
                stress: declared.round() as i64,
                method: StressMethod::Declared,
            };
        }

        let hours = match activity.duration_seconds() {
            Some(seconds) if seconds > 0 => seconds as f64 / 3600.0,
            _ => {
                return StressEstimate {
                    stress: 0,
                    method: StressMethod::NoDuration,
                }
            }
        };

        let (raw, method) = if activity.sport_type.is_run() {
            (Self::running_stress(activity, hours), StressMethod::Running)
        } else if let Some(kj) = activity.kilojoules.filter(|kj| *kj > 0.0) {
            ((kj / hours) / KJ_PER_HOUR_DIVISOR, StressMethod::CyclingWork)
        } else {
            (
                Self::cycling_duration_stress(activity, hours),
                StressMethod::CyclingDuration,
            )
        };

        StressEstimate {
            stress: raw.max(0.0).round() as i64,
            method,
        }
    }

    fn running_stress(activity: &Activity, hours: f64) -> f64 {
        let elevation = activity.elevation_gain.unwrap_or(0.0).max(0.0);
        let base = (elevation / RUN_CLIMB_METERS_PER_STEP)
            .mul_add(CLIMB_POINTS_PER_STEP, hours * RUN_POINTS_PER_HOUR);

        let pace_multiplier = activity
            .distance_meters
            .filter(|meters| *meters > 0.0)
            .map_or(1.0, |meters| {
                let pace_min_per_km = (hours * 60.0) / (meters / 1000.0);
                pace_multiplier(pace_min_per_km)
            });

        let multiplier = activity
            .average_heart_rate
            .and_then(heart_rate_multiplier)
            .map_or(pace_multiplier, |hr_multiplier| {
                pace_multiplier.max(hr_multiplier)
            });

        let terrain = if activity.sport_type.is_trail_run() {
            TRAIL_MULTIPLIER
        } else {
            1.0
        };

        base * multiplier * terrain
    }

    fn cycling_duration_stress(activity: &Activity, hours: f64) -> f64 {
        let elevation = activity.elevation_gain.unwrap_or(0.0).max(0.0);
        let base = (elevation / RIDE_CLIMB_METERS_PER_STEP)
            .mul_add(CLIMB_POINTS_PER_STEP, hours * RIDE_POINTS_PER_HOUR);

        let power_factor = activity
            .average_power
            .filter(|watts| *watts > 0.0)
            .map_or(1.0, |watts| {
                (watts / BASELINE_POWER_WATTS).clamp(POWER_FACTOR_RANGE.0, POWER_FACTOR_RANGE.1)
            });

        base * power_factor
    }
}

/// Intensity multiplier for a running pace in min/km
#[must_use]
pub fn pace_multiplier(pace_min_per_km: f64) -> f64 {
    PACE_BANDS
        .iter()
        .find(|(upper, _)| pace_min_per_km < *upper)
        .map_or(EASY_PACE_MULTIPLIER, |(_, multiplier)| *multiplier)
}

/// Intensity multiplier for an average heart rate, `None` below the lowest band
#[must_use]
pub fn heart_rate_multiplier(average_heart_rate: f64) -> Option<f64> {
    HEART_RATE_BANDS
        .iter()
        .find(|(lower, _)| average_heart_rate >= *lower)
        .map(|(_, multiplier)| *multiplier)
}

/// Stress points for an activity
#[must_use]
pub fn estimate_stress(activity: &Activity) -> i64 {
    StressEstimator::estimate(activity).stress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pace_band_edges() {
        assert!((pace_multiplier(3.5) - 1.6).abs() < f64::EPSILON);
        assert!((pace_multiplier(3.75) - 1.4).abs() < f64::EPSILON);
        assert!((pace_multiplier(5.0) - 1.0).abs() < f64::EPSILON);
        assert!((pace_multiplier(6.9) - 0.7).abs() < f64::EPSILON);
        assert!((pace_multiplier(9.0) - 0.55).abs() < f64::EPSILON);
    }

    #[test]
    fn test_heart_rate_bands() {
        assert_eq!(heart_rate_multiplier(180.0), Some(1.5));
        assert_eq!(heart_rate_multiplier(160.0), Some(1.2));
        assert_eq!(heart_rate_multiplier(150.0), Some(1.0));
        assert_eq!(heart_rate_multiplier(130.0), Some(0.8));
        assert_eq!(heart_rate_multiplier(120.0), None);
    }
}
