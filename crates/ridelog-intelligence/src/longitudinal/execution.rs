// ABOUTME: Workout execution score comparing a planned session with what was ridden
// ABOUTME: Weighted per-dimension agreement over duration, stress, intensity, and distance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use ridelog_core::models::Activity;
use serde::{Deserialize, Serialize};

use crate::algorithms::estimate_stress;

/// Targets of a planned session; absent or non-positive targets are not scored
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkoutTargets {
    /// Duration in seconds
    pub duration_seconds: Option<f64>,
    /// Stress points
    pub stress: Option<f64>,
    /// Intensity factor
    pub intensity_factor: Option<f64>,
    /// Distance in meters
    pub distance_meters: Option<f64>,
}

impl WorkoutTargets {
    /// What a completed activity actually delivered
    #[must_use]
    pub fn from_activity(activity: &Activity) -> Self {
        Self {
            duration_seconds: activity.duration_seconds().map(|seconds| seconds as f64),
            stress: Some(estimate_stress(activity) as f64),
            intensity_factor: activity
                .ride_metrics
                .as_ref()
                .and_then(|metrics| metrics.intensity_factor),
            distance_meters: activity.distance_meters,
        }
    }
}

/// A scored aspect of the workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionDimension {
    /// Time
    Duration,
    /// Stress points
    Stress,
    /// Intensity factor
    Intensity,
    /// Distance
    Distance,
}

impl ExecutionDimension {
    /// Relative weight in the overall score
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Duration | Self::Stress => 3.0,
            Self::Intensity => 2.0,
            Self::Distance => 1.0,
        }
    }
}

/// Execution band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionRating {
    /// Score ≥ 90
    NailedIt,
    /// Score ≥ 75
    Good,
    /// Score ≥ 60
    Acceptable,
    /// Score ≥ 40
    Deviated,
    /// Anything lower
    Missed,
}

impl ExecutionRating {
    /// Band for a 0-100 score
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::NailedIt
        } else if score >= 75.0 {
            Self::Good
        } else if score >= 60.0 {
            Self::Acceptable
        } else if score >= 40.0 {
            Self::Deviated
        } else {
            Self::Missed
        }
    }
}

/// Agreement on one dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Which aspect
    pub dimension: ExecutionDimension,
    /// Planned value
    pub planned: f64,
    /// Delivered value
    pub actual: f64,
    /// min / max × 100
    pub score: f64,
}

/// Overall execution of a planned session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionScore {
    /// Weighted 0-100 score
    pub score: f64,
    /// Band
    pub rating: ExecutionRating,
    /// Dimensions that were scored
    pub dimensions: Vec<DimensionScore>,
}

/// Score how closely `actual` matched `planned`
///
/// Returns `None` when no dimension has both a positive plan and an actual value.
#[must_use]
pub fn score_execution(
    planned: &WorkoutTargets,
    actual: &WorkoutTargets,
) -> Option<ExecutionScore> {
    let pairs = [
        (ExecutionDimension::Duration, planned.duration_seconds, actual.duration_seconds),
        (ExecutionDimension::Stress, planned.stress, actual.stress),
        (ExecutionDimension::Intensity, planned.intensity_factor, actual.intensity_factor),
        (ExecutionDimension::Distance, planned.distance_meters, actual.distance_meters),
    ];

    let dimensions: Vec<DimensionScore> = pairs
        .into_iter()
        .filter_map(|(dimension, planned, actual)| {
            let planned = planned.filter(|value| *value > 0.0)?;
            let actual = actual?.max(0.0);
            Some(DimensionScore {
                dimension,
                planned,
                actual,
                score: planned.min(actual) / planned.max(actual) * 100.0,
            })
        })
        .collect();

    if dimensions.is_empty() {
        return None;
    }

    let (weighted, weights) = dimensions.iter().fold((0.0, 0.0), |(sum, weights), entry| {
        let weight = entry.dimension.weight();
        (entry.score.mul_add(weight, sum), weights + weight)
    });
    let score = weighted / weights;

    Some(ExecutionScore {
        score,
        rating: ExecutionRating::from_score(score),
        dimensions,
    })
}
