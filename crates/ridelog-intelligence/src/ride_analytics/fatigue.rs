// ABOUTME: Fatigue resistance from late-ride power retention and optional cardiac drift
// ABOUTME: Compares last-quarter against first-quarter output over rides of ten minutes or more
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use ridelog_core::constants::ride::MIN_FATIGUE_SAMPLES;
use serde::{Deserialize, Serialize};

use crate::statistics::chunk_means;

/// Relative length difference tolerated between power and heart-rate streams
const STREAM_LENGTH_TOLERANCE: f64 = 0.10;

/// Qualitative band for the fatigue-resistance index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueRating {
    /// Index ≥ 0.98
    Excellent,
    /// Index ≥ 0.93
    Good,
    /// Index ≥ 0.85
    Moderate,
    /// Anything lower
    Poor,
}

impl FatigueRating {
    /// Band for a last/first quarter power ratio
    #[must_use]
    pub fn from_index(index: f64) -> Self {
        if index >= 0.98 {
            Self::Excellent
        } else if index >= 0.93 {
            Self::Good
        } else if index >= 0.85 {
            Self::Moderate
        } else {
            Self::Poor
        }
    }
}

/// Change in power-to-heart-rate ratio between the first and last quarter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardiacDrift {
    /// Watts per bpm over the first quarter
    pub first_quarter_ratio: f64,
    /// Watts per bpm over the last quarter
    pub last_quarter_ratio: f64,
    /// (last - first) / first × 100; negative when heart rate drifted up
    pub change_percent: f64,
}

/// Fatigue-resistance analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueAnalysis {
    /// Mean power of the last quarter / mean power of the first quarter
    pub fatigue_resistance_index: f64,
    /// Band for the index
    pub rating: FatigueRating,
    /// Mean power of the first quarter
    pub first_quarter_power: f64,
    /// Mean power of the last quarter
    pub last_quarter_power: f64,
    /// Mean power of each tenth of the ride
    pub decile_power: Vec<f64>,
    /// Present when a comparable heart-rate stream was supplied
    pub cardiac_drift: Option<CardiacDrift>,
}

/// Analyze how well power held up over the ride
///
/// Requires 600 samples and a positive first-quarter mean.
#[must_use]
pub fn analyze_fatigue(power: &[f64], heart_rate: Option<&[f64]>) -> Option<FatigueAnalysis> {
    if power.len() < MIN_FATIGUE_SAMPLES {
        return None;
    }

    let quarters = chunk_means(power, 4)?;
    let first_quarter_power = quarters[0];
    let last_quarter_power = quarters[3];
    if first_quarter_power <= 0.0 {
        return None;
    }

    let index = last_quarter_power / first_quarter_power;
    Some(FatigueAnalysis {
        fatigue_resistance_index: index,
        rating: FatigueRating::from_index(index),
        first_quarter_power,
        last_quarter_power,
        decile_power: chunk_means(power, 10)?,
        cardiac_drift: heart_rate.and_then(|hr| cardiac_drift(power, hr)),
    })
}

/// Whether two per-second streams cover roughly the same ride
#[must_use]
pub fn streams_comparable(reference: &[f64], other: &[f64]) -> bool {
    let tolerance = reference.len() as f64 * STREAM_LENGTH_TOLERANCE;
    (reference.len() as f64 - other.len() as f64).abs() <= tolerance
}

fn cardiac_drift(power: &[f64], heart_rate: &[f64]) -> Option<CardiacDrift> {
    if !streams_comparable(power, heart_rate) {
        return None;
    }
    let power_quarters = chunk_means(power, 4)?;
    let heart_rate_quarters = chunk_means(heart_rate, 4)?;
    if heart_rate_quarters[0] <= 0.0 || heart_rate_quarters[3] <= 0.0 {
        return None;
    }

    let first_quarter_ratio = power_quarters[0] / heart_rate_quarters[0];
    let last_quarter_ratio = power_quarters[3] / heart_rate_quarters[3];
    if first_quarter_ratio <= 0.0 {
        return None;
    }

    Some(CardiacDrift {
        first_quarter_ratio,
        last_quarter_ratio,
        change_percent: (last_quarter_ratio - first_quarter_ratio) / first_quarter_ratio * 100.0,
    })
}
