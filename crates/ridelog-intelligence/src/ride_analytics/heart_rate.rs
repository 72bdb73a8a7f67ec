// ABOUTME: Heart-rate zone distribution and heart-rate-reserve intensity for a ride
// ABOUTME: Zones are percentages of max HR; samples outside 40-250 bpm are discarded
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use ridelog_core::constants::ride::{
    MAX_VALID_HEART_RATE, MIN_HEART_RATE_SAMPLES, MIN_VALID_HEART_RATE,
};
use ridelog_core::models::DEFAULT_RESTING_HEART_RATE;
use serde::{Deserialize, Serialize};

use crate::statistics::{mean, median};

/// Zone boundaries as percent of max HR: `[lower, upper)`
const ZONE_BOUNDS: [(f64, f64); 5] = [
    (0.0, 60.0),
    (60.0, 70.0),
    (70.0, 80.0),
    (80.0, 90.0),
    (90.0, 110.0),
];

/// Time spent in one heart-rate zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateZone {
    /// Zone number, 1-based
    pub zone: u8,
    /// Lower bound, percent of max HR (inclusive)
    pub lower_percent_max: f64,
    /// Upper bound, percent of max HR (exclusive)
    pub upper_percent_max: f64,
    /// Seconds in the zone
    pub seconds: usize,
    /// Share of valid samples in the zone
    pub percent: f64,
}

/// Heart-rate analysis of a ride
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateAnalysis {
    /// Five zones in ascending order
    pub zones: Vec<HeartRateZone>,
    /// Mean of valid samples
    pub average: f64,
    /// Highest valid sample
    pub peak: f64,
    /// Median of valid samples
    pub median: f64,
    /// Average as percent of heart-rate reserve
    pub average_reserve_percent: f64,
    /// Max HR the zones were computed against
    pub max_heart_rate: f64,
    /// Resting HR used for the reserve
    pub resting_heart_rate: f64,
    /// Number of samples inside the valid range
    pub valid_samples: usize,
}

/// Samples inside the physiologically plausible range
#[must_use]
pub fn valid_heart_rate(heart_rate: &[f64]) -> Vec<f64> {
    heart_rate
        .iter()
        .copied()
        .filter(|bpm| (MIN_VALID_HEART_RATE..=MAX_VALID_HEART_RATE).contains(bpm))
        .collect()
}

/// Zone distribution and reserve intensity
///
/// `max_heart_rate` falls back to the observed peak; `resting_heart_rate`
/// defaults to 50 bpm. Requires 60 valid samples and max HR above resting.
#[must_use]
pub fn analyze_heart_rate(
    heart_rate: &[f64],
    max_heart_rate: Option<f64>,
    resting_heart_rate: Option<f64>,
) -> Option<HeartRateAnalysis> {
    let valid = valid_heart_rate(heart_rate);
    if valid.len() < MIN_HEART_RATE_SAMPLES {
        return None;
    }

    let peak = valid.iter().copied().fold(f64::MIN, f64::max);
    let max_hr = max_heart_rate.filter(|bpm| *bpm > 0.0).unwrap_or(peak);
    let resting = resting_heart_rate
        .filter(|bpm| *bpm > 0.0)
        .unwrap_or(DEFAULT_RESTING_HEART_RATE);
    if max_hr <= resting {
        return None;
    }

    let mut seconds = [0_usize; 5];
    for bpm in &valid {
        let percent_max = bpm / max_hr * 100.0;
        if let Some(zone) = ZONE_BOUNDS
            .iter()
            .position(|(lower, upper)| percent_max >= *lower && percent_max < *upper)
        {
            seconds[zone] += 1;
        }
    }

    let total = valid.len() as f64;
    let zones = ZONE_BOUNDS
        .iter()
        .zip(seconds)
        .zip(1_u8..)
        .map(|(((lower, upper), zone_seconds), zone)| HeartRateZone {
            zone,
            lower_percent_max: *lower,
            upper_percent_max: *upper,
            seconds: zone_seconds,
            percent: zone_seconds as f64 / total * 100.0,
        })
        .collect();

    let average = mean(&valid)?;
    Some(HeartRateAnalysis {
        zones,
        average,
        peak,
        median: median(&valid)?,
        average_reserve_percent: (average - resting) / (max_hr - resting) * 100.0,
        max_heart_rate: max_hr,
        resting_heart_rate: resting,
        valid_samples: valid.len(),
    })
}
