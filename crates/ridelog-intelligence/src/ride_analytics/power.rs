// ABOUTME: Power-stream analysis: Normalized Power, pacing strategy, and best rolling efforts
// ABOUTME: Operates on 1 Hz power samples and returns None when the signal is too short
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use ridelog_core::constants::ride::{BEST_EFFORT_DURATIONS, MIN_PACING_SAMPLES, NP_ROLLING_WINDOW};
use ridelog_core::models::BestEfforts;
use serde::{Deserialize, Serialize};

use crate::statistics::{chunk_means, mean};

/// Second-half / first-half ratio above which a ride is a negative split
const NEGATIVE_SPLIT_RATIO: f64 = 1.03;
/// Ratio below which a ride is a positive split
const POSITIVE_SPLIT_RATIO: f64 = 0.97;
/// Ratio below which a ride is a heavy positive split
const HEAVY_POSITIVE_SPLIT_RATIO: f64 = 0.92;

/// Normalized Power: fourth root of the mean fourth power of the 30 s rolling average
///
/// Only full windows contribute, so at least 30 samples are required.
#[must_use]
pub fn normalized_power(power: &[f64]) -> Option<f64> {
    if power.len() < NP_ROLLING_WINDOW {
        return None;
    }

    let window = NP_ROLLING_WINDOW as f64;
    let mut rolling_sum: f64 = power[..NP_ROLLING_WINDOW].iter().sum();
    let mut fourth_power_sum = (rolling_sum / window).powi(4);
    let mut windows = 1_usize;

    for index in NP_ROLLING_WINDOW..power.len() {
        rolling_sum += power[index] - power[index - NP_ROLLING_WINDOW];
        fourth_power_sum += (rolling_sum / window).max(0.0).powi(4);
        windows += 1;
    }

    Some((fourth_power_sum / windows as f64).powf(0.25))
}

/// How output was distributed between the two halves of a ride
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingStrategy {
    /// Second half clearly stronger
    NegativeSplit,
    /// Halves within a few percent
    EvenSplit,
    /// Second half weaker
    PositiveSplit,
    /// Second half much weaker
    PositiveSplitHeavy,
}

impl PacingStrategy {
    /// Classify a second-half / first-half power ratio
    #[must_use]
    pub fn from_split_ratio(ratio: f64) -> Self {
        if ratio > NEGATIVE_SPLIT_RATIO {
            Self::NegativeSplit
        } else if ratio < HEAVY_POSITIVE_SPLIT_RATIO {
            Self::PositiveSplitHeavy
        } else if ratio < POSITIVE_SPLIT_RATIO {
            Self::PositiveSplit
        } else {
            Self::EvenSplit
        }
    }

    /// Stable identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NegativeSplit => "negative_split",
            Self::EvenSplit => "even_split",
            Self::PositiveSplit => "positive_split",
            Self::PositiveSplitHeavy => "positive_split_heavy",
        }
    }
}

/// Pacing analysis of a power stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingAnalysis {
    /// Classified strategy
    pub strategy: PacingStrategy,
    /// Second-half mean / first-half mean
    pub split_ratio: f64,
    /// Mean power of the first half
    pub first_half_power: f64,
    /// Mean power of the second half
    pub second_half_power: f64,
    /// Mean power of each quarter, in order
    pub quarter_power: Vec<f64>,
    /// (Q4 - Q1) / Q1 × 100; `None` when the first quarter averaged zero
    pub fade_percent: Option<f64>,
    /// Normalized Power of the whole stream
    pub normalized_power: Option<f64>,
}

/// Classify how power was distributed over the ride
///
/// Requires 120 samples and a positive first-half mean.
#[must_use]
pub fn analyze_pacing(power: &[f64]) -> Option<PacingAnalysis> {
    if power.len() < MIN_PACING_SAMPLES {
        return None;
    }

    let (first, second) = power.split_at(power.len() / 2);
    let first_half_power = mean(first)?;
    let second_half_power = mean(second)?;
    if first_half_power <= 0.0 {
        return None;
    }

    let quarter_power = chunk_means(power, 4)?;
    let q1 = quarter_power[0];
    let q4 = quarter_power[3];
    let fade_percent = (q1 > 0.0).then(|| (q4 - q1) / q1 * 100.0);

    let split_ratio = second_half_power / first_half_power;
    Some(PacingAnalysis {
        strategy: PacingStrategy::from_split_ratio(split_ratio),
        split_ratio,
        first_half_power,
        second_half_power,
        quarter_power,
        fade_percent,
        normalized_power: normalized_power(power),
    })
}

/// Highest mean power sustained over `duration_seconds` consecutive samples
#[must_use]
pub fn best_rolling_mean(power: &[f64], duration_seconds: usize) -> Option<f64> {
    if duration_seconds == 0 || power.len() < duration_seconds {
        return None;
    }

    let mut window_sum: f64 = power[..duration_seconds].iter().sum();
    let mut best = window_sum;
    for index in duration_seconds..power.len() {
        window_sum += power[index] - power[index - duration_seconds];
        best = best.max(window_sum);
    }
    Some(best / duration_seconds as f64)
}

/// Best efforts at the standard durations the stream is long enough for
#[must_use]
pub fn best_efforts(power: &[f64]) -> BestEfforts {
    BEST_EFFORT_DURATIONS
        .iter()
        .filter_map(|duration| {
            best_rolling_mean(power, *duration as usize).map(|watts| (*duration, watts))
        })
        .collect()
}
