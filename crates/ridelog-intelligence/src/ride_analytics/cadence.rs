// ABOUTME: Cadence distribution, coasting share, and power produced per cadence band
// ABOUTME: Zero cadence counts as coasting; only 0 < rpm < 250 counts as pedaling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use std::collections::BTreeMap;

use ridelog_core::constants::ride::{
    MAX_VALID_CADENCE, MIN_CADENCE_BIN_SAMPLES, MIN_CADENCE_SAMPLES,
};
use serde::{Deserialize, Serialize};

use super::fatigue::streams_comparable;
use crate::statistics::{mean, median, std_dev};

/// Distribution buckets: label and `[lower, upper)` rpm
const BUCKETS: [(&str, f64, f64); 6] = [
    ("<60", 0.0, 60.0),
    ("60-70", 60.0, 70.0),
    ("70-80", 70.0, 80.0),
    ("80-90", 80.0, 90.0),
    ("90-100", 90.0, 100.0),
    ("100+", 100.0, f64::INFINITY),
];

/// Width of the power-by-cadence bins
const POWER_BIN_RPM: f64 = 10.0;

/// Share of pedaling time in one cadence band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceBucket {
    /// Band label, e.g. `80-90`
    pub label: String,
    /// Pedaling samples in the band
    pub samples: usize,
    /// Share of pedaling samples
    pub percent: f64,
}

/// Mean power delivered within one 10 rpm bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadencePowerBin {
    /// Inclusive lower edge of the bin
    pub lower_rpm: u32,
    /// Mean power in the bin
    pub average_power: f64,
    /// Samples in the bin
    pub samples: usize,
}

/// Cadence analysis of a ride
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceAnalysis {
    /// Mean pedaling cadence
    pub average: f64,
    /// Highest pedaling cadence
    pub peak: f64,
    /// Median pedaling cadence
    pub median: f64,
    /// Zero-cadence share of all in-range samples
    pub coasting_percent: f64,
    /// Pedaling distribution over six bands
    pub distribution: Vec<CadenceBucket>,
    /// Standard deviation / mean of pedaling cadence
    pub coefficient_of_variation: f64,
    /// Populated bins only, ascending
    pub power_by_cadence: Vec<CadencePowerBin>,
}

fn is_pedaling(rpm: f64) -> bool {
    rpm > 0.0 && rpm < MAX_VALID_CADENCE
}

/// Analyze a cadence stream, optionally against a power stream of similar length
///
/// Requires 60 pedaling samples.
#[must_use]
pub fn analyze_cadence(cadence: &[f64], power: Option<&[f64]>) -> Option<CadenceAnalysis> {
    let pedaling: Vec<f64> = cadence.iter().copied().filter(|rpm| is_pedaling(*rpm)).collect();
    if pedaling.len() < MIN_CADENCE_SAMPLES {
        return None;
    }

    let in_range = cadence
        .iter()
        .filter(|rpm| (0.0..MAX_VALID_CADENCE).contains(*rpm))
        .count();
    let coasting = cadence.iter().filter(|rpm| **rpm == 0.0).count();

    let average = mean(&pedaling)?;
    let pedaling_total = pedaling.len() as f64;
    let distribution = BUCKETS
        .iter()
        .map(|(label, lower, upper)| {
            let samples = pedaling
                .iter()
                .filter(|rpm| **rpm >= *lower && **rpm < *upper)
                .count();
            CadenceBucket {
                label: (*label).to_owned(),
                samples,
                percent: samples as f64 / pedaling_total * 100.0,
            }
        })
        .collect();

    Some(CadenceAnalysis {
        average,
        peak: pedaling.iter().copied().fold(f64::MIN, f64::max),
        median: median(&pedaling)?,
        coasting_percent: coasting as f64 / in_range as f64 * 100.0,
        distribution,
        coefficient_of_variation: std_dev(&pedaling)? / average,
        power_by_cadence: power
            .filter(|watts| streams_comparable(cadence, watts))
            .map(|watts| power_by_cadence(cadence, watts))
            .unwrap_or_default(),
    })
}

fn power_by_cadence(cadence: &[f64], power: &[f64]) -> Vec<CadencePowerBin> {
    let mut bins: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for (rpm, watts) in cadence.iter().zip(power) {
        if !is_pedaling(*rpm) {
            continue;
        }
        let lower_rpm = ((rpm / POWER_BIN_RPM).floor() * POWER_BIN_RPM) as u32;
        let entry = bins.entry(lower_rpm).or_insert((0.0, 0));
        entry.0 += watts;
        entry.1 += 1;
    }

    bins.into_iter()
        .filter(|(_, (_, samples))| *samples >= MIN_CADENCE_BIN_SAMPLES)
        .map(|(lower_rpm, (total, samples))| CadencePowerBin {
            lower_rpm,
            average_power: total / samples as f64,
            samples,
        })
        .collect()
}
