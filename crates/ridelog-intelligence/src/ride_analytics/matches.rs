// ABOUTME: Match-burning detection: sustained efforts strictly above a power threshold
// ABOUTME: Reports up to 20 matches chronologically plus a summary over every match found
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use ridelog_core::constants::ride::MAX_REPORTED_MATCHES;
use serde::{Deserialize, Serialize};

/// One continuous effort above threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEffort {
    /// Offset of the first sample from the start of the stream, in seconds
    pub start_offset_seconds: usize,
    /// Length of the effort in seconds
    pub duration_seconds: usize,
    /// Highest sample during the effort
    pub peak_power: f64,
    /// Mean power during the effort
    pub average_power: f64,
    /// Energy spent above threshold, in kJ
    pub work_above_threshold_kj: f64,
}

/// Totals over every detected match, including ones beyond the reported cap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Number of matches
    pub count: usize,
    /// Seconds spent in matches
    pub total_seconds: usize,
    /// kJ spent above threshold
    pub total_work_kj: f64,
    /// Mean match duration in seconds (0 when there are no matches)
    pub average_duration_seconds: f64,
    /// Highest sample across all matches
    pub peak_power: Option<f64>,
}

/// Match-burning analysis of a power stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    /// Threshold the stream was compared against, in watts
    pub threshold_watts: f64,
    /// Shortest run counted as a match, in seconds
    pub min_duration_seconds: usize,
    /// First matches in chronological order
    pub matches: Vec<MatchEffort>,
    /// Totals over all matches
    pub summary: MatchSummary,
}

/// Find runs of samples strictly above `threshold_watts` lasting at least `min_duration_seconds`
///
/// Returns `None` for an empty stream or a non-positive threshold.
#[must_use]
pub fn detect_matches(
    power: &[f64],
    threshold_watts: f64,
    min_duration_seconds: usize,
) -> Option<MatchAnalysis> {
    if power.is_empty() || threshold_watts <= 0.0 {
        return None;
    }

    let min_duration = min_duration_seconds.max(1);
    let mut efforts = Vec::new();
    let mut run_start: Option<usize> = None;

    for (index, watts) in power.iter().enumerate() {
        match (run_start, *watts > threshold_watts) {
            (None, true) => run_start = Some(index),
            (Some(start), false) => {
                push_effort(&mut efforts, power, start, index, threshold_watts, min_duration);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        push_effort(&mut efforts, power, start, power.len(), threshold_watts, min_duration);
    }

    let summary = summarize(&efforts);
    efforts.truncate(MAX_REPORTED_MATCHES);

    Some(MatchAnalysis {
        threshold_watts,
        min_duration_seconds: min_duration,
        matches: efforts,
        summary,
    })
}

fn push_effort(
    efforts: &mut Vec<MatchEffort>,
    power: &[f64],
    start: usize,
    end: usize,
    threshold_watts: f64,
    min_duration: usize,
) {
    let duration = end - start;
    if duration < min_duration {
        return;
    }
    let samples = &power[start..end];
    let total: f64 = samples.iter().sum();
    let peak_power = samples.iter().copied().fold(f64::MIN, f64::max);
    let joules_above: f64 = samples.iter().map(|watts| watts - threshold_watts).sum();

    efforts.push(MatchEffort {
        start_offset_seconds: start,
        duration_seconds: duration,
        peak_power,
        average_power: total / duration as f64,
        work_above_threshold_kj: joules_above / 1000.0,
    });
}

fn summarize(efforts: &[MatchEffort]) -> MatchSummary {
    let total_seconds: usize = efforts.iter().map(|effort| effort.duration_seconds).sum();
    let average_duration_seconds = if efforts.is_empty() {
        0.0
    } else {
        total_seconds as f64 / efforts.len() as f64
    };

    MatchSummary {
        count: efforts.len(),
        total_seconds,
        total_work_kj: efforts
            .iter()
            .map(|effort| effort.work_above_threshold_kj)
            .sum(),
        average_duration_seconds,
        peak_power: efforts
            .iter()
            .map(|effort| effort.peak_power)
            .reduce(f64::max),
    }
}
