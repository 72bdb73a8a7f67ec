// ABOUTME: Mean-maximal power progression over sliding windows of dated best-effort tables
// ABOUTME: Samples trailing windows every 30 days and compares the latest against three samples back
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use chrono::{Duration, NaiveDate};
use ridelog_core::constants::ride::BEST_EFFORT_DURATIONS;
use ridelog_core::models::BestEfforts;
use serde::{Deserialize, Serialize};

use crate::statistics::mean;

/// Default trailing window length in days
pub const DEFAULT_MMP_WINDOW_DAYS: i64 = 90;
/// Days between window samples
pub const MMP_SAMPLE_STEP_DAYS: i64 = 30;
/// Samples between the latest window and the one it is compared against
const TREND_LOOKBACK_SAMPLES: usize = 3;
/// Mean percent change beyond which the overall direction is not stable
const DIRECTION_THRESHOLD_PERCENT: f64 = 2.0;

/// Best efforts from one ride, dated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedEfforts {
    /// Ride date
    pub date: NaiveDate,
    /// Ride's best-effort table
    pub efforts: BestEfforts,
}

/// Best power per duration over one trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MmpWindow {
    /// Last day of the window (inclusive)
    pub end: NaiveDate,
    /// Best efforts within the window
    pub best: BestEfforts,
}

/// Change at one duration between the compared windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationTrend {
    /// Effort duration in seconds
    pub duration_seconds: u32,
    /// Best power in the earlier window
    pub previous_watts: f64,
    /// Best power in the latest window
    pub latest_watts: f64,
    /// Latest minus previous, watts
    pub change_watts: f64,
    /// Latest minus previous, percent of previous
    pub change_percent: f64,
}

/// Overall movement of the power curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionDirection {
    /// Mean change above +2%
    Improving,
    /// Mean change within ±2%
    Stable,
    /// Mean change below -2%
    Declining,
}

/// Power-curve progression across the whole history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MmpProgression {
    /// Window length used
    pub window_days: i64,
    /// Sampled windows, oldest first
    pub windows: Vec<MmpWindow>,
    /// Per-duration change; empty with fewer than two windows
    pub trends: Vec<DurationTrend>,
    /// Overall direction; `None` when no duration could be compared
    pub direction: Option<ProgressionDirection>,
}

/// Sample trailing windows across the history and measure how the power curve moved
///
/// Window end dates step back from the latest ride every 30 days. The latest
/// window is compared against the one three samples earlier, or the earliest
/// window when the history is shorter. Returns `None` for an empty history.
#[must_use]
pub fn mmp_progression(history: &[DatedEfforts], window_days: i64) -> Option<MmpProgression> {
    let earliest = history.iter().map(|entry| entry.date).min()?;
    let latest = history.iter().map(|entry| entry.date).max()?;
    let window_days = window_days.max(1);

    let mut windows = Vec::new();
    let mut end = latest;
    while end >= earliest {
        windows.push(best_in_window(history, end, window_days));
        end = end - Duration::days(MMP_SAMPLE_STEP_DAYS);
    }
    windows.reverse();

    let trends = match windows.as_slice() {
        [] | [_] => Vec::new(),
        [.., last] => {
            let previous = &windows[windows.len().saturating_sub(TREND_LOOKBACK_SAMPLES + 1)];
            duration_trends(&previous.best, &last.best)
        }
    };

    let direction = mean(
        &trends
            .iter()
            .map(|trend| trend.change_percent)
            .collect::<Vec<_>>(),
    )
    .map(|average_change| {
        if average_change > DIRECTION_THRESHOLD_PERCENT {
            ProgressionDirection::Improving
        } else if average_change < -DIRECTION_THRESHOLD_PERCENT {
            ProgressionDirection::Declining
        } else {
            ProgressionDirection::Stable
        }
    });

    Some(MmpProgression {
        window_days,
        windows,
        trends,
        direction,
    })
}

fn best_in_window(history: &[DatedEfforts], end: NaiveDate, window_days: i64) -> MmpWindow {
    let start = end - Duration::days(window_days);
    let mut best = BestEfforts::new();
    for entry in history
        .iter()
        .filter(|entry| entry.date > start && entry.date <= end)
    {
        for duration in BEST_EFFORT_DURATIONS {
            if let Some(watts) = entry.efforts.get(duration) {
                best.record(duration, watts);
            }
        }
    }
    MmpWindow { end, best }
}

fn duration_trends(previous: &BestEfforts, latest: &BestEfforts) -> Vec<DurationTrend> {
    BEST_EFFORT_DURATIONS
        .iter()
        .filter_map(|duration| {
            let previous_watts = previous.get(*duration)?;
            let latest_watts = latest.get(*duration)?;
            let change_watts = latest_watts - previous_watts;
            Some(DurationTrend {
                duration_seconds: *duration,
                previous_watts,
                latest_watts,
                change_watts,
                change_percent: change_watts / previous_watts * 100.0,
            })
        })
        .collect()
}
