// ABOUTME: Training monotony and strain (Foster) with an overtraining-risk classification
// ABOUTME: Uses the trailing 7 days, plus the week before for a strain trend when available
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use ridelog_core::intelligence::OvertrainingRisk;
use serde::{Deserialize, Serialize};

use crate::statistics::{mean, std_dev};

const WEEK_DAYS: usize = 7;
/// Monotony above which training is considered too uniform
const HIGH_MONOTONY: f64 = 2.0;
/// Monotony above which the athlete should watch variety
const WATCH_MONOTONY: f64 = 1.5;
/// Strain above which risk is high when monotony is also high
const HIGH_STRAIN: f64 = 5000.0;
/// Strain above which risk is at least moderate
const MODERATE_STRAIN: f64 = 4000.0;
/// Relative week-over-week strain change treated as stable
const STRAIN_TREND_BAND: f64 = 0.10;

/// Monotony and strain for one 7-day block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMonotony {
    /// Sum of daily stress
    pub total_stress: f64,
    /// Mean / population standard deviation; 0 when every day is identical
    pub monotony: f64,
    /// Total stress × monotony
    pub strain: f64,
}

impl WeeklyMonotony {
    fn from_days(days: &[f64]) -> Option<Self> {
        let average = mean(days)?;
        let deviation = std_dev(days)?;
        let monotony = if deviation > 0.0 {
            average / deviation
        } else {
            0.0
        };
        let total_stress: f64 = days.iter().sum();
        Some(Self {
            total_stress,
            monotony,
            strain: total_stress * monotony,
        })
    }
}

/// Week-over-week strain movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrainTrend {
    /// More than 10% above last week
    Increasing,
    /// Within ±10% of last week
    Stable,
    /// More than 10% below last week
    Decreasing,
}

/// Monotony/strain analysis of the trailing days
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonotonyAnalysis {
    /// Last 7 days
    pub current: WeeklyMonotony,
    /// Risk classification for the last 7 days
    pub risk: OvertrainingRisk,
    /// The 7 days before, when at least 14 days were supplied
    pub previous: Option<WeeklyMonotony>,
    /// Current vs previous strain
    pub strain_trend: Option<StrainTrend>,
}

/// Classify overtraining risk from monotony and strain
#[must_use]
pub fn classify_risk(monotony: f64, strain: f64) -> OvertrainingRisk {
    if monotony > HIGH_MONOTONY && strain > HIGH_STRAIN {
        OvertrainingRisk::High
    } else if monotony > HIGH_MONOTONY || strain > MODERATE_STRAIN {
        OvertrainingRisk::Moderate
    } else if monotony > WATCH_MONOTONY {
        OvertrainingRisk::Watch
    } else {
        OvertrainingRisk::Low
    }
}

/// Monotony and strain over a daily stress series (oldest → newest)
///
/// Requires at least 7 days. With 14 or more, the preceding week is analyzed
/// too and a strain trend reported.
#[must_use]
pub fn analyze_monotony(daily: &[f64]) -> Option<MonotonyAnalysis> {
    if daily.len() < WEEK_DAYS {
        return None;
    }

    let split = daily.len() - WEEK_DAYS;
    let current = WeeklyMonotony::from_days(&daily[split..])?;
    let previous = (split >= WEEK_DAYS)
        .then(|| WeeklyMonotony::from_days(&daily[split - WEEK_DAYS..split]))
        .flatten();

    Some(MonotonyAnalysis {
        current,
        risk: classify_risk(current.monotony, current.strain),
        previous,
        strain_trend: previous.map(|last_week| strain_trend(last_week.strain, current.strain)),
    })
}

fn strain_trend(previous: f64, current: f64) -> StrainTrend {
    if previous <= 0.0 {
        return if current > 0.0 {
            StrainTrend::Increasing
        } else {
            StrainTrend::Stable
        };
    }
    let change = (current - previous) / previous;
    if change > STRAIN_TREND_BAND {
        StrainTrend::Increasing
    } else if change < -STRAIN_TREND_BAND {
        StrainTrend::Decreasing
    } else {
        StrainTrend::Stable
    }
}
