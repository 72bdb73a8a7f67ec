// ABOUTME: Training load calculations (CTL/ATL/TSB) from a dense daily stress series
// ABOUTME: Recomputes exponentially-weighted loads from full history on every call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use chrono::{Datelike, Duration, NaiveDate};
use ridelog_core::constants::load::{
    ATL_TIME_CONSTANT_DAYS, ATL_WINDOW_DAYS, CTL_TIME_CONSTANT_DAYS, CTL_WINDOW_DAYS,
};
use ridelog_core::intelligence::TrainingStatus;
use ridelog_core::models::Activity;
use serde::{Deserialize, Serialize};

use super::tss::estimate_stress;

/// Training load metrics for an athlete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingLoad {
    /// Chronic Training Load (42-day time constant) - represents fitness
    pub ctl: i64,
    /// Acute Training Load (7-day time constant) - represents fatigue
    pub atl: i64,
    /// Training Stress Balance (CTL - ATL) - represents form/freshness
    pub tsb: i64,
    /// Form interpretation of the TSB
    pub status: TrainingStatus,
}

impl TrainingLoad {
    /// CTL over the trailing 90 days and ATL over the trailing 7 days of `daily`
    #[must_use]
    pub fn from_daily_stress(daily: &[f64]) -> Self {
        let ctl = calculate_ctl(trailing(daily, CTL_WINDOW_DAYS));
        let atl = calculate_atl(trailing(daily, ATL_WINDOW_DAYS));
        let tsb = calculate_tsb(ctl as f64, atl as f64);
        Self {
            ctl,
            atl,
            tsb,
            status: TrainingStatus::from_tsb(tsb as f64),
        }
    }
}

/// Exponentially decay-weighted mean of a daily series (oldest → newest)
///
/// `weight(i) = exp(-(N-1-i) / time_constant)`. The weighted sum is divided by
/// the exact sum of weights over the window, which is what `1/time_constant`
/// approximates for an infinitely long window; a constant input therefore
/// yields exactly that constant regardless of window length.
#[must_use]
pub fn decay_weighted_load(daily: &[f64], time_constant_days: f64) -> f64 {
    if daily.is_empty() || time_constant_days <= 0.0 {
        return 0.0;
    }
    let decay = 1.0 / time_constant_days;
    let newest = daily.len() - 1;

    let (weighted_sum, weight_sum) =
        daily
            .iter()
            .enumerate()
            .fold((0.0_f64, 0.0_f64), |(sum, weights), (index, stress)| {
                let weight = (-decay * (newest - index) as f64).exp();
                (stress.mul_add(weight, sum), weights + weight)
            });

    if weight_sum <= 0.0 {
        0.0
    } else {
        weighted_sum / weight_sum
    }
}

/// Chronic Training Load (fitness) of a daily series, rounded
///
/// Callers pass at least 90 days so early-day contribution is negligible.
#[must_use]
pub fn calculate_ctl(daily: &[f64]) -> i64 {
    decay_weighted_load(daily, CTL_TIME_CONSTANT_DAYS).round() as i64
}

/// Acute Training Load (fatigue) of a daily series, rounded
///
/// Callers pass the trailing 7 days.
#[must_use]
pub fn calculate_atl(daily: &[f64]) -> i64 {
    decay_weighted_load(daily, ATL_TIME_CONSTANT_DAYS).round() as i64
}

/// Training Stress Balance (form), rounded
#[must_use]
pub fn calculate_tsb(ctl: f64, atl: f64) -> i64 {
    (ctl - atl).round() as i64
}

/// Monday of the ISO week containing `date`
#[must_use]
pub fn get_week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn trailing(daily: &[f64], days: usize) -> &[f64] {
    &daily[daily.len().saturating_sub(days)..]
}

/// Dense per-day stress totals (UTC calendar days), oldest first
///
/// Rebuilt from activity records on every computation; missing days are 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStressSeries {
    start: NaiveDate,
    values: Vec<f64>,
}

impl DailyStressSeries {
    /// Build the series for `[start, end)` from activities
    ///
    /// Activities starting outside the range are ignored.
    #[must_use]
    pub fn from_activities<'a, I>(activities: I, start: NaiveDate, end: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Activity>,
    {
        let days = usize::try_from((end - start).num_days()).unwrap_or(0);
        let mut values = vec![0.0; days];
        for activity in activities {
            let offset = (activity.start_day() - start).num_days();
            if let Ok(index) = usize::try_from(offset) {
                if let Some(slot) = values.get_mut(index) {
                    *slot += estimate_stress(activity) as f64;
                }
            }
        }
        Self { start, values }
    }

    /// First day covered
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Number of days covered
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series covers no days
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values, oldest first
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The trailing `days` values (fewer if the series is shorter)
    #[must_use]
    pub fn last(&self, days: usize) -> &[f64] {
        trailing(&self.values, days)
    }

    /// Stress on a given day, 0 outside the range
    #[must_use]
    pub fn on(&self, date: NaiveDate) -> f64 {
        usize::try_from((date - self.start).num_days())
            .ok()
            .and_then(|index| self.values.get(index).copied())
            .unwrap_or(0.0)
    }

    /// CTL/ATL/TSB of the series
    #[must_use]
    pub fn training_load(&self) -> TrainingLoad {
        TrainingLoad::from_daily_stress(&self.values)
    }
}
