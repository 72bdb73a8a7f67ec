// ABOUTME: Per-ride physiological analysis over 1 Hz power, heart-rate, and cadence streams
// ABOUTME: analyze_ride runs every analysis the supplied signals allow and summarizes the result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

//! Per-Ride Analytics
//!
//! Every analysis takes per-second samples and returns `None` when the
//! signal is too short or otherwise unusable. Insufficient data is never an
//! error.

pub mod cadence;
pub mod fatigue;
pub mod heart_rate;
pub mod matches;
pub mod power;

use ridelog_core::constants::ride::DEFAULT_MATCH_MIN_DURATION;
use ridelog_core::models::{ActivityStreams, AthletePreferences, BestEfforts, RideMetricsSummary};
use serde::{Deserialize, Serialize};

pub use cadence::{analyze_cadence, CadenceAnalysis, CadenceBucket, CadencePowerBin};
pub use fatigue::{analyze_fatigue, CardiacDrift, FatigueAnalysis, FatigueRating};
pub use heart_rate::{analyze_heart_rate, valid_heart_rate, HeartRateAnalysis, HeartRateZone};
pub use matches::{detect_matches, MatchAnalysis, MatchEffort, MatchSummary};
pub use power::{
    analyze_pacing, best_efforts, best_rolling_mean, normalized_power, PacingAnalysis,
    PacingStrategy,
};

use crate::statistics::mean;

/// Borrowed per-second signals for one ride
#[derive(Debug, Clone, Copy, Default)]
pub struct RideStreams<'a> {
    /// Watts
    pub power: Option<&'a [f64]>,
    /// Beats per minute
    pub heart_rate: Option<&'a [f64]>,
    /// Revolutions per minute
    pub cadence: Option<&'a [f64]>,
}

impl<'a> RideStreams<'a> {
    /// Only a power signal
    #[must_use]
    pub const fn power(power: &'a [f64]) -> Self {
        Self {
            power: Some(power),
            heart_rate: None,
            cadence: None,
        }
    }

    /// Attach a heart-rate signal
    #[must_use]
    pub const fn with_heart_rate(mut self, heart_rate: &'a [f64]) -> Self {
        self.heart_rate = Some(heart_rate);
        self
    }

    /// Attach a cadence signal
    #[must_use]
    pub const fn with_cadence(mut self, cadence: &'a [f64]) -> Self {
        self.cadence = Some(cadence);
        self
    }

    fn non_empty(signal: Option<&'a [f64]>) -> Option<&'a [f64]> {
        signal.filter(|samples| !samples.is_empty())
    }
}

impl<'a> From<&'a ActivityStreams> for RideStreams<'a> {
    fn from(streams: &'a ActivityStreams) -> Self {
        Self {
            power: streams.power.as_deref(),
            heart_rate: streams.heart_rate.as_deref(),
            cadence: streams.cadence.as_deref(),
        }
    }
}

/// Athlete-specific inputs to per-ride analysis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RideContext {
    /// Functional threshold power in watts
    pub ftp: Option<f64>,
    /// Critical power in watts; preferred over FTP as the match threshold
    pub critical_power: Option<f64>,
    /// Max heart rate; falls back to the ride's peak
    pub max_heart_rate: Option<f64>,
    /// Resting heart rate; defaults to 50 bpm
    pub resting_heart_rate: Option<f64>,
    /// Shortest effort counted as a match; defaults to 10 s
    pub match_min_duration_seconds: Option<usize>,
}

impl RideContext {
    /// Context from stored athlete preferences
    #[must_use]
    pub fn from_preferences(preferences: &AthletePreferences) -> Self {
        Self {
            ftp: preferences.positive_ftp(),
            max_heart_rate: preferences.max_heart_rate,
            resting_heart_rate: preferences.resting_heart_rate,
            ..Self::default()
        }
    }

    /// Override the match threshold with a critical power value
    #[must_use]
    pub const fn with_critical_power(mut self, watts: f64) -> Self {
        self.critical_power = Some(watts);
        self
    }

    fn match_threshold(&self) -> Option<f64> {
        self.critical_power
            .filter(|watts| *watts > 0.0)
            .or_else(|| self.ftp.filter(|watts| *watts > 0.0))
    }
}

/// Everything computed for one ride
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RideAnalysis {
    /// Normalized Power
    pub normalized_power: Option<f64>,
    /// Mean of non-zero power samples
    pub average_power: Option<f64>,
    /// NP / mean non-zero power
    pub variability_index: Option<f64>,
    /// NP / mean valid heart rate
    pub efficiency_factor: Option<f64>,
    /// NP / FTP
    pub intensity_factor: Option<f64>,
    /// Best rolling power at standard durations
    pub best_efforts: Option<BestEfforts>,
    /// Pacing strategy
    pub pacing: Option<PacingAnalysis>,
    /// Efforts above CP/FTP
    pub matches: Option<MatchAnalysis>,
    /// Power retention and cardiac drift
    pub fatigue: Option<FatigueAnalysis>,
    /// Heart-rate zones
    pub heart_rate: Option<HeartRateAnalysis>,
    /// Cadence distribution
    pub cadence: Option<CadenceAnalysis>,
}

impl RideAnalysis {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Compact metrics attached to the stored activity
    #[must_use]
    pub fn summary(&self) -> RideMetricsSummary {
        RideMetricsSummary {
            normalized_power: self.normalized_power,
            variability_index: self.variability_index,
            efficiency_factor: self.efficiency_factor,
            intensity_factor: self.intensity_factor,
            fatigue_resistance_index: self
                .fatigue
                .as_ref()
                .map(|fatigue| fatigue.fatigue_resistance_index),
            execution_score: None,
        }
    }
}

/// Run every analysis the supplied signals allow
///
/// Returns `None` when nothing could be computed.
#[must_use]
pub fn analyze_ride(streams: RideStreams<'_>, context: &RideContext) -> Option<RideAnalysis> {
    let power = RideStreams::non_empty(streams.power);
    let heart_rate = RideStreams::non_empty(streams.heart_rate);
    let cadence = RideStreams::non_empty(streams.cadence);

    let mut analysis = RideAnalysis::default();

    if let Some(power) = power {
        analysis.normalized_power = normalized_power(power);
        let pedaling: Vec<f64> = power.iter().copied().filter(|watts| *watts > 0.0).collect();
        analysis.average_power = mean(&pedaling);
        analysis.variability_index = ratio(analysis.normalized_power, analysis.average_power);
        analysis.intensity_factor = ratio(analysis.normalized_power, context.ftp);

        let efforts = best_efforts(power);
        analysis.best_efforts = (!efforts.is_empty()).then_some(efforts);
        analysis.pacing = analyze_pacing(power);
        analysis.matches = context.match_threshold().and_then(|threshold| {
            detect_matches(
                power,
                threshold,
                context
                    .match_min_duration_seconds
                    .unwrap_or(DEFAULT_MATCH_MIN_DURATION),
            )
        });
        analysis.fatigue = analyze_fatigue(power, heart_rate);
    }

    if let Some(heart_rate) = heart_rate {
        analysis.efficiency_factor = ratio(
            analysis.normalized_power,
            mean(&valid_heart_rate(heart_rate)),
        );
        analysis.heart_rate = analyze_heart_rate(
            heart_rate,
            context.max_heart_rate,
            context.resting_heart_rate,
        );
    }

    if let Some(cadence) = cadence {
        analysis.cadence = analyze_cadence(cadence, power);
    }

    tracing::debug!(
        normalized_power = ?analysis.normalized_power,
        pacing = analysis.pacing.is_some(),
        matches = analysis.matches.as_ref().map(|found| found.summary.count),
        fatigue = analysis.fatigue.is_some(),
        heart_rate = analysis.heart_rate.is_some(),
        cadence = analysis.cadence.is_some(),
        "Ride analysis complete"
    );

    (!analysis.is_empty()).then_some(analysis)
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(top), Some(bottom)) if bottom > 0.0 => Some(top / bottom),
        _ => None,
    }
}
