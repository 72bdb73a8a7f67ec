// ABOUTME: Dynamic FTP estimation from best-effort power tables across recent rides
// ABOUTME: Prefers 60-minute and 20-minute efforts, falls back to 5-minute, compares with declared FTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use ridelog_core::intelligence::{FtpConfidence, FtpEstimationMethod};
use ridelog_core::models::BestEfforts;
use serde::{Deserialize, Serialize};

/// Fraction of the best 20-minute power taken as FTP
const TWENTY_MINUTE_FACTOR: f64 = 0.95;
/// Fraction of the best 5-minute power taken as FTP
const FIVE_MINUTE_FACTOR: f64 = 0.75;
/// Blend weight of the 20-minute-derived value when a 60-minute effort exists
const BLEND_TWENTY_MINUTE_WEIGHT: f64 = 0.4;
/// Blend weight of the 60-minute effort
const BLEND_SIXTY_MINUTE_WEIGHT: f64 = 0.6;
/// Estimate above declared by more than this percentage suggests raising FTP
const RAISE_THRESHOLD_PERCENT: f64 = 5.0;
/// Estimate below declared by more than this percentage suggests a decline
const DECLINE_THRESHOLD_PERCENT: f64 = -10.0;

const FIVE_MINUTES: u32 = 300;
const TWENTY_MINUTES: u32 = 1200;
const SIXTY_MINUTES: u32 = 3600;

/// What to do about the declared FTP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FtpRecommendation {
    /// Recent efforts support a higher FTP
    Raise,
    /// Recent efforts fall well short of the declared FTP
    InvestigateDecline,
    /// Declared FTP is consistent with recent efforts
    Keep,
}

/// Estimated vs declared FTP
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FtpComparison {
    /// FTP the athlete declared
    pub declared_ftp: f64,
    /// Estimate minus declared, watts
    pub delta_watts: f64,
    /// Estimate minus declared, percent of declared
    pub delta_percent: f64,
    /// Suggested action
    pub recommendation: FtpRecommendation,
}

/// FTP estimate with provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtpEstimate {
    /// Estimated FTP, watts
    pub estimated_ftp: f64,
    /// Which efforts produced it
    pub method: FtpEstimationMethod,
    /// How much to trust it
    pub confidence: FtpConfidence,
    /// Best 5-minute power seen
    pub best_five_minute: Option<f64>,
    /// Best 20-minute power seen
    pub best_twenty_minute: Option<f64>,
    /// Best 60-minute power seen
    pub best_sixty_minute: Option<f64>,
    /// Present when a positive declared FTP was supplied
    pub comparison: Option<FtpComparison>,
}

/// Estimate FTP from the best efforts across a set of rides
///
/// Returns `None` when no 5-, 20-, or 60-minute effort exists.
#[must_use]
pub fn estimate_ftp<'a, I>(tables: I, declared_ftp: Option<f64>) -> Option<FtpEstimate>
where
    I: IntoIterator<Item = &'a BestEfforts>,
{
    let mut best = BestEfforts::new();
    for table in tables {
        best.merge_max(table);
    }
    estimate_ftp_from_best(&best, declared_ftp)
}

/// Estimate FTP from one already-merged best-effort table
#[must_use]
pub fn estimate_ftp_from_best(
    best: &BestEfforts,
    declared_ftp: Option<f64>,
) -> Option<FtpEstimate> {
    let best_five_minute = best.get(FIVE_MINUTES);
    let best_twenty_minute = best.get(TWENTY_MINUTES);
    let best_sixty_minute = best.get(SIXTY_MINUTES);

    let (estimated_ftp, method, confidence) = match (best_sixty_minute, best_twenty_minute) {
        (Some(sixty), Some(twenty)) => (
            (twenty * TWENTY_MINUTE_FACTOR)
                .mul_add(BLEND_TWENTY_MINUTE_WEIGHT, sixty * BLEND_SIXTY_MINUTE_WEIGHT),
            FtpEstimationMethod::Blended,
            FtpConfidence::VeryHigh,
        ),
        (Some(sixty), None) => (sixty, FtpEstimationMethod::SixtyMinute, FtpConfidence::High),
        (None, Some(twenty)) => (
            twenty * TWENTY_MINUTE_FACTOR,
            FtpEstimationMethod::TwentyMinute,
            FtpConfidence::High,
        ),
        (None, None) => (
            best_five_minute? * FIVE_MINUTE_FACTOR,
            FtpEstimationMethod::FiveMinute,
            FtpConfidence::Moderate,
        ),
    };

    Some(FtpEstimate {
        estimated_ftp,
        method,
        confidence,
        best_five_minute,
        best_twenty_minute,
        best_sixty_minute,
        comparison: declared_ftp
            .filter(|ftp| *ftp > 0.0)
            .map(|declared| compare_with_declared(estimated_ftp, declared)),
    })
}

fn compare_with_declared(estimated_ftp: f64, declared_ftp: f64) -> FtpComparison {
    let delta_watts = estimated_ftp - declared_ftp;
    let delta_percent = delta_watts / declared_ftp * 100.0;
    let recommendation = if delta_percent > RAISE_THRESHOLD_PERCENT {
        FtpRecommendation::Raise
    } else if delta_percent < DECLINE_THRESHOLD_PERCENT {
        FtpRecommendation::InvestigateDecline
    } else {
        FtpRecommendation::Keep
    };

    FtpComparison {
        declared_ftp,
        delta_watts,
        delta_percent,
        recommendation,
    }
}
