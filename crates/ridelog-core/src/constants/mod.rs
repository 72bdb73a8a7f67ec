// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Load windows, deduplication tolerances, and per-ride analysis thresholds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

//! Constants grouped by domain. Configuration defaults in the root crate read
//! from here so analytics and services agree on the same numbers.

/// Training load windows
pub mod load {
    /// CTL time constant in days
    pub const CTL_TIME_CONSTANT_DAYS: f64 = 42.0;
    /// ATL time constant in days
    pub const ATL_TIME_CONSTANT_DAYS: f64 = 7.0;
    /// Trailing window the CTL is computed over
    pub const CTL_WINDOW_DAYS: usize = 90;
    /// Trailing window the ATL is computed over
    pub const ATL_WINDOW_DAYS: usize = 7;
    /// Days of daily stress fed to monotony/strain (current + previous week)
    pub const MONOTONY_WINDOW_DAYS: usize = 14;
    /// Longest configurable snapshot load window (ten years)
    pub const MAX_LOAD_WINDOW_DAYS: usize = 3650;
}

/// Cross-provider duplicate detection
pub mod dedup {
    /// Start-time tolerance in seconds (±5 minutes)
    pub const START_TIME_WINDOW_SECONDS: i64 = 300;
    /// Distance tolerance as a fraction of the incoming distance
    pub const DISTANCE_TOLERANCE_RATIO: f64 = 0.01;
    /// Minimum absolute distance tolerance in meters
    pub const MIN_DISTANCE_TOLERANCE_METERS: f64 = 100.0;
}

/// Snapshot orchestration
pub mod snapshots {
    /// Weeks backfilled when the caller does not say
    pub const DEFAULT_BACKFILL_WEEKS: u32 = 12;
    /// Upper bound on a single backfill request
    pub const MAX_BACKFILL_WEEKS: u32 = 520;
}

/// Per-ride signal analysis
pub mod ride {
    /// Rolling window for Normalized Power
    pub const NP_ROLLING_WINDOW: usize = 30;
    /// Samples needed for pacing analysis
    pub const MIN_PACING_SAMPLES: usize = 120;
    /// Samples needed for fatigue-resistance analysis
    pub const MIN_FATIGUE_SAMPLES: usize = 600;
    /// Valid heart-rate samples needed for zone analysis
    pub const MIN_HEART_RATE_SAMPLES: usize = 60;
    /// Pedaling samples needed for cadence analysis
    pub const MIN_CADENCE_SAMPLES: usize = 60;
    /// Default minimum match duration in seconds
    pub const DEFAULT_MATCH_MIN_DURATION: usize = 10;
    /// Matches returned individually
    pub const MAX_REPORTED_MATCHES: usize = 20;
    /// Lowest plausible heart rate
    pub const MIN_VALID_HEART_RATE: f64 = 40.0;
    /// Highest plausible heart rate
    pub const MAX_VALID_HEART_RATE: f64 = 250.0;
    /// Upper bound (exclusive) for a pedaling cadence sample
    pub const MAX_VALID_CADENCE: f64 = 250.0;
    /// Cadence bins with fewer samples are suppressed from power-by-cadence
    pub const MIN_CADENCE_BIN_SAMPLES: usize = 10;
    /// Best-effort durations in seconds: 5 s, 1 min, 5 min, 20 min, 60 min
    pub const BEST_EFFORT_DURATIONS: [u32; 5] = [5, 60, 300, 1200, 3600];
}
