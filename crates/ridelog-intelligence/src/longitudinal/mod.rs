// ABOUTME: Multi-activity analytics: FTP estimation, power-curve progression, monotony, execution
// ABOUTME: Pure functions over best-effort tables and daily stress already extracted from storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

pub mod execution;
pub mod ftp_estimation;
pub mod mmp_progression;
pub mod monotony;

pub use execution::{
    score_execution, DimensionScore, ExecutionDimension, ExecutionRating, ExecutionScore,
    WorkoutTargets,
};
pub use ftp_estimation::{
    estimate_ftp, estimate_ftp_from_best, FtpComparison, FtpEstimate, FtpRecommendation,
};
pub use mmp_progression::{
    mmp_progression, DatedEfforts, DurationTrend, MmpProgression, MmpWindow,
    ProgressionDirection, DEFAULT_MMP_WINDOW_DAYS, MMP_SAMPLE_STEP_DAYS,
};
pub use monotony::{
    analyze_monotony, classify_risk, MonotonyAnalysis, StrainTrend, WeeklyMonotony,
};
