// ABOUTME: Training-load and ride analytics algorithms for the Ridelog engine
// ABOUTME: Stress estimation, CTL/ATL/TSB, per-ride signal analysis, and longitudinal trends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

#![deny(unsafe_code)]

//! # Ridelog Intelligence
//!
//! Synchronous, side-effect-free analytics. Callers fetch data from storage
//! and hand it over; nothing here blocks or performs I/O.
//!
//! - **algorithms**: TSS estimation and the fitness/fatigue/form model
//! - **`ride_analytics`**: per-second stream analysis for a single ride
//! - **longitudinal**: FTP estimation, MMP progression, monotony, execution
//! - **statistics**: shared descriptive statistics

/// Stress estimation and training load
pub mod algorithms;

/// Multi-activity trend and risk analytics
pub mod longitudinal;

/// Per-ride stream analytics
pub mod ride_analytics;

/// Descriptive statistics helpers
pub mod statistics;

pub use algorithms::{
    calculate_atl, calculate_ctl, calculate_tsb, estimate_stress, get_week_start,
    DailyStressSeries, TrainingLoad,
};
pub use ride_analytics::{analyze_ride, RideAnalysis, RideContext, RideStreams};
