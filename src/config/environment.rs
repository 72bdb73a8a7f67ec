// ABOUTME: Engine configuration loaded from environment variables with validated defaults
// ABOUTME: Dedup tolerances, snapshot windows, and database location for services and CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use ridelog_core::constants::{dedup, load, snapshots};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::info;

use super::{ConfigError, DatabaseUrl};

/// Environment variable names
pub mod keys {
    /// Preferred database URL variable
    pub const DATABASE_URL: &str = "RIDELOG_DATABASE_URL";
    /// Fallback database URL variable
    pub const DATABASE_URL_FALLBACK: &str = "DATABASE_URL";
    /// Start-time tolerance for duplicate detection
    pub const DEDUP_WINDOW_SECONDS: &str = "RIDELOG_DEDUP_WINDOW_SECONDS";
    /// Distance tolerance ratio for duplicate detection
    pub const DEDUP_DISTANCE_TOLERANCE: &str = "RIDELOG_DEDUP_DISTANCE_TOLERANCE";
    /// Minimum absolute distance tolerance for duplicate detection
    pub const DEDUP_MIN_DISTANCE_METERS: &str = "RIDELOG_DEDUP_MIN_DISTANCE_METERS";
    /// Days of history loaded for a weekly snapshot
    pub const LOAD_WINDOW_DAYS: &str = "RIDELOG_LOAD_WINDOW_DAYS";
    /// Weeks backfilled when none are requested
    pub const BACKFILL_WEEKS: &str = "RIDELOG_BACKFILL_WEEKS";
}

/// Cross-provider duplicate matching tolerances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Maximum start-time difference, seconds
    pub window_seconds: i64,
    /// Distance tolerance as a fraction of the incoming distance
    pub distance_tolerance_ratio: f64,
    /// Lower bound on the distance tolerance, meters
    pub min_distance_tolerance_meters: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window_seconds: dedup::START_TIME_WINDOW_SECONDS,
            distance_tolerance_ratio: dedup::DISTANCE_TOLERANCE_RATIO,
            min_distance_tolerance_meters: dedup::MIN_DISTANCE_TOLERANCE_METERS,
        }
    }
}

impl DedupConfig {
    /// Distance tolerance for an incoming distance: max(ratio × distance, minimum)
    #[must_use]
    pub fn distance_tolerance(&self, incoming_meters: f64) -> f64 {
        (incoming_meters * self.distance_tolerance_ratio).max(self.min_distance_tolerance_meters)
    }

    /// Check every field is inside its accepted range
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueOutOfRange` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_seconds <= 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: keys::DEDUP_WINDOW_SECONDS,
                reason: "must be positive",
            });
        }
        if !(0.0..1.0).contains(&self.distance_tolerance_ratio) {
            return Err(ConfigError::ValueOutOfRange {
                key: keys::DEDUP_DISTANCE_TOLERANCE,
                reason: "must be in [0, 1)",
            });
        }
        if self.min_distance_tolerance_meters < 0.0 {
            return Err(ConfigError::ValueOutOfRange {
                key: keys::DEDUP_MIN_DISTANCE_METERS,
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

/// Weekly snapshot orchestration settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Days of history fetched for each weekly computation
    pub load_window_days: i64,
    /// Weeks backfilled when the caller does not say
    pub default_backfill_weeks: u32,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            load_window_days: load::CTL_WINDOW_DAYS as i64,
            default_backfill_weeks: snapshots::DEFAULT_BACKFILL_WEEKS,
        }
    }
}

impl SnapshotConfig {
    /// Check every field is inside its accepted range
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueOutOfRange` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.load_window_days < load::MONOTONY_WINDOW_DAYS as i64
            || self.load_window_days > load::MAX_LOAD_WINDOW_DAYS as i64
        {
            return Err(ConfigError::ValueOutOfRange {
                key: keys::LOAD_WINDOW_DAYS,
                reason: "must be between 14 and 3650 days",
            });
        }
        if self.default_backfill_weeks == 0
            || self.default_backfill_weeks > snapshots::MAX_BACKFILL_WEEKS
        {
            return Err(ConfigError::ValueOutOfRange {
                key: keys::BACKFILL_WEEKS,
                reason: "must be between 1 and 520",
            });
        }
        Ok(())
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Where activities, snapshots, and preferences are stored
    pub database_url: DatabaseUrl,
    /// Duplicate detection
    pub dedup: DedupConfig,
    /// Snapshot computation
    pub snapshots: SnapshotConfig,
}

impl EngineConfig {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparseable or out of range
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Missing keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but unparseable or out of range
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = match lookup(keys::DATABASE_URL)
            .or_else(|| lookup(keys::DATABASE_URL_FALLBACK))
        {
            Some(url) => DatabaseUrl::parse_url(&url)?,
            None => defaults.database_url,
        };

        let dedup = DedupConfig {
            window_seconds: parse_or(
                &lookup,
                keys::DEDUP_WINDOW_SECONDS,
                defaults.dedup.window_seconds,
            )?,
            distance_tolerance_ratio: parse_or(
                &lookup,
                keys::DEDUP_DISTANCE_TOLERANCE,
                defaults.dedup.distance_tolerance_ratio,
            )?,
            min_distance_tolerance_meters: parse_or(
                &lookup,
                keys::DEDUP_MIN_DISTANCE_METERS,
                defaults.dedup.min_distance_tolerance_meters,
            )?,
        };
        dedup.validate()?;

        let snapshots = SnapshotConfig {
            load_window_days: parse_or(
                &lookup,
                keys::LOAD_WINDOW_DAYS,
                defaults.snapshots.load_window_days,
            )?,
            default_backfill_weeks: parse_or(
                &lookup,
                keys::BACKFILL_WEEKS,
                defaults.snapshots.default_backfill_weeks,
            )?,
        };
        snapshots.validate()?;

        let config = Self {
            database_url,
            dedup,
            snapshots,
        };
        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        info!(
            database = %self.database_url,
            dedup.window_seconds = self.dedup.window_seconds,
            dedup.distance_tolerance_ratio = self.dedup.distance_tolerance_ratio,
            dedup.min_distance_tolerance_meters = self.dedup.min_distance_tolerance_meters,
            snapshots.load_window_days = self.snapshots.load_window_days,
            snapshots.default_backfill_weeks = self.snapshots.default_backfill_weeks,
            "Engine configuration loaded"
        );
    }
}

/// Parse an optional value, falling back to `default` when absent or blank
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Parse {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}
