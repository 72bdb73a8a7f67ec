// ABOUTME: Configuration management module for the training-load engine
// ABOUTME: Environment-driven settings for storage, deduplication, and snapshot windows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

//! Configuration module
//!
//! - **Environment**: `EngineConfig::from_env` with validated defaults
//! - **Database**: type-safe `DatabaseUrl`
//! - **Error**: `ConfigError` for unparseable or out-of-range values

/// Database URL parsing
pub mod database;
/// Environment-based engine configuration
pub mod environment;
/// Configuration errors
pub mod error;

pub use database::DatabaseUrl;
pub use environment::{DedupConfig, EngineConfig, SnapshotConfig};
pub use error::ConfigError;
