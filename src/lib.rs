// ABOUTME: Main library entry point for the Ridelog training-load engine
// ABOUTME: Wires configuration, logging, storage, snapshot orchestration, and deduplication
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

#![deny(unsafe_code)]

//! # Ridelog
//!
//! Turns activity records reported by several providers into a deduplicated
//! canonical history, then derives training load and performance metrics
//! from it.
//!
//! ## Architecture
//!
//! - **`ridelog_core`**: errors, canonical models, shared enums and constants
//! - **`ridelog_intelligence`**: pure analytics (stress, CTL/ATL/TSB, per-ride, longitudinal)
//! - **database**: async store traits with `SQLite` and in-memory backends
//! - **services**: weekly snapshot orchestration and cross-provider dedup
//! - **config** / **logging**: environment-driven ambient setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ridelog::config::EngineConfig;
//! use ridelog::database::Stores;
//! use ridelog::errors::AppResult;
//! use ridelog::services::SnapshotService;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = EngineConfig::from_env()?;
//!     let stores = Stores::connect(&config.database_url).await?;
//!     let service = SnapshotService::new(
//!         stores.activities,
//!         stores.snapshots,
//!         stores.preferences,
//!         config.snapshots,
//!     );
//!     let history = service.fitness_history(uuid::Uuid::new_v4(), 12).await?;
//!     println!("{} weeks", history.snapshots.len());
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Unified error handling (re-exported from `ridelog-core`)
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Canonical data models (re-exported from `ridelog-core`)
pub mod models;

/// Storage traits and backends
pub mod database;

/// Snapshot orchestration and duplicate resolution
pub mod services;

pub use ridelog_intelligence as intelligence;
