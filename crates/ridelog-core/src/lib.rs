// ABOUTME: Core types and constants for the Ridelog training-load engine
// ABOUTME: Foundation crate with error handling, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

#![deny(unsafe_code)]

//! # Ridelog Core
//!
//! Foundation crate providing shared types and constants for the Ridelog
//! training-load engine. This crate is designed to change infrequently,
//! enabling incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `DatabaseError`
//! - **models**: Canonical `Activity`, `FitnessSnapshot`, `Provider`, `SportType`
//! - **intelligence**: Enums shared by analytics and persisted snapshots
//! - **constants**: Load windows, dedup tolerances, per-ride thresholds

/// Unified error handling system with standard error codes
pub mod errors;

/// Core data models (Activity, FitnessSnapshot, Provider, SportType)
pub mod models;

/// Intelligence types (`FtpConfidence`, `OvertrainingRisk`, `TrainingStatus`)
pub mod intelligence;

/// Application constants organized by domain
pub mod constants;
