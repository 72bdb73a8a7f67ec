// ABOUTME: Re-exports the unified error types from ridelog-core
// ABOUTME: AppError, ErrorCode, AppResult, and the store-level DatabaseError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

//! # Unified Error Handling
//!
//! Error types live in `ridelog-core` so the analytics crate and the stores
//! share one vocabulary. Service code returns [`AppResult`]; stores return
//! [`DatabaseError`], which converts into [`AppError`] with `?`.

pub use ridelog_core::errors::{AppError, AppResult, DatabaseError, ErrorCode};
