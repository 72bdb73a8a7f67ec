// ABOUTME: Re-exports the canonical data models from ridelog-core
// ABOUTME: Activity, Provider, SportType, FitnessSnapshot, and audit-trail records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

pub use ridelog_core::models::*;
