// ABOUTME: Core data models for the training-load engine
// ABOUTME: Re-exports Activity, Provider, SportType, FitnessSnapshot and related structures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

//! # Data Models
//!
//! Provider payloads are normalized into these shapes at the ingestion
//! boundary, tagged by a [`Provider`] discriminant. Analytics only ever see
//! the canonical shape.

mod activity;
mod athlete;
mod provider;
mod snapshot;
mod sport;

pub use activity::{
    Activity, ActivityBuilder, ActivityData, ActivityStreams, BestEfforts, MergeRecord,
    ProviderRef, RawPayload, RideMetricsSummary, TakeoverRecord,
};
pub use athlete::{AthletePreferences, DEFAULT_RESTING_HEART_RATE};
pub use provider::Provider;
pub use snapshot::FitnessSnapshot;
pub use sport::SportType;
