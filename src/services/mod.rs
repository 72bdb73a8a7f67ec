// ABOUTME: Domain service layer over the stores and the pure analytics crate
// ABOUTME: Weekly snapshot orchestration, cross-provider duplicate resolution, and ingestion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

//! Domain service layer
//!
//! Services own no data. They read through the store traits, hand plain
//! values to `ridelog-intelligence`, and write results back, so the same
//! logic runs against `SQLite` or the in-memory store.

/// Cross-provider duplicate detection, takeover, and merge
pub mod dedup;

/// Provider report ingestion: analysis, dedup, snapshot refresh
pub mod ingest;

/// Weekly fitness snapshot computation, backfill, and history
pub mod snapshots;

pub use dedup::{DuplicateMatch, DuplicateResolver, DuplicateVerdict, Resolution};
pub use ingest::{ActivityReport, IngestAction, IngestOutcome, IngestService};
pub use snapshots::{
    BackfillFailure, BackfillReport, FitnessHistory, SnapshotService, NO_HISTORY_ACTION,
    NO_HISTORY_MESSAGE,
};
