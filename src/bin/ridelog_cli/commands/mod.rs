// ABOUTME: Command modules for ridelog-cli and the service bundle they share
// ABOUTME: Engine wires the configured stores into the snapshot, dedup, and ingest services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

pub mod activity;
pub mod preferences;
pub mod snapshot;

use ridelog::config::EngineConfig;
use ridelog::database::Stores;
use ridelog::services::{DuplicateResolver, IngestService, SnapshotService};

/// Services built once per CLI invocation
pub struct Engine {
    /// Raw store access for preference commands
    pub stores: Stores,
    /// Weekly snapshot orchestration
    pub snapshots: SnapshotService,
    /// Report ingestion (dedup + snapshot refresh)
    pub ingest: IngestService,
}

impl Engine {
    /// Build every service over one store bundle
    pub fn new(stores: Stores, config: &EngineConfig) -> Self {
        let snapshots = SnapshotService::new(
            stores.activities.clone(),
            stores.snapshots.clone(),
            stores.preferences.clone(),
            config.snapshots,
        );
        let resolver = DuplicateResolver::new(stores.activities.clone(), config.dedup);
        let ingest = IngestService::new(
            stores.activities.clone(),
            stores.preferences.clone(),
            resolver,
            snapshots.clone(),
        );
        Self {
            stores,
            snapshots,
            ingest,
        }
    }
}
