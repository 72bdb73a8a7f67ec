// ABOUTME: Structured error types for activity, snapshot, and preference stores
// ABOUTME: Provides domain-specific errors with context for better error handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use thiserror::Error;

/// Errors returned by storage implementations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Query or connection failure
    #[error("Database query failed: {context}")]
    QueryError {
        /// What the store was doing when it failed
        context: String,
    },

    /// Record lookup by key found nothing
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (activity, snapshot, ...)
        entity: &'static str,
        /// Key that was looked up
        id: String,
    },

    /// JSON column could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Row contained a value the domain model rejects
    #[error("Invalid stored data in {field}: {reason}")]
    InvalidData {
        /// Column or field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        Self::QueryError {
            context: error.to_string(),
        }
    }
}
