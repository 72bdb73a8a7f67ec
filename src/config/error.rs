// ABOUTME: Configuration error types for environment parsing and validation
// ABOUTME: Distinguishes unparseable values from values outside their accepted range
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use ridelog_core::errors::AppError;
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable present but not parseable as the expected type
    #[error("Parse error for {key}: '{value}' ({reason})")]
    Parse {
        /// Environment variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },

    /// Numeric value outside valid range for parameter
    #[error("Value out of range for {key}: {reason}")]
    ValueOutOfRange {
        /// Environment variable or field name
        key: &'static str,
        /// Accepted range
        reason: &'static str,
    },

    /// Database URL scheme the engine cannot open
    #[error("Unsupported database URL: {0}")]
    UnsupportedDatabaseUrl(String),
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        Self::config(error.to_string()).with_source(error)
    }
}
