// ABOUTME: Data-source provider discriminant with the fixed takeover priority table
// ABOUTME: Higher-fidelity sources (device head units) outrank phone-relayed feeds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source that reported an activity
///
/// Names are normalized to lowercase at the ingestion boundary. Unknown
/// providers keep their name so the self-match guard can still compare them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    /// Garmin Connect
    Garmin,
    /// Wahoo cloud
    Wahoo,
    /// Strava
    Strava,
    /// Manually entered by the athlete
    Manual,
    /// Any other source
    Other(String),
}

impl Provider {
    /// Priority used to decide takeover versus merge
    ///
    /// garmin=100, wahoo=90, strava=50, manual=10, anything else 0.
    #[must_use]
    pub const fn priority(&self) -> u8 {
        match self {
            Self::Garmin => 100,
            Self::Wahoo => 90,
            Self::Strava => 50,
            Self::Manual => 10,
            Self::Other(_) => 0,
        }
    }

    /// Normalized provider name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Garmin => "garmin",
            Self::Wahoo => "wahoo",
            Self::Strava => "strava",
            Self::Manual => "manual",
            Self::Other(name) => name,
        }
    }

    /// Whether `self` outranks `other` strictly
    #[must_use]
    pub const fn outranks(&self, other: &Self) -> bool {
        self.priority() > other.priority()
    }
}

impl From<&str> for Provider {
    fn from(name: &str) -> Self {
        let normalized = name.trim().to_lowercase();
        match normalized.as_str() {
            "garmin" => Self::Garmin,
            "wahoo" => Self::Wahoo,
            "strava" => Self::Strava,
            "manual" => Self::Manual,
            _ => Self::Other(normalized),
        }
    }
}

impl From<String> for Provider {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<Provider> for String {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl FromStr for Provider {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
