// ABOUTME: Sport type enumeration for endurance activities
// ABOUTME: Groups provider activity kinds into ride and run families used by stress estimation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enumeration of supported sport/activity types
///
/// Provider-specific activity kinds are mapped onto these variants at the
/// ingestion boundary. The `Other` variant keeps the original label for kinds
/// that have no dedicated handling. Serde goes through the same mapping, so
/// provider JSON (`"Ride"`, `"trail_running"`) and stored labels both parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum SportType {
    /// Outdoor cycling
    Ride,
    /// Indoor/trainer cycling
    VirtualRide,
    /// Gravel cycling
    GravelRide,
    /// Mountain biking
    MountainBikeRide,
    /// Electric bike ride
    EbikeRide,
    /// Road or track running
    Run,
    /// Trail running
    TrailRun,
    /// Treadmill running
    VirtualRun,
    /// Swimming
    Swim,
    /// Walking
    Walk,
    /// Hiking
    Hike,
    /// Anything else, with the provider label preserved
    Other(String),
}

impl SportType {
    /// Map a provider activity label (`"Ride"`, `"TrailRun"`, `"running"`, ...)
    #[must_use]
    pub fn from_provider_string(provider_sport: &str) -> Self {
        match provider_sport {
            "Ride" | "ride" | "cycling" | "road_biking" | "Cycling" => Self::Ride,
            "VirtualRide" | "virtual_ride" | "indoor_cycling" => Self::VirtualRide,
            "GravelRide" | "gravel_ride" | "gravel_cycling" => Self::GravelRide,
            "MountainBikeRide" | "mountain_bike_ride" | "mountain_biking" => {
                Self::MountainBikeRide
            }
            "EBikeRide" | "EbikeRide" | "ebike_ride" | "e_bike_ride" => Self::EbikeRide,
            "Run" | "run" | "running" | "Running" | "street_running" => Self::Run,
            "TrailRun" | "trail_run" | "trail_running" => Self::TrailRun,
            "VirtualRun" | "virtual_run" | "treadmill_running" => Self::VirtualRun,
            "Swim" | "swim" | "lap_swimming" | "open_water_swimming" => Self::Swim,
            "Walk" | "walk" | "walking" => Self::Walk,
            "Hike" | "hike" | "hiking" => Self::Hike,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Stable storage label
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ride => "ride",
            Self::VirtualRide => "virtual_ride",
            Self::GravelRide => "gravel_ride",
            Self::MountainBikeRide => "mountain_bike_ride",
            Self::EbikeRide => "ebike_ride",
            Self::Run => "run",
            Self::TrailRun => "trail_run",
            Self::VirtualRun => "virtual_run",
            Self::Swim => "swim",
            Self::Walk => "walk",
            Self::Hike => "hike",
            Self::Other(name) => name,
        }
    }

    /// Cycling family (counted as rides in weekly snapshots)
    #[must_use]
    pub const fn is_ride(&self) -> bool {
        matches!(
            self,
            Self::Ride
                | Self::VirtualRide
                | Self::GravelRide
                | Self::MountainBikeRide
                | Self::EbikeRide
        )
    }

    /// Running family (stress estimated from pace and heart rate)
    #[must_use]
    pub const fn is_run(&self) -> bool {
        matches!(self, Self::Run | Self::TrailRun | Self::VirtualRun)
    }

    /// Trail runs get an extra terrain multiplier
    #[must_use]
    pub const fn is_trail_run(&self) -> bool {
        matches!(self, Self::TrailRun)
    }
}

impl fmt::Display for SportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SportType {
    fn from(label: String) -> Self {
        Self::from_provider_string(&label)
    }
}

impl From<SportType> for String {
    fn from(sport: SportType) -> Self {
        match sport {
            SportType::Other(label) => label,
            known => known.as_str().to_owned(),
        }
    }
}

impl FromStr for SportType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_provider_string(s))
    }
}
