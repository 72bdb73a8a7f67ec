// ABOUTME: Canonical activity model, best-effort tables, per-ride summaries, and audit trail
// ABOUTME: ActivityBuilder and ActivityData carry provider reports into the canonical shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{Provider, SportType};

/// Best mean-maximal power per duration (seconds → watts)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BestEfforts(BTreeMap<u32, f64>);

impl BestEfforts {
    /// Empty table
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Best power for an exact duration
    #[must_use]
    pub fn get(&self, duration_seconds: u32) -> Option<f64> {
        self.0.get(&duration_seconds).copied()
    }

    /// Record a value, keeping the higher one when the duration already exists
    pub fn record(&mut self, duration_seconds: u32, watts: f64) {
        if !watts.is_finite() || watts <= 0.0 {
            return;
        }
        self.0
            .entry(duration_seconds)
            .and_modify(|best| {
                if watts > *best {
                    *best = watts;
                }
            })
            .or_insert(watts);
    }

    /// Fold another table into this one (per-duration maximum)
    pub fn merge_max(&mut self, other: &Self) {
        for (&duration, &watts) in &other.0 {
            self.record(duration, watts);
        }
    }

    /// Iterate `(duration_seconds, watts)` in ascending duration order
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(&duration, &watts)| (duration, watts))
    }

    /// Whether the table holds no efforts
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of durations recorded
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(u32, f64)> for BestEfforts {
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (duration, watts) in iter {
            table.record(duration, watts);
        }
        table
    }
}

/// Per-second signals for one ride
///
/// Streams are transient: they feed per-ride analysis and are never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityStreams {
    /// Power in watts
    pub power: Option<Vec<f64>>,
    /// Heart rate in bpm
    pub heart_rate: Option<Vec<f64>>,
    /// Cadence in rpm
    pub cadence: Option<Vec<f64>>,
}

/// Compact per-ride analytics attached back onto an activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RideMetricsSummary {
    /// Normalized Power (watts)
    pub normalized_power: Option<f64>,
    /// NP / mean non-zero power
    pub variability_index: Option<f64>,
    /// NP / mean heart rate
    pub efficiency_factor: Option<f64>,
    /// NP / FTP
    pub intensity_factor: Option<f64>,
    /// Late-ride / early-ride power ratio
    pub fatigue_resistance_index: Option<f64>,
    /// Planned-versus-actual adherence, 0-100
    pub execution_score: Option<f64>,
}

impl RideMetricsSummary {
    /// Keep these values and fill the gaps from `reported`
    #[must_use]
    pub fn or_reported(self, reported: Option<&Self>) -> Self {
        let Some(reported) = reported else {
            return self;
        };
        Self {
            normalized_power: self.normalized_power.or(reported.normalized_power),
            variability_index: self.variability_index.or(reported.variability_index),
            efficiency_factor: self.efficiency_factor.or(reported.efficiency_factor),
            intensity_factor: self.intensity_factor.or(reported.intensity_factor),
            fatigue_resistance_index: self
                .fatigue_resistance_index
                .or(reported.fatigue_resistance_index),
            execution_score: self.execution_score.or(reported.execution_score),
        }
    }
}

/// Provider identity reference used in the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRef {
    /// Source provider
    pub provider: Provider,
    /// Provider-native activity id
    pub provider_activity_id: String,
}

/// One canonical-identity change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeoverRecord {
    /// Identity before the takeover
    pub from: ProviderRef,
    /// Identity after the takeover
    pub to: ProviderRef,
    /// When the takeover happened
    pub at: DateTime<Utc>,
}

/// One gap-filling merge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRecord {
    /// Provider whose data was merged in
    pub provider: Provider,
    /// Field names that were filled
    pub fields_filled: Vec<String>,
    /// When the merge happened
    pub at: DateTime<Utc>,
}

/// Source-specific payload plus the append-only provenance trail
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPayload {
    /// Provider-specific fields retained verbatim
    #[serde(default)]
    pub source_fields: Map<String, Value>,
    /// First provider identity ever recorded for this canonical record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_provider: Option<ProviderRef>,
    /// Identity takeovers, oldest first
    #[serde(default)]
    pub takeover_history: Vec<TakeoverRecord>,
    /// Merges, oldest first
    #[serde(default)]
    pub merge_history: Vec<MergeRecord>,
    /// Every provider that contributed data through a merge
    #[serde(default)]
    pub contributing_providers: Vec<Provider>,
}

/// One completed workout in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Canonical record id
    pub id: Uuid,
    /// Owning athlete
    pub athlete_id: Uuid,
    /// Source provider of the current canonical identity
    pub provider: Provider,
    /// Provider-native activity id
    pub provider_activity_id: String,
    /// Display name
    pub name: Option<String>,
    /// Activity kind
    pub sport_type: SportType,
    /// Start time
    pub start_date: DateTime<Utc>,
    /// Moving time in seconds
    pub moving_time_seconds: Option<u64>,
    /// Elapsed time in seconds
    pub elapsed_time_seconds: Option<u64>,
    /// Distance in meters
    pub distance_meters: Option<f64>,
    /// Elevation gain in meters
    pub elevation_gain: Option<f64>,
    /// Average power in watts
    pub average_power: Option<f64>,
    /// Max power in watts
    pub max_power: Option<f64>,
    /// Provider-reported Normalized Power
    pub normalized_power: Option<f64>,
    /// Mechanical work in kilojoules
    pub kilojoules: Option<f64>,
    /// Average heart rate in bpm
    pub average_heart_rate: Option<f64>,
    /// Max heart rate in bpm
    pub max_heart_rate: Option<f64>,
    /// Average cadence in rpm
    pub average_cadence: Option<f64>,
    /// Provider-declared stress score
    pub training_stress_score: Option<f64>,
    /// Encoded GPS polyline
    pub polyline: Option<String>,
    /// Hidden by the athlete
    pub hidden: bool,
    /// Canonical record this one duplicates, if superseded
    pub duplicate_of: Option<Uuid>,
    /// Best-effort power table from per-ride analysis
    pub best_efforts: Option<BestEfforts>,
    /// Per-ride analytics summary from per-ride analysis
    pub ride_metrics: Option<RideMetricsSummary>,
    /// Per-second signals (never persisted)
    #[serde(skip)]
    pub streams: Option<ActivityStreams>,
    /// Source fields and provenance trail
    pub raw_payload: RawPayload,
}

impl Activity {
    /// Duration used for load estimation: moving time, else elapsed time
    #[must_use]
    pub fn duration_seconds(&self) -> Option<u64> {
        self.moving_time_seconds
            .filter(|&seconds| seconds > 0)
            .or(self.elapsed_time_seconds)
    }

    /// Calendar day (UTC) the activity started on
    #[must_use]
    pub fn start_day(&self) -> NaiveDate {
        self.start_date.date_naive()
    }

    /// Whether this record is the canonical one for its ride
    #[must_use]
    pub const fn is_canonical(&self) -> bool {
        self.duplicate_of.is_none()
    }

    /// Whether `provider`/`provider_activity_id` name this very record
    #[must_use]
    pub fn is_same_report(&self, provider: &Provider, provider_activity_id: &str) -> bool {
        &self.provider == provider && self.provider_activity_id == provider_activity_id
    }
}

/// Metric fields reported by a provider for takeover or merge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityData {
    /// Display name
    pub name: Option<String>,
    /// Activity kind
    pub sport_type: Option<SportType>,
    /// Start time
    pub start_date: Option<DateTime<Utc>>,
    /// Moving time in seconds
    pub moving_time_seconds: Option<u64>,
    /// Elapsed time in seconds
    pub elapsed_time_seconds: Option<u64>,
    /// Distance in meters
    pub distance_meters: Option<f64>,
    /// Elevation gain in meters
    pub elevation_gain: Option<f64>,
    /// Average power in watts
    pub average_power: Option<f64>,
    /// Max power in watts
    pub max_power: Option<f64>,
    /// Normalized Power in watts
    pub normalized_power: Option<f64>,
    /// Mechanical work in kilojoules
    pub kilojoules: Option<f64>,
    /// Average heart rate in bpm
    pub average_heart_rate: Option<f64>,
    /// Max heart rate in bpm
    pub max_heart_rate: Option<f64>,
    /// Average cadence in rpm
    pub average_cadence: Option<f64>,
    /// Provider-declared stress score
    pub training_stress_score: Option<f64>,
    /// Encoded GPS polyline
    pub polyline: Option<String>,
    /// Best-effort power table
    pub best_efforts: Option<BestEfforts>,
    /// Per-ride metric summary computed from streams
    pub ride_metrics: Option<RideMetricsSummary>,
    /// Provider-specific fields
    #[serde(default)]
    pub source_fields: Map<String, Value>,
}

impl From<&Activity> for ActivityData {
    fn from(activity: &Activity) -> Self {
        Self {
            name: activity.name.clone(),
            sport_type: Some(activity.sport_type.clone()),
            start_date: Some(activity.start_date),
            moving_time_seconds: activity.moving_time_seconds,
            elapsed_time_seconds: activity.elapsed_time_seconds,
            distance_meters: activity.distance_meters,
            elevation_gain: activity.elevation_gain,
            average_power: activity.average_power,
            max_power: activity.max_power,
            normalized_power: activity.normalized_power,
            kilojoules: activity.kilojoules,
            average_heart_rate: activity.average_heart_rate,
            max_heart_rate: activity.max_heart_rate,
            average_cadence: activity.average_cadence,
            training_stress_score: activity.training_stress_score,
            polyline: activity.polyline.clone(),
            best_efforts: activity.best_efforts.clone(),
            ride_metrics: activity.ride_metrics.clone(),
            source_fields: activity.raw_payload.source_fields.clone(),
        }
    }
}

/// Builder for canonical activities, mirroring how ingestion assembles them
#[derive(Debug, Clone)]
pub struct ActivityBuilder {
    activity: Activity,
}

impl ActivityBuilder {
    /// Start a builder with the fields every activity must have
    #[must_use]
    pub fn new(
        athlete_id: Uuid,
        provider: impl Into<Provider>,
        provider_activity_id: impl Into<String>,
        sport_type: SportType,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            activity: Activity {
                id: Uuid::new_v4(),
                athlete_id,
                provider: provider.into(),
                provider_activity_id: provider_activity_id.into(),
                name: None,
                sport_type,
                start_date,
                moving_time_seconds: None,
                elapsed_time_seconds: None,
                distance_meters: None,
                elevation_gain: None,
                average_power: None,
                max_power: None,
                normalized_power: None,
                kilojoules: None,
                average_heart_rate: None,
                max_heart_rate: None,
                average_cadence: None,
                training_stress_score: None,
                polyline: None,
                hidden: false,
                duplicate_of: None,
                best_efforts: None,
                ride_metrics: None,
                streams: None,
                raw_payload: RawPayload::default(),
            },
        }
    }

    /// Override the generated id
    #[must_use]
    pub const fn id(mut self, id: Uuid) -> Self {
        self.activity.id = id;
        self
    }

    /// Set display name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.activity.name = Some(name.into());
        self
    }

    /// Set moving time
    #[must_use]
    pub const fn moving_time_seconds(mut self, seconds: u64) -> Self {
        self.activity.moving_time_seconds = Some(seconds);
        self
    }

    /// Set elapsed time
    #[must_use]
    pub const fn elapsed_time_seconds(mut self, seconds: u64) -> Self {
        self.activity.elapsed_time_seconds = Some(seconds);
        self
    }

    /// Set distance
    #[must_use]
    pub const fn distance_meters(mut self, meters: f64) -> Self {
        self.activity.distance_meters = Some(meters);
        self
    }

    /// Set elevation gain
    #[must_use]
    pub const fn elevation_gain(mut self, meters: f64) -> Self {
        self.activity.elevation_gain = Some(meters);
        self
    }

    /// Set average power
    #[must_use]
    pub const fn average_power(mut self, watts: f64) -> Self {
        self.activity.average_power = Some(watts);
        self
    }

    /// Set max power
    #[must_use]
    pub const fn max_power(mut self, watts: f64) -> Self {
        self.activity.max_power = Some(watts);
        self
    }

    /// Set Normalized Power
    #[must_use]
    pub const fn normalized_power(mut self, watts: f64) -> Self {
        self.activity.normalized_power = Some(watts);
        self
    }

    /// Set kilojoules
    #[must_use]
    pub const fn kilojoules(mut self, kj: f64) -> Self {
        self.activity.kilojoules = Some(kj);
        self
    }

    /// Set average heart rate
    #[must_use]
    pub const fn average_heart_rate(mut self, bpm: f64) -> Self {
        self.activity.average_heart_rate = Some(bpm);
        self
    }

    /// Set max heart rate
    #[must_use]
    pub const fn max_heart_rate(mut self, bpm: f64) -> Self {
        self.activity.max_heart_rate = Some(bpm);
        self
    }

    /// Set average cadence
    #[must_use]
    pub const fn average_cadence(mut self, rpm: f64) -> Self {
        self.activity.average_cadence = Some(rpm);
        self
    }

    /// Set provider-declared stress
    #[must_use]
    pub const fn training_stress_score(mut self, tss: f64) -> Self {
        self.activity.training_stress_score = Some(tss);
        self
    }

    /// Set GPS polyline
    #[must_use]
    pub fn polyline(mut self, polyline: impl Into<String>) -> Self {
        self.activity.polyline = Some(polyline.into());
        self
    }

    /// Mark hidden
    #[must_use]
    pub const fn hidden(mut self, hidden: bool) -> Self {
        self.activity.hidden = hidden;
        self
    }

    /// Link as a duplicate of a canonical record
    #[must_use]
    pub const fn duplicate_of(mut self, canonical_id: Uuid) -> Self {
        self.activity.duplicate_of = Some(canonical_id);
        self
    }

    /// Attach a best-effort table
    #[must_use]
    pub fn best_efforts(mut self, efforts: BestEfforts) -> Self {
        self.activity.best_efforts = Some(efforts);
        self
    }

    /// Attach a per-ride analytics summary
    #[must_use]
    pub fn ride_metrics(mut self, summary: RideMetricsSummary) -> Self {
        self.activity.ride_metrics = Some(summary);
        self
    }

    /// Attach per-second streams
    #[must_use]
    pub fn streams(mut self, streams: ActivityStreams) -> Self {
        self.activity.streams = Some(streams);
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> Activity {
        self.activity
    }
}
