// ABOUTME: Cross-provider duplicate detection with priority-based takeover or gap-filling merge
// ABOUTME: Keeps one canonical activity per real-world ride and an append-only audit trail
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

//! # Duplicate Resolution
//!
//! The same ride often arrives from several providers (head unit, phone app,
//! aggregator). An incoming report matches a canonical activity when it
//! starts within the configured window and its distance agrees within
//! tolerance. A strictly higher-priority provider takes over the record's
//! identity and metrics; anything else only fills gaps.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use ridelog_core::models::{
    Activity, ActivityData, MergeRecord, Provider, ProviderRef, TakeoverRecord,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DedupConfig;
use crate::database::{ActivityQuery, ActivityStore};
use crate::errors::{AppError, AppResult};

/// How a matched report is folded into the canonical record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Incoming provider outranks the stored one and replaces its identity
    Takeover,
    /// Incoming data only fills fields the canonical record lacks
    Merge,
}

/// Canonical activity an incoming report was matched against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    /// Canonical record id
    pub existing_activity_id: Uuid,
    /// Provider currently owning the canonical record
    pub existing_provider: Provider,
    /// Absolute start-time difference in seconds
    pub time_difference_seconds: i64,
    /// Absolute distance difference in meters when both are known
    pub distance_difference_meters: Option<f64>,
    /// What to do with the incoming report
    pub resolution: Resolution,
}

/// Result of a duplicate check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum DuplicateVerdict {
    /// No canonical activity matches; store the report as new
    Unique,
    /// Matches an existing canonical activity
    Duplicate(DuplicateMatch),
}

impl DuplicateVerdict {
    /// Whether a match was found
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }

    /// The match, if any
    #[must_use]
    pub const fn matched(&self) -> Option<&DuplicateMatch> {
        match self {
            Self::Duplicate(found) => Some(found),
            Self::Unique => None,
        }
    }
}

/// Detects duplicates and applies takeover or merge to canonical activities
#[derive(Clone)]
pub struct DuplicateResolver {
    activities: Arc<dyn ActivityStore>,
    config: DedupConfig,
}

impl DuplicateResolver {
    /// Create a resolver over an activity store
    #[must_use]
    pub fn new(activities: Arc<dyn ActivityStore>, config: DedupConfig) -> Self {
        Self { activities, config }
    }

    /// Look for a canonical activity describing the same ride
    ///
    /// Hidden activities are still candidates. A report never matches the
    /// record it came from (same provider and provider id). When several
    /// candidates qualify the closest start time wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the activity query fails
    pub async fn check_for_duplicate(
        &self,
        athlete_id: Uuid,
        start_time: DateTime<Utc>,
        distance_meters: Option<f64>,
        provider: &Provider,
        provider_activity_id: &str,
    ) -> AppResult<DuplicateVerdict> {
        let window = Duration::seconds(self.config.window_seconds);
        // Upper bound is exclusive; widen by a second and filter exactly below
        let query = ActivityQuery::for_athlete(athlete_id)
            .between(start_time - window, start_time + window + Duration::seconds(1))
            .include_hidden(true);
        let candidates = self.activities.query_activities(&query).await?;

        let best = candidates
            .iter()
            .filter(|candidate| !candidate.is_same_report(provider, provider_activity_id))
            .filter_map(|candidate| self.compare(candidate, start_time, distance_meters))
            .min_by_key(|(_, seconds, _)| *seconds);

        let Some((existing, time_difference_seconds, distance_difference_meters)) = best else {
            debug!(
                athlete_id = %athlete_id,
                provider = %provider,
                provider_activity_id,
                "No duplicate found"
            );
            return Ok(DuplicateVerdict::Unique);
        };

        let resolution = if provider.outranks(&existing.provider) {
            Resolution::Takeover
        } else {
            Resolution::Merge
        };

        info!(
            athlete_id = %athlete_id,
            existing_activity_id = %existing.id,
            existing_provider = %existing.provider,
            incoming_provider = %provider,
            time_difference_seconds,
            resolution = ?resolution,
            "Duplicate activity detected"
        );

        Ok(DuplicateVerdict::Duplicate(DuplicateMatch {
            existing_activity_id: existing.id,
            existing_provider: existing.provider.clone(),
            time_difference_seconds,
            distance_difference_meters,
            resolution,
        }))
    }

    /// Time and distance deltas when `candidate` is within tolerance
    fn compare<'a>(
        &self,
        candidate: &'a Activity,
        start_time: DateTime<Utc>,
        distance_meters: Option<f64>,
    ) -> Option<(&'a Activity, i64, Option<f64>)> {
        let seconds = (candidate.start_date - start_time).num_seconds().abs();
        if seconds > self.config.window_seconds {
            return None;
        }

        let distance_difference = match (distance_meters, candidate.distance_meters) {
            (Some(incoming), Some(existing)) => {
                let difference = (incoming - existing).abs();
                if difference > self.config.distance_tolerance(incoming) {
                    return None;
                }
                Some(difference)
            }
            _ => None,
        };

        Some((candidate, seconds, distance_difference))
    }

    /// Replace the canonical record's provider identity and metrics
    ///
    /// Fields absent from `new_data` keep their stored values. The first
    /// provider ever recorded is preserved in the audit trail.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if `existing_id` does not exist, or a
    /// database error if the read or write fails
    pub async fn takeover(
        &self,
        existing_id: Uuid,
        new_data: &ActivityData,
        new_provider: &Provider,
        new_provider_activity_id: &str,
    ) -> AppResult<Activity> {
        let mut activity = self.load(existing_id).await?;

        let previous = ProviderRef {
            provider: activity.provider.clone(),
            provider_activity_id: activity.provider_activity_id.clone(),
        };
        let incoming = ProviderRef {
            provider: new_provider.clone(),
            provider_activity_id: new_provider_activity_id.to_owned(),
        };

        let payload = &mut activity.raw_payload;
        if payload.original_provider.is_none() {
            payload.original_provider = Some(previous.clone());
        }
        payload.takeover_history.push(TakeoverRecord {
            from: previous.clone(),
            to: incoming,
            at: Utc::now(),
        });
        payload
            .source_fields
            .extend(new_data.source_fields.iter().map(|(k, v)| (k.clone(), v.clone())));

        activity.provider = new_provider.clone();
        activity.provider_activity_id = new_provider_activity_id.to_owned();
        overwrite_metrics(&mut activity, new_data);

        self.activities.upsert_activity(&activity).await?;

        info!(
            activity_id = %existing_id,
            from_provider = %previous.provider,
            to_provider = %new_provider,
            "Provider takeover applied"
        );
        Ok(activity)
    }

    /// Fill only the gaps of the canonical record from a lower-priority report
    ///
    /// Existing values are never overwritten. The contributing provider and
    /// the filled field names are appended to the audit trail.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if `existing_id` does not exist, or a
    /// database error if the read or write fails
    pub async fn merge(
        &self,
        existing_id: Uuid,
        new_data: &ActivityData,
        new_provider: &Provider,
    ) -> AppResult<Activity> {
        let mut activity = self.load(existing_id).await?;

        let fields_filled = fill_missing(&mut activity, new_data);

        let payload = &mut activity.raw_payload;
        if !payload.contributing_providers.contains(new_provider) {
            payload.contributing_providers.push(new_provider.clone());
        }
        payload.merge_history.push(MergeRecord {
            provider: new_provider.clone(),
            fields_filled: fields_filled.clone(),
            at: Utc::now(),
        });

        self.activities.upsert_activity(&activity).await?;

        info!(
            activity_id = %existing_id,
            provider = %new_provider,
            fields_filled = ?fields_filled,
            "Merged provider data into canonical activity"
        );
        Ok(activity)
    }

    /// Apply a newer report from the provider identity `existing` already carries
    ///
    /// Reported fields replace stored ones. Id, identity, and audit trail are
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns a database error if the write fails
    pub async fn refresh(
        &self,
        mut existing: Activity,
        new_data: &ActivityData,
    ) -> AppResult<Activity> {
        existing
            .raw_payload
            .source_fields
            .extend(new_data.source_fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        overwrite_metrics(&mut existing, new_data);

        self.activities.upsert_activity(&existing).await?;

        info!(
            activity_id = %existing.id,
            provider = %existing.provider,
            provider_activity_id = %existing.provider_activity_id,
            "Refreshed activity from re-synced report"
        );
        Ok(existing)
    }

    async fn load(&self, id: Uuid) -> AppResult<Activity> {
        self.activities
            .get_activity(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Activity {id}")))
    }
}

fn overwrite_metrics(activity: &mut Activity, data: &ActivityData) {
    fn prefer<T: Clone>(slot: &mut Option<T>, incoming: Option<&T>) {
        if let Some(value) = incoming {
            *slot = Some(value.clone());
        }
    }

    if let Some(sport_type) = &data.sport_type {
        activity.sport_type = sport_type.clone();
    }
    if let Some(start_date) = data.start_date {
        activity.start_date = start_date;
    }
    prefer(&mut activity.name, data.name.as_ref());
    prefer(&mut activity.moving_time_seconds, data.moving_time_seconds.as_ref());
    prefer(&mut activity.elapsed_time_seconds, data.elapsed_time_seconds.as_ref());
    prefer(&mut activity.distance_meters, data.distance_meters.as_ref());
    prefer(&mut activity.elevation_gain, data.elevation_gain.as_ref());
    prefer(&mut activity.average_power, data.average_power.as_ref());
    prefer(&mut activity.max_power, data.max_power.as_ref());
    prefer(&mut activity.normalized_power, data.normalized_power.as_ref());
    prefer(&mut activity.kilojoules, data.kilojoules.as_ref());
    prefer(&mut activity.average_heart_rate, data.average_heart_rate.as_ref());
    prefer(&mut activity.max_heart_rate, data.max_heart_rate.as_ref());
    prefer(&mut activity.average_cadence, data.average_cadence.as_ref());
    prefer(&mut activity.training_stress_score, data.training_stress_score.as_ref());
    prefer(&mut activity.polyline, data.polyline.as_ref());
    prefer(&mut activity.best_efforts, data.best_efforts.as_ref());
    if let Some(metrics) = &data.ride_metrics {
        activity.ride_metrics = Some(metrics.clone().or_reported(activity.ride_metrics.as_ref()));
    }
}

/// Copy fields the record lacks; returns the names of fields filled
fn fill_missing(activity: &mut Activity, data: &ActivityData) -> Vec<String> {
    let mut filled = Vec::new();
    let mut fill = |name: &str, slot: &mut Option<f64>, incoming: Option<f64>| {
        if slot.is_none() {
            if let Some(value) = incoming {
                *slot = Some(value);
                filled.push(name.to_owned());
            }
        }
    };

    fill("average_power", &mut activity.average_power, data.average_power);
    fill("max_power", &mut activity.max_power, data.max_power);
    fill("normalized_power", &mut activity.normalized_power, data.normalized_power);
    fill("kilojoules", &mut activity.kilojoules, data.kilojoules);
    fill("average_heart_rate", &mut activity.average_heart_rate, data.average_heart_rate);
    fill("max_heart_rate", &mut activity.max_heart_rate, data.max_heart_rate);
    fill("average_cadence", &mut activity.average_cadence, data.average_cadence);

    if activity.polyline.is_none() {
        if let Some(polyline) = &data.polyline {
            activity.polyline = Some(polyline.clone());
            filled.push("polyline".to_owned());
        }
    }
    if activity.best_efforts.is_none() {
        if let Some(efforts) = &data.best_efforts {
            activity.best_efforts = Some(efforts.clone());
            filled.push("best_efforts".to_owned());
        }
    }
    if activity.ride_metrics.is_none() {
        if let Some(metrics) = &data.ride_metrics {
            activity.ride_metrics = Some(metrics.clone());
            filled.push("ride_metrics".to_owned());
        }
    }
    filled
}
