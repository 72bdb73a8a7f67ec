// ABOUTME: Activity ingestion pipeline: per-ride analysis, duplicate resolution, snapshot refresh
// ABOUTME: Turns one provider report into a canonical activity and keeps its week up to date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use ridelog_core::models::{
    Activity, ActivityBuilder, ActivityData, ActivityStreams, Provider, RideMetricsSummary,
    SportType,
};
use ridelog_intelligence::algorithms::get_week_start;
use ridelog_intelligence::longitudinal::{score_execution, WorkoutTargets};
use ridelog_intelligence::ride_analytics::{analyze_ride, RideContext, RideStreams};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::dedup::{DuplicateResolver, DuplicateVerdict, Resolution};
use super::snapshots::SnapshotService;
use crate::database::{ActivityStore, PreferenceStore};
use crate::errors::{AppError, AppResult};

/// One activity as reported by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    /// Reporting provider name
    pub provider: Provider,
    /// Provider-native activity id
    pub provider_activity_id: String,
    /// Reported fields; `sport_type` and `start_date` are required
    #[serde(flatten)]
    pub data: ActivityData,
    /// Optional per-second signals, analysed and then dropped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streams: Option<ActivityStreams>,
    /// Targets of the planned session this activity executed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned: Option<WorkoutTargets>,
}

/// What ingestion did with a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestAction {
    /// Stored as a new canonical activity
    Created,
    /// Took over an existing canonical activity
    TookOver,
    /// Filled gaps of an existing canonical activity
    Merged,
    /// Re-sync of a record already carrying this provider identity
    Refreshed,
}

/// Result of ingesting one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOutcome {
    /// Canonical activity id the report ended up in
    pub activity_id: Uuid,
    /// How the report was applied
    pub action: IngestAction,
    /// Monday of the refreshed snapshot week
    pub week_start: NaiveDate,
    /// Execution score stored on the activity, reported or computed from the plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_score: Option<f64>,
}

/// Ingests provider reports into the canonical history
#[derive(Clone)]
pub struct IngestService {
    activities: Arc<dyn ActivityStore>,
    preferences: Arc<dyn PreferenceStore>,
    resolver: DuplicateResolver,
    snapshots: SnapshotService,
}

impl IngestService {
    /// Create an ingestion pipeline
    #[must_use]
    pub fn new(
        activities: Arc<dyn ActivityStore>,
        preferences: Arc<dyn PreferenceStore>,
        resolver: DuplicateResolver,
        snapshots: SnapshotService,
    ) -> Self {
        Self {
            activities,
            preferences,
            resolver,
            snapshots,
        }
    }

    /// Analyse, deduplicate, store, and refresh the containing week
    ///
    /// A report whose provider identity is already stored updates that record
    /// in place instead of going through duplicate detection.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the report lacks a sport type or start
    /// time, or any store error
    pub async fn ingest(
        &self,
        athlete_id: Uuid,
        report: ActivityReport,
    ) -> AppResult<IngestOutcome> {
        let (sport_type, start_date) = required_fields(&report)?;
        let ActivityReport {
            provider,
            provider_activity_id,
            mut data,
            streams,
            planned,
        } = report;

        if let Some(streams) = &streams {
            self.attach_ride_analysis(athlete_id, streams, &mut data).await?;
        }

        let existing = self
            .activities
            .find_by_provider_id(athlete_id, &provider, &provider_activity_id)
            .await?;

        let (mut activity, action, previous_start) = if let Some(existing) = existing {
            let previous_start = existing.start_date;
            let refreshed = self.resolver.refresh(existing, &data).await?;
            (refreshed, IngestAction::Refreshed, Some(previous_start))
        } else {
            let (activity, action) = self
                .resolve(
                    athlete_id,
                    &provider,
                    &provider_activity_id,
                    sport_type,
                    start_date,
                    data,
                )
                .await?;
            (activity, action, None)
        };

        if let Some(planned) = &planned {
            self.score_against_plan(&mut activity, planned).await?;
        }

        let snapshot = self
            .snapshots
            .update_snapshot_for_activity(athlete_id, activity.start_date)
            .await?;

        // A refresh that moved the ride to another week leaves the old week stale
        if let Some(previous_start) = previous_start {
            if get_week_start(previous_start.date_naive()) != snapshot.week_start {
                self.snapshots
                    .update_snapshot_for_activity(athlete_id, previous_start)
                    .await?;
            }
        }

        let execution_score = activity
            .ride_metrics
            .as_ref()
            .and_then(|metrics| metrics.execution_score);

        info!(
            athlete_id = %athlete_id,
            activity_id = %activity.id,
            action = ?action,
            "Activity ingested"
        );
        Ok(IngestOutcome {
            activity_id: activity.id,
            action,
            week_start: snapshot.week_start,
            execution_score,
        })
    }

    async fn attach_ride_analysis(
        &self,
        athlete_id: Uuid,
        streams: &ActivityStreams,
        data: &mut ActivityData,
    ) -> AppResult<()> {
        let preferences = self
            .preferences
            .get_preferences(athlete_id)
            .await?
            .unwrap_or_default();
        let context = RideContext::from_preferences(&preferences);
        if let Some(analysis) = analyze_ride(RideStreams::from(streams), &context) {
            data.normalized_power = data.normalized_power.or(analysis.normalized_power);
            data.best_efforts = data.best_efforts.take().or_else(|| analysis.best_efforts.clone());
            data.ride_metrics = Some(analysis.summary().or_reported(data.ride_metrics.as_ref()));
        }
        Ok(())
    }

    async fn resolve(
        &self,
        athlete_id: Uuid,
        provider: &Provider,
        provider_activity_id: &str,
        sport_type: SportType,
        start_date: DateTime<Utc>,
        data: ActivityData,
    ) -> AppResult<(Activity, IngestAction)> {
        let verdict = self
            .resolver
            .check_for_duplicate(
                athlete_id,
                start_date,
                data.distance_meters,
                provider,
                provider_activity_id,
            )
            .await?;

        match verdict {
            DuplicateVerdict::Unique => {
                let activity = new_activity(
                    athlete_id,
                    provider,
                    provider_activity_id,
                    sport_type,
                    start_date,
                    data,
                );
                self.activities.upsert_activity(&activity).await?;
                Ok((activity, IngestAction::Created))
            }
            DuplicateVerdict::Duplicate(found) => match found.resolution {
                Resolution::Takeover => Ok((
                    self.resolver
                        .takeover(
                            found.existing_activity_id,
                            &data,
                            provider,
                            provider_activity_id,
                        )
                        .await?,
                    IngestAction::TookOver,
                )),
                Resolution::Merge => Ok((
                    self.resolver
                        .merge(found.existing_activity_id, &data, provider)
                        .await?,
                    IngestAction::Merged,
                )),
            },
        }
    }

    /// Score the stored activity against its plan and persist the score
    async fn score_against_plan(
        &self,
        activity: &mut Activity,
        planned: &WorkoutTargets,
    ) -> AppResult<()> {
        let actual = WorkoutTargets::from_activity(activity);
        let Some(execution) = score_execution(planned, &actual) else {
            debug!(activity_id = %activity.id, "Plan has no scorable targets");
            return Ok(());
        };

        activity
            .ride_metrics
            .get_or_insert_with(RideMetricsSummary::default)
            .execution_score = Some(execution.score);
        self.activities.upsert_activity(activity).await?;

        debug!(
            activity_id = %activity.id,
            score = execution.score,
            rating = ?execution.rating,
            "Execution scored against plan"
        );
        Ok(())
    }
}

fn required_fields(report: &ActivityReport) -> AppResult<(SportType, DateTime<Utc>)> {
    let sport_type = report.data.sport_type.clone().ok_or_else(|| {
        AppError::invalid_input(format!(
            "Activity {} from {} has no sport_type",
            report.provider_activity_id, report.provider
        ))
    })?;
    let start_date = report.data.start_date.ok_or_else(|| {
        AppError::invalid_input(format!(
            "Activity {} from {} has no start_date",
            report.provider_activity_id, report.provider
        ))
    })?;
    Ok((sport_type, start_date))
}

fn new_activity(
    athlete_id: Uuid,
    provider: &Provider,
    provider_activity_id: &str,
    sport_type: SportType,
    start_date: DateTime<Utc>,
    data: ActivityData,
) -> Activity {
    let mut activity = ActivityBuilder::new(
        athlete_id,
        provider.clone(),
        provider_activity_id,
        sport_type,
        start_date,
    )
    .build();
    activity.name = data.name;
    activity.moving_time_seconds = data.moving_time_seconds;
    activity.elapsed_time_seconds = data.elapsed_time_seconds;
    activity.distance_meters = data.distance_meters;
    activity.elevation_gain = data.elevation_gain;
    activity.average_power = data.average_power;
    activity.max_power = data.max_power;
    activity.normalized_power = data.normalized_power;
    activity.kilojoules = data.kilojoules;
    activity.average_heart_rate = data.average_heart_rate;
    activity.max_heart_rate = data.max_heart_rate;
    activity.average_cadence = data.average_cadence;
    activity.training_stress_score = data.training_stress_score;
    activity.polyline = data.polyline;
    activity.best_efforts = data.best_efforts;
    activity.ride_metrics = data.ride_metrics;
    activity.raw_payload.source_fields = data.source_fields;
    activity
}
