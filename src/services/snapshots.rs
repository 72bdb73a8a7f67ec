// ABOUTME: Weekly fitness snapshot orchestration: compute, backfill, per-activity refresh, history
// ABOUTME: Pulls activities from storage, runs the pure analytics, and upserts one row per week
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use ridelog_core::constants::{load::MONOTONY_WINDOW_DAYS, snapshots::MAX_BACKFILL_WEEKS};
use ridelog_core::models::{Activity, BestEfforts, FitnessSnapshot, RideMetricsSummary};
use ridelog_intelligence::algorithms::{get_week_start, DailyStressSeries};
use ridelog_intelligence::longitudinal::{
    analyze_monotony, estimate_ftp_from_best, mmp_progression, DatedEfforts, MmpProgression,
    DEFAULT_MMP_WINDOW_DAYS,
};
use ridelog_intelligence::statistics::mean;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SnapshotConfig;
use crate::database::{ActivityQuery, ActivityStore, PreferenceStore, SnapshotStore};
use crate::errors::AppResult;

/// Shown when an athlete has no snapshots even after a backfill attempt
pub const NO_HISTORY_MESSAGE: &str = "No fitness history is available for this athlete yet";
/// What the athlete can do about an empty history
pub const NO_HISTORY_ACTION: &str = "Connect a data source or import activities, then retry";

/// A week that could not be computed during a backfill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillFailure {
    /// Monday of the failed week
    pub week_start: NaiveDate,
    /// Error text
    pub message: String,
}

/// Outcome of a multi-week backfill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Athlete the backfill ran for
    pub athlete_id: Uuid,
    /// Weeks asked for (after defaulting)
    pub weeks_requested: u32,
    /// Weeks attempted after clamping to the athlete's history depth
    pub weeks_processed: u32,
    /// Snapshots written
    pub snapshots_created: u32,
    /// Weeks that failed, most recent first
    pub errors: Vec<BackfillFailure>,
}

/// Snapshot listing returned to callers, with guidance when empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessHistory {
    /// Most recent first
    pub snapshots: Vec<FitnessSnapshot>,
    /// Whether an automatic backfill ran to produce this listing
    pub backfilled: bool,
    /// Explanation when `snapshots` is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Suggested next step when `snapshots` is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrective_action: Option<String>,
}

impl FitnessHistory {
    fn empty(backfilled: bool) -> Self {
        Self {
            snapshots: Vec::new(),
            backfilled,
            message: Some(NO_HISTORY_MESSAGE.to_owned()),
            corrective_action: Some(NO_HISTORY_ACTION.to_owned()),
        }
    }

    /// Whether no snapshot is available
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Computes and persists weekly fitness snapshots
#[derive(Clone)]
pub struct SnapshotService {
    activities: Arc<dyn ActivityStore>,
    snapshots: Arc<dyn SnapshotStore>,
    preferences: Arc<dyn PreferenceStore>,
    config: SnapshotConfig,
}

impl SnapshotService {
    /// Create a service over the given stores
    #[must_use]
    pub fn new(
        activities: Arc<dyn ActivityStore>,
        snapshots: Arc<dyn SnapshotStore>,
        preferences: Arc<dyn PreferenceStore>,
        config: SnapshotConfig,
    ) -> Self {
        Self {
            activities,
            snapshots,
            preferences,
            config,
        }
    }

    /// Compute and upsert the snapshot for the week containing `week_start`
    ///
    /// The date is normalized to its Monday. Load uses the configured window
    /// (90 days by default) ending at the close of that week.
    ///
    /// # Errors
    ///
    /// Returns an error if reading activities or preferences, or writing the
    /// snapshot, fails
    pub async fn compute_weekly_snapshot(
        &self,
        athlete_id: Uuid,
        week_start: NaiveDate,
    ) -> AppResult<FitnessSnapshot> {
        let week_start = get_week_start(week_start);
        let week_end = week_start + Duration::days(7);
        let window_start = week_end - Duration::days(self.config.load_window_days);

        let query = ActivityQuery::for_athlete(athlete_id)
            .between(day_start(window_start), day_start(week_end));
        let activities = self.activities.query_activities(&query).await?;
        let preferences = self
            .preferences
            .get_preferences(athlete_id)
            .await?
            .unwrap_or_default();

        let series = DailyStressSeries::from_activities(&activities, window_start, week_end);
        let load = series.training_load();
        let week: Vec<&Activity> = activities
            .iter()
            .filter(|activity| activity.start_day() >= week_start)
            .collect();

        let mut best_efforts = BestEfforts::new();
        for efforts in activities.iter().filter_map(|a| a.best_efforts.as_ref()) {
            best_efforts.merge_max(efforts);
        }
        let ftp_estimate = estimate_ftp_from_best(&best_efforts, preferences.positive_ftp());
        let monotony = analyze_monotony(series.last(MONOTONY_WINDOW_DAYS));

        let snapshot = FitnessSnapshot {
            athlete_id,
            week_start,
            ctl: load.ctl,
            atl: load.atl,
            tsb: load.tsb,
            training_status: load.status,
            ftp: preferences.positive_ftp(),
            weekly_tss: series.last(7).iter().sum::<f64>().round() as i64,
            weekly_hours: week
                .iter()
                .filter_map(|activity| activity.duration_seconds())
                .sum::<u64>() as f64
                / 3600.0,
            ride_count: week.iter().filter(|a| a.sport_type.is_ride()).count() as u32,
            run_count: week.iter().filter(|a| a.sport_type.is_run()).count() as u32,
            weekly_distance_meters: week.iter().filter_map(|a| a.distance_meters).sum(),
            weekly_elevation_meters: week.iter().filter_map(|a| a.elevation_gain).sum(),
            estimated_ftp: ftp_estimate.as_ref().map(|estimate| estimate.estimated_ftp),
            ftp_estimation_method: ftp_estimate.as_ref().map(|estimate| estimate.method),
            ftp_confidence: ftp_estimate.as_ref().map(|estimate| estimate.confidence),
            monotony: monotony.as_ref().map(|analysis| analysis.current.monotony),
            strain: monotony.as_ref().map(|analysis| analysis.current.strain),
            overtraining_risk: monotony.as_ref().map(|analysis| analysis.risk),
            best_efforts,
            avg_efficiency_factor: weekly_mean(&week, |m| m.efficiency_factor),
            avg_variability_index: weekly_mean(&week, |m| m.variability_index),
            avg_execution_score: weekly_mean(&week, |m| m.execution_score),
        };

        self.snapshots.upsert_snapshot(&snapshot).await?;

        info!(
            athlete_id = %athlete_id,
            week_start = %week_start,
            activities = activities.len(),
            ctl = snapshot.ctl,
            atl = snapshot.atl,
            tsb = snapshot.tsb,
            weekly_tss = snapshot.weekly_tss,
            "Computed weekly fitness snapshot"
        );
        Ok(snapshot)
    }

    /// Backfill up to `weeks_back` weeks ending with the current week
    ///
    /// # Errors
    ///
    /// Returns an error only if the athlete's history depth cannot be read;
    /// per-week failures are collected in the report
    pub async fn backfill_snapshots(
        &self,
        athlete_id: Uuid,
        weeks_back: Option<u32>,
    ) -> AppResult<BackfillReport> {
        self.backfill_snapshots_as_of(athlete_id, weeks_back, Utc::now().date_naive())
            .await
    }

    /// Backfill relative to an explicit `today`
    ///
    /// Weeks are computed most recent first and never earlier than the week of
    /// the athlete's first activity. A failing week is logged and recorded;
    /// the remaining weeks still run.
    ///
    /// # Errors
    ///
    /// Returns an error only if the athlete's history depth cannot be read
    pub async fn backfill_snapshots_as_of(
        &self,
        athlete_id: Uuid,
        weeks_back: Option<u32>,
        today: NaiveDate,
    ) -> AppResult<BackfillReport> {
        let weeks_requested = weeks_back
            .unwrap_or(self.config.default_backfill_weeks)
            .clamp(1, MAX_BACKFILL_WEEKS);
        let current_week = get_week_start(today);

        let mut report = BackfillReport {
            athlete_id,
            weeks_requested,
            weeks_processed: 0,
            snapshots_created: 0,
            errors: Vec::new(),
        };

        let Some(earliest) = self.activities.earliest_activity_date(athlete_id).await? else {
            debug!(athlete_id = %athlete_id, "No activities; nothing to backfill");
            return Ok(report);
        };

        let first_week = get_week_start(earliest.date_naive());
        let available_weeks = ((current_week - first_week).num_days() / 7 + 1).max(0);
        report.weeks_processed = u32::try_from(available_weeks)
            .map_or(weeks_requested, |weeks| weeks.min(weeks_requested));

        for offset in 0..report.weeks_processed {
            let week_start = current_week - Duration::weeks(i64::from(offset));
            match self.compute_weekly_snapshot(athlete_id, week_start).await {
                Ok(_) => report.snapshots_created += 1,
                Err(e) => {
                    warn!(
                        athlete_id = %athlete_id,
                        week_start = %week_start,
                        error = %e,
                        "Weekly snapshot failed during backfill"
                    );
                    report.errors.push(BackfillFailure {
                        week_start,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            athlete_id = %athlete_id,
            weeks_requested = report.weeks_requested,
            weeks_processed = report.weeks_processed,
            snapshots_created = report.snapshots_created,
            failures = report.errors.len(),
            "Snapshot backfill finished"
        );
        Ok(report)
    }

    /// Recompute exactly the week containing `activity_date`
    ///
    /// # Errors
    ///
    /// Returns an error if the recomputation fails
    pub async fn update_snapshot_for_activity(
        &self,
        athlete_id: Uuid,
        activity_date: DateTime<Utc>,
    ) -> AppResult<FitnessSnapshot> {
        self.compute_weekly_snapshot(athlete_id, activity_date.date_naive())
            .await
    }

    /// Most recent `weeks` snapshots, backfilling once when none exist
    ///
    /// # Errors
    ///
    /// Returns an error if listing snapshots fails
    pub async fn fitness_history(
        &self,
        athlete_id: Uuid,
        weeks: u32,
    ) -> AppResult<FitnessHistory> {
        self.fitness_history_as_of(athlete_id, weeks, Utc::now().date_naive())
            .await
    }

    /// [`Self::fitness_history`] with an explicit `today` for the backfill
    ///
    /// # Errors
    ///
    /// Returns an error if listing snapshots or reading history depth fails
    pub async fn fitness_history_as_of(
        &self,
        athlete_id: Uuid,
        weeks: u32,
        today: NaiveDate,
    ) -> AppResult<FitnessHistory> {
        let limit = Some(weeks.max(1));
        let snapshots = self.snapshots.list_snapshots(athlete_id, limit).await?;
        if !snapshots.is_empty() {
            return Ok(FitnessHistory {
                snapshots,
                backfilled: false,
                message: None,
                corrective_action: None,
            });
        }

        info!(athlete_id = %athlete_id, weeks, "No snapshots stored; attempting backfill");
        self.backfill_snapshots_as_of(athlete_id, Some(weeks), today)
            .await?;

        let snapshots = self.snapshots.list_snapshots(athlete_id, limit).await?;
        if snapshots.is_empty() {
            return Ok(FitnessHistory::empty(true));
        }
        Ok(FitnessHistory {
            snapshots,
            backfilled: true,
            message: None,
            corrective_action: None,
        })
    }

    /// Power-curve progression over the athlete's whole visible history
    ///
    /// `window_days` defaults to 90. Returns `None` when no ride carries best
    /// efforts.
    ///
    /// # Errors
    ///
    /// Returns an error if reading activities fails
    pub async fn power_curve_progression(
        &self,
        athlete_id: Uuid,
        window_days: Option<i64>,
    ) -> AppResult<Option<MmpProgression>> {
        let activities = self
            .activities
            .query_activities(&ActivityQuery::for_athlete(athlete_id))
            .await?;
        let history: Vec<DatedEfforts> = activities
            .iter()
            .filter_map(|activity| {
                activity.best_efforts.as_ref().map(|efforts| DatedEfforts {
                    date: activity.start_day(),
                    efforts: efforts.clone(),
                })
            })
            .collect();

        let window_days = window_days.unwrap_or(DEFAULT_MMP_WINDOW_DAYS);
        let progression = mmp_progression(&history, window_days);
        debug!(
            athlete_id = %athlete_id,
            rides_with_efforts = history.len(),
            direction = ?progression.as_ref().and_then(|p| p.direction),
            "Computed power-curve progression"
        );
        Ok(progression)
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Mean of a per-ride summary metric over the week's analysed activities
fn weekly_mean<F>(week: &[&Activity], metric: F) -> Option<f64>
where
    F: Fn(&RideMetricsSummary) -> Option<f64>,
{
    let values: Vec<f64> = week
        .iter()
        .filter_map(|activity| activity.ride_metrics.as_ref())
        .filter_map(metric)
        .collect();
    mean(&values)
}
