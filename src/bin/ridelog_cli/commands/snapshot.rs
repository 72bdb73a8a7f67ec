// ABOUTME: Snapshot commands for ridelog-cli
// ABOUTME: compute, backfill, update, history, and power-curve progression as JSON on stdout

use chrono::{DateTime, NaiveDate, Utc};
use ridelog::errors::{AppError, AppResult};
use ridelog_core::constants::load::MAX_LOAD_WINDOW_DAYS;
use tracing::warn;
use uuid::Uuid;

use super::Engine;
use crate::helpers::output::print_json;

/// Compute and print one weekly snapshot
pub async fn compute(engine: &Engine, athlete: Uuid, week: NaiveDate) -> AppResult<()> {
    let snapshot = engine
        .snapshots
        .compute_weekly_snapshot(athlete, week)
        .await?;
    print_json(&snapshot)
}

/// Backfill snapshots and print the report
pub async fn backfill(engine: &Engine, athlete: Uuid, weeks: Option<u32>) -> AppResult<()> {
    let report = engine.snapshots.backfill_snapshots(athlete, weeks).await?;
    if !report.errors.is_empty() {
        warn!(
            failures = report.errors.len(),
            "Some weeks could not be computed; see the errors field"
        );
    }
    print_json(&report)
}

/// Refresh the week containing an activity
pub async fn update(
    engine: &Engine,
    athlete: Uuid,
    activity_date: DateTime<Utc>,
) -> AppResult<()> {
    let snapshot = engine
        .snapshots
        .update_snapshot_for_activity(athlete, activity_date)
        .await?;
    print_json(&snapshot)
}

/// Print stored history, backfilling when empty
pub async fn history(engine: &Engine, athlete: Uuid, weeks: u32) -> AppResult<()> {
    let history = engine.snapshots.fitness_history(athlete, weeks).await?;
    print_json(&history)
}

/// Print how the power curve moved across the athlete's history
pub async fn progression(
    engine: &Engine,
    athlete: Uuid,
    window_days: Option<i64>,
) -> AppResult<()> {
    if window_days.is_some_and(|days| !(1..=MAX_LOAD_WINDOW_DAYS as i64).contains(&days)) {
        return Err(AppError::invalid_input(format!(
            "Window must be between 1 and {MAX_LOAD_WINDOW_DAYS} days"
        )));
    }

    let progression = engine
        .snapshots
        .power_curve_progression(athlete, window_days)
        .await?;
    if progression.is_none() {
        warn!(athlete_id = %athlete, "No rides with best efforts; nothing to compare");
    }
    print_json(&progression)
}
