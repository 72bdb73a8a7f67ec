// ABOUTME: Athlete preference commands for ridelog-cli
// ABOUTME: Stores FTP and heart-rate settings used by snapshots and per-ride analysis

use ridelog::errors::{AppError, AppResult};
use ridelog::models::AthletePreferences;
use uuid::Uuid;

use super::Engine;
use crate::helpers::output::print_json;

/// Update the given preference fields, keeping the others
pub async fn set(
    engine: &Engine,
    athlete: Uuid,
    ftp: Option<f64>,
    resting_hr: Option<f64>,
    max_hr: Option<f64>,
) -> AppResult<()> {
    if [ftp, resting_hr, max_hr].iter().flatten().any(|value| *value <= 0.0) {
        return Err(AppError::invalid_input("Preferences must be positive"));
    }

    let mut preferences = engine
        .stores
        .preferences
        .get_preferences(athlete)
        .await?
        .unwrap_or_default();
    preferences.ftp = ftp.or(preferences.ftp);
    preferences.resting_heart_rate = resting_hr.or(preferences.resting_heart_rate);
    preferences.max_heart_rate = max_hr.or(preferences.max_heart_rate);

    engine
        .stores
        .preferences
        .upsert_preferences(athlete, &preferences)
        .await?;
    print_json(&preferences)
}

/// Print stored preferences (defaults when none)
pub async fn show(engine: &Engine, athlete: Uuid) -> AppResult<()> {
    let preferences: AthletePreferences = engine
        .stores
        .preferences
        .get_preferences(athlete)
        .await?
        .unwrap_or_default();
    print_json(&preferences)
}
