// ABOUTME: SQLite implementation of the activity, snapshot, and preference stores
// ABOUTME: Inline schema migration, JSON text columns for tables and audit trail, atomic upserts

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use ridelog_core::errors::DatabaseError;
use ridelog_core::models::{
    Activity, AthletePreferences, BestEfforts, FitnessSnapshot, Provider, RawPayload,
    RideMetricsSummary, SportType,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    ActivityQuery, ActivityStore, PreferenceStore, SnapshotStore, StoreResult,
};
use crate::config::DatabaseUrl;

const ACTIVITY_COLUMNS: &str = "id, athlete_id, provider, provider_activity_id, name, sport_type, \
     start_date, moving_time_seconds, elapsed_time_seconds, distance_meters, elevation_gain, \
     average_power, max_power, normalized_power, kilojoules, average_heart_rate, max_heart_rate, \
     average_cadence, training_stress_score, polyline, hidden, duplicate_of, best_efforts, \
     ride_metrics, raw_payload";

/// sqlx-backed store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, the connection fails,
    /// or the schema cannot be applied
    pub async fn connect(url: &DatabaseUrl) -> StoreResult<Self> {
        let pool = match url {
            // Each in-memory connection is its own database; keep exactly one
            DatabaseUrl::Memory => {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(SqliteConnectOptions::new().in_memory(true))
                    .await?
            }
            DatabaseUrl::SQLite { path } => {
                ensure_parent_dir(path)?;
                SqlitePoolOptions::new()
                    .connect_with(
                        SqliteConnectOptions::new()
                            .filename(path)
                            .create_if_missing(true),
                    )
                    .await?
            }
        };

        let store = Self { pool };
        store.migrate().await?;
        info!(database = %url, "SQLite store ready");
        Ok(store)
    }

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS activities (
                id TEXT PRIMARY KEY,
                athlete_id TEXT NOT NULL,
                provider TEXT NOT NULL,
                provider_activity_id TEXT NOT NULL,
                name TEXT,
                sport_type TEXT NOT NULL,
                start_date TEXT NOT NULL,
                moving_time_seconds INTEGER,
                elapsed_time_seconds INTEGER,
                distance_meters REAL,
                elevation_gain REAL,
                average_power REAL,
                max_power REAL,
                normalized_power REAL,
                kilojoules REAL,
                average_heart_rate REAL,
                max_heart_rate REAL,
                average_cadence REAL,
                training_stress_score REAL,
                polyline TEXT,
                hidden INTEGER NOT NULL DEFAULT 0,
                duplicate_of TEXT,
                best_efforts TEXT, -- JSON object: seconds -> watts
                ride_metrics TEXT, -- JSON object
                raw_payload TEXT NOT NULL, -- JSON: source fields + audit trail
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_activities_athlete_start \
             ON activities(athlete_id, start_date)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_activities_provider_ref \
             ON activities(athlete_id, provider, provider_activity_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS fitness_snapshots (
                athlete_id TEXT NOT NULL,
                week_start TEXT NOT NULL,
                ctl INTEGER NOT NULL,
                atl INTEGER NOT NULL,
                tsb INTEGER NOT NULL,
                training_status TEXT NOT NULL,
                ftp REAL,
                weekly_tss INTEGER NOT NULL,
                weekly_hours REAL NOT NULL,
                ride_count INTEGER NOT NULL,
                run_count INTEGER NOT NULL,
                weekly_distance_meters REAL NOT NULL,
                weekly_elevation_meters REAL NOT NULL,
                estimated_ftp REAL,
                ftp_estimation_method TEXT,
                ftp_confidence TEXT,
                monotony REAL,
                strain REAL,
                overtraining_risk TEXT,
                best_efforts TEXT NOT NULL, -- JSON object
                avg_efficiency_factor REAL,
                avg_variability_index REAL,
                avg_execution_score REAL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (athlete_id, week_start)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS athlete_preferences (
                athlete_id TEXT PRIMARY KEY,
                ftp REAL,
                resting_heart_rate REAL,
                max_heart_rate REAL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        debug!("SQLite schema migrated");
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> StoreResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::QueryError {
                context: format!("Failed to create {}: {e}", parent.display()),
            })
        }
        _ => Ok(()),
    }
}

/// Fixed-width UTC timestamps so text comparison matches time order
fn timestamp_text(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(field: &'static str, raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| DatabaseError::InvalidData {
            field,
            reason: e.to_string(),
        })
}

fn parse_uuid(field: &'static str, raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::InvalidData {
        field,
        reason: e.to_string(),
    })
}

fn column<'r, T>(row: &'r SqliteRow, name: &'static str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(|e| DatabaseError::InvalidData {
        field: name,
        reason: e.to_string(),
    })
}

fn json_text<T: Serialize>(value: &T) -> StoreResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn from_json_text<T: DeserializeOwned>(raw: Option<String>) -> StoreResult<Option<T>> {
    raw.map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(DatabaseError::from)
}

/// Enum columns hold the serde string form (`"high"`, `"blended"`, ...)
fn enum_from_text<T: DeserializeOwned>(
    field: &'static str,
    raw: Option<String>,
) -> StoreResult<Option<T>> {
    raw.map(|text| {
        serde_json::from_value(serde_json::Value::String(text)).map_err(|e| {
            DatabaseError::InvalidData {
                field,
                reason: e.to_string(),
            }
        })
    })
    .transpose()
}

fn optional_u64(raw: Option<i64>) -> Option<u64> {
    raw.and_then(|value| u64::try_from(value).ok())
}

fn optional_i64(raw: Option<u64>) -> Option<i64> {
    raw.and_then(|value| i64::try_from(value).ok())
}

fn row_to_activity(row: &SqliteRow) -> StoreResult<Activity> {
    let id: String = column(row, "id")?;
    let athlete_id: String = column(row, "athlete_id")?;
    let provider: String = column(row, "provider")?;
    let sport_type: String = column(row, "sport_type")?;
    let start_date: String = column(row, "start_date")?;
    let duplicate_of: Option<String> = column(row, "duplicate_of")?;
    let hidden: i64 = column(row, "hidden")?;
    let raw_payload: String = column(row, "raw_payload")?;

    Ok(Activity {
        id: parse_uuid("id", &id)?,
        athlete_id: parse_uuid("athlete_id", &athlete_id)?,
        provider: Provider::from(provider),
        provider_activity_id: column(row, "provider_activity_id")?,
        name: column(row, "name")?,
        sport_type: SportType::from_provider_string(&sport_type),
        start_date: parse_timestamp("start_date", &start_date)?,
        moving_time_seconds: optional_u64(column(row, "moving_time_seconds")?),
        elapsed_time_seconds: optional_u64(column(row, "elapsed_time_seconds")?),
        distance_meters: column(row, "distance_meters")?,
        elevation_gain: column(row, "elevation_gain")?,
        average_power: column(row, "average_power")?,
        max_power: column(row, "max_power")?,
        normalized_power: column(row, "normalized_power")?,
        kilojoules: column(row, "kilojoules")?,
        average_heart_rate: column(row, "average_heart_rate")?,
        max_heart_rate: column(row, "max_heart_rate")?,
        average_cadence: column(row, "average_cadence")?,
        training_stress_score: column(row, "training_stress_score")?,
        polyline: column(row, "polyline")?,
        hidden: hidden != 0,
        duplicate_of: duplicate_of
            .as_deref()
            .map(|raw| parse_uuid("duplicate_of", raw))
            .transpose()?,
        best_efforts: from_json_text::<BestEfforts>(column(row, "best_efforts")?)?,
        ride_metrics: from_json_text::<RideMetricsSummary>(column(row, "ride_metrics")?)?,
        streams: None,
        raw_payload: serde_json::from_str::<RawPayload>(&raw_payload)?,
    })
}

fn row_to_snapshot(row: &SqliteRow) -> StoreResult<FitnessSnapshot> {
    let athlete_id: String = column(row, "athlete_id")?;
    let week_start: String = column(row, "week_start")?;
    let training_status: Option<String> = column(row, "training_status")?;
    let ride_count: i64 = column(row, "ride_count")?;
    let run_count: i64 = column(row, "run_count")?;
    let best_efforts: Option<String> = column(row, "best_efforts")?;

    Ok(FitnessSnapshot {
        athlete_id: parse_uuid("athlete_id", &athlete_id)?,
        week_start: NaiveDate::parse_from_str(&week_start, "%Y-%m-%d").map_err(|e| {
            DatabaseError::InvalidData {
                field: "week_start",
                reason: e.to_string(),
            }
        })?,
        ctl: column(row, "ctl")?,
        atl: column(row, "atl")?,
        tsb: column(row, "tsb")?,
        training_status: enum_from_text("training_status", training_status)?.ok_or(
            DatabaseError::InvalidData {
                field: "training_status",
                reason: "missing".to_owned(),
            },
        )?,
        ftp: column(row, "ftp")?,
        weekly_tss: column(row, "weekly_tss")?,
        weekly_hours: column(row, "weekly_hours")?,
        ride_count: u32::try_from(ride_count).unwrap_or(0),
        run_count: u32::try_from(run_count).unwrap_or(0),
        weekly_distance_meters: column(row, "weekly_distance_meters")?,
        weekly_elevation_meters: column(row, "weekly_elevation_meters")?,
        estimated_ftp: column(row, "estimated_ftp")?,
        ftp_estimation_method: enum_from_text(
            "ftp_estimation_method",
            column(row, "ftp_estimation_method")?,
        )?,
        ftp_confidence: enum_from_text("ftp_confidence", column(row, "ftp_confidence")?)?,
        monotony: column(row, "monotony")?,
        strain: column(row, "strain")?,
        overtraining_risk: enum_from_text("overtraining_risk", column(row, "overtraining_risk")?)?,
        best_efforts: from_json_text(best_efforts)?.unwrap_or_default(),
        avg_efficiency_factor: column(row, "avg_efficiency_factor")?,
        avg_variability_index: column(row, "avg_variability_index")?,
        avg_execution_score: column(row, "avg_execution_score")?,
    })
}

#[async_trait]
impl ActivityStore for SqliteStore {
    async fn upsert_activity(&self, activity: &Activity) -> StoreResult<()> {
        let best_efforts = activity.best_efforts.as_ref().map(json_text).transpose()?;
        let ride_metrics = activity.ride_metrics.as_ref().map(json_text).transpose()?;
        let raw_payload = json_text(&activity.raw_payload)?;

        sqlx::query(
            r"
            INSERT INTO activities (
                id, athlete_id, provider, provider_activity_id, name, sport_type, start_date,
                moving_time_seconds, elapsed_time_seconds, distance_meters, elevation_gain,
                average_power, max_power, normalized_power, kilojoules, average_heart_rate,
                max_heart_rate, average_cadence, training_stress_score, polyline, hidden,
                duplicate_of, best_efforts, ride_metrics, raw_payload, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25, $26
            )
            ON CONFLICT(id) DO UPDATE SET
                athlete_id = excluded.athlete_id,
                provider = excluded.provider,
                provider_activity_id = excluded.provider_activity_id,
                name = excluded.name,
                sport_type = excluded.sport_type,
                start_date = excluded.start_date,
                moving_time_seconds = excluded.moving_time_seconds,
                elapsed_time_seconds = excluded.elapsed_time_seconds,
                distance_meters = excluded.distance_meters,
                elevation_gain = excluded.elevation_gain,
                average_power = excluded.average_power,
                max_power = excluded.max_power,
                normalized_power = excluded.normalized_power,
                kilojoules = excluded.kilojoules,
                average_heart_rate = excluded.average_heart_rate,
                max_heart_rate = excluded.max_heart_rate,
                average_cadence = excluded.average_cadence,
                training_stress_score = excluded.training_stress_score,
                polyline = excluded.polyline,
                hidden = excluded.hidden,
                duplicate_of = excluded.duplicate_of,
                best_efforts = excluded.best_efforts,
                ride_metrics = excluded.ride_metrics,
                raw_payload = excluded.raw_payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(activity.id.to_string())
        .bind(activity.athlete_id.to_string())
        .bind(activity.provider.as_str())
        .bind(&activity.provider_activity_id)
        .bind(&activity.name)
        .bind(activity.sport_type.as_str())
        .bind(timestamp_text(activity.start_date))
        .bind(optional_i64(activity.moving_time_seconds))
        .bind(optional_i64(activity.elapsed_time_seconds))
        .bind(activity.distance_meters)
        .bind(activity.elevation_gain)
        .bind(activity.average_power)
        .bind(activity.max_power)
        .bind(activity.normalized_power)
        .bind(activity.kilojoules)
        .bind(activity.average_heart_rate)
        .bind(activity.max_heart_rate)
        .bind(activity.average_cadence)
        .bind(activity.training_stress_score)
        .bind(&activity.polyline)
        .bind(i64::from(activity.hidden))
        .bind(activity.duplicate_of.map(|id| id.to_string()))
        .bind(best_efforts)
        .bind(ride_metrics)
        .bind(raw_payload)
        .bind(timestamp_text(Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_activity(&self, id: Uuid) -> StoreResult<Option<Activity>> {
        let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = $1");
        sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(row_to_activity)
            .transpose()
    }

    async fn query_activities(&self, query: &ActivityQuery) -> StoreResult<Vec<Activity>> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities
             WHERE athlete_id = $1
               AND ($2 IS NULL OR start_date >= $2)
               AND ($3 IS NULL OR start_date < $3)
               AND ($4 = 1 OR hidden = 0)
               AND ($5 = 1 OR duplicate_of IS NULL)
             ORDER BY start_date ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(query.athlete_id.to_string())
            .bind(query.start.map(timestamp_text))
            .bind(query.end.map(timestamp_text))
            .bind(i64::from(query.include_hidden))
            .bind(i64::from(query.include_duplicates))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_activity).collect()
    }

    async fn find_by_provider_id(
        &self,
        athlete_id: Uuid,
        provider: &Provider,
        provider_activity_id: &str,
    ) -> StoreResult<Option<Activity>> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities
             WHERE athlete_id = $1 AND provider = $2 AND provider_activity_id = $3
             ORDER BY duplicate_of IS NOT NULL, start_date ASC, id ASC
             LIMIT 1"
        );
        sqlx::query(&sql)
            .bind(athlete_id.to_string())
            .bind(provider.as_str())
            .bind(provider_activity_id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(row_to_activity)
            .transpose()
    }

    async fn earliest_activity_date(
        &self,
        athlete_id: Uuid,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        let earliest: Option<String> = sqlx::query_scalar(
            r"
            SELECT MIN(start_date) FROM activities
            WHERE athlete_id = $1 AND hidden = 0 AND duplicate_of IS NULL
            ",
        )
        .bind(athlete_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        earliest
            .as_deref()
            .map(|raw| parse_timestamp("start_date", raw))
            .transpose()
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn upsert_snapshot(&self, snapshot: &FitnessSnapshot) -> StoreResult<()> {
        sqlx::query(
            r"
            INSERT INTO fitness_snapshots (
                athlete_id, week_start, ctl, atl, tsb, training_status, ftp, weekly_tss,
                weekly_hours, ride_count, run_count, weekly_distance_meters,
                weekly_elevation_meters, estimated_ftp, ftp_estimation_method, ftp_confidence,
                monotony, strain, overtraining_risk, best_efforts, avg_efficiency_factor,
                avg_variability_index, avg_execution_score, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24
            )
            ON CONFLICT(athlete_id, week_start) DO UPDATE SET
                ctl = excluded.ctl,
                atl = excluded.atl,
                tsb = excluded.tsb,
                training_status = excluded.training_status,
                ftp = excluded.ftp,
                weekly_tss = excluded.weekly_tss,
                weekly_hours = excluded.weekly_hours,
                ride_count = excluded.ride_count,
                run_count = excluded.run_count,
                weekly_distance_meters = excluded.weekly_distance_meters,
                weekly_elevation_meters = excluded.weekly_elevation_meters,
                estimated_ftp = excluded.estimated_ftp,
                ftp_estimation_method = excluded.ftp_estimation_method,
                ftp_confidence = excluded.ftp_confidence,
                monotony = excluded.monotony,
                strain = excluded.strain,
                overtraining_risk = excluded.overtraining_risk,
                best_efforts = excluded.best_efforts,
                avg_efficiency_factor = excluded.avg_efficiency_factor,
                avg_variability_index = excluded.avg_variability_index,
                avg_execution_score = excluded.avg_execution_score,
                updated_at = excluded.updated_at
            ",
        )
        .bind(snapshot.athlete_id.to_string())
        .bind(snapshot.week_start.format("%Y-%m-%d").to_string())
        .bind(snapshot.ctl)
        .bind(snapshot.atl)
        .bind(snapshot.tsb)
        .bind(snapshot.training_status.as_str())
        .bind(snapshot.ftp)
        .bind(snapshot.weekly_tss)
        .bind(snapshot.weekly_hours)
        .bind(i64::from(snapshot.ride_count))
        .bind(i64::from(snapshot.run_count))
        .bind(snapshot.weekly_distance_meters)
        .bind(snapshot.weekly_elevation_meters)
        .bind(snapshot.estimated_ftp)
        .bind(snapshot.ftp_estimation_method.map(|method| method.as_str()))
        .bind(snapshot.ftp_confidence.map(|confidence| confidence.as_str()))
        .bind(snapshot.monotony)
        .bind(snapshot.strain)
        .bind(snapshot.overtraining_risk.map(|risk| risk.as_str()))
        .bind(json_text(&snapshot.best_efforts)?)
        .bind(snapshot.avg_efficiency_factor)
        .bind(snapshot.avg_variability_index)
        .bind(snapshot.avg_execution_score)
        .bind(timestamp_text(Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_snapshot(
        &self,
        athlete_id: Uuid,
        week_start: NaiveDate,
    ) -> StoreResult<Option<FitnessSnapshot>> {
        sqlx::query("SELECT * FROM fitness_snapshots WHERE athlete_id = $1 AND week_start = $2")
            .bind(athlete_id.to_string())
            .bind(week_start.format("%Y-%m-%d").to_string())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(row_to_snapshot)
            .transpose()
    }

    async fn list_snapshots(
        &self,
        athlete_id: Uuid,
        limit: Option<u32>,
    ) -> StoreResult<Vec<FitnessSnapshot>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map_or(-1, i64::from);
        let rows = sqlx::query(
            r"
            SELECT * FROM fitness_snapshots
            WHERE athlete_id = $1
            ORDER BY week_start DESC
            LIMIT $2
            ",
        )
        .bind(athlete_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_snapshot).collect()
    }
}

#[async_trait]
impl PreferenceStore for SqliteStore {
    async fn get_preferences(&self, athlete_id: Uuid) -> StoreResult<Option<AthletePreferences>> {
        let row = sqlx::query(
            "SELECT ftp, resting_heart_rate, max_heart_rate \
             FROM athlete_preferences WHERE athlete_id = $1",
        )
        .bind(athlete_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(AthletePreferences {
                ftp: column(&row, "ftp")?,
                resting_heart_rate: column(&row, "resting_heart_rate")?,
                max_heart_rate: column(&row, "max_heart_rate")?,
            })
        })
        .transpose()
    }

    async fn upsert_preferences(
        &self,
        athlete_id: Uuid,
        preferences: &AthletePreferences,
    ) -> StoreResult<()> {
        sqlx::query(
            r"
            INSERT INTO athlete_preferences (
                athlete_id, ftp, resting_heart_rate, max_heart_rate, updated_at
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(athlete_id) DO UPDATE SET
                ftp = excluded.ftp,
                resting_heart_rate = excluded.resting_heart_rate,
                max_heart_rate = excluded.max_heart_rate,
                updated_at = excluded.updated_at
            ",
        )
        .bind(athlete_id.to_string())
        .bind(preferences.ftp)
        .bind(preferences.resting_heart_rate)
        .bind(preferences.max_heart_rate)
        .bind(timestamp_text(Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
