// ABOUTME: Weekly fitness snapshot persisted per athlete and ISO week
// ABOUTME: Holds CTL/ATL/TSB, weekly totals, and longitudinal analytics outputs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BestEfforts;
use crate::intelligence::{FtpConfidence, FtpEstimationMethod, OvertrainingRisk, TrainingStatus};

/// One row per (athlete, week starting Monday)
///
/// Recomputing a week replaces the previous row wholesale. The struct carries
/// no wall-clock timestamp, so recomputation over unchanged data is
/// field-identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessSnapshot {
    /// Owning athlete
    pub athlete_id: Uuid,
    /// Monday of the ISO week
    pub week_start: NaiveDate,
    /// Chronic Training Load (fitness)
    pub ctl: i64,
    /// Acute Training Load (fatigue)
    pub atl: i64,
    /// Training Stress Balance (form)
    pub tsb: i64,
    /// Form interpretation of TSB
    pub training_status: TrainingStatus,
    /// Athlete's declared FTP at computation time
    pub ftp: Option<f64>,
    /// Summed stress for the week
    pub weekly_tss: i64,
    /// Summed duration for the week in hours
    pub weekly_hours: f64,
    /// Rides in the week
    pub ride_count: u32,
    /// Runs in the week
    pub run_count: u32,
    /// Distance in meters for the week
    pub weekly_distance_meters: f64,
    /// Elevation gain in meters for the week
    pub weekly_elevation_meters: f64,
    /// FTP estimated from recent best efforts
    pub estimated_ftp: Option<f64>,
    /// Evidence behind `estimated_ftp`
    pub ftp_estimation_method: Option<FtpEstimationMethod>,
    /// Confidence of `estimated_ftp`
    pub ftp_confidence: Option<FtpConfidence>,
    /// Banister monotony for the trailing 7 days
    pub monotony: Option<f64>,
    /// Banister strain for the trailing 7 days
    pub strain: Option<f64>,
    /// Risk band from monotony and strain
    pub overtraining_risk: Option<OvertrainingRisk>,
    /// Best efforts across the trailing load window
    pub best_efforts: BestEfforts,
    /// Mean efficiency factor across the week's analysed rides
    pub avg_efficiency_factor: Option<f64>,
    /// Mean variability index across the week's analysed rides
    pub avg_variability_index: Option<f64>,
    /// Mean execution score across the week's scored workouts
    pub avg_execution_score: Option<f64>,
}
