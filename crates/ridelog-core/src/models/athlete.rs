// ABOUTME: Athlete physiological preferences used by load and per-ride analytics
// ABOUTME: FTP, resting heart rate, and max heart rate, each optional

use serde::{Deserialize, Serialize};

/// Resting heart rate assumed when the athlete has not declared one
pub const DEFAULT_RESTING_HEART_RATE: f64 = 50.0;

/// Athlete-declared physiology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AthletePreferences {
    /// Functional Threshold Power in watts
    pub ftp: Option<f64>,
    /// Resting heart rate in bpm
    pub resting_heart_rate: Option<f64>,
    /// Maximum heart rate in bpm
    pub max_heart_rate: Option<f64>,
}

impl AthletePreferences {
    /// Resting heart rate, falling back to the default
    #[must_use]
    pub fn resting_heart_rate_or_default(&self) -> f64 {
        self.resting_heart_rate
            .filter(|&hr| hr > 0.0)
            .unwrap_or(DEFAULT_RESTING_HEART_RATE)
    }

    /// FTP when declared and positive
    #[must_use]
    pub fn positive_ftp(&self) -> Option<f64> {
        self.ftp.filter(|&ftp| ftp > 0.0)
    }
}
