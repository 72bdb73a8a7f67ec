// ABOUTME: Intelligence enums shared between the analytics crate and persisted snapshots
// ABOUTME: FTP estimation method/confidence, overtraining risk, and TSB-derived form status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Evidence an FTP estimate was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FtpEstimationMethod {
    /// 95% of best 20-minute power
    TwentyMinute,
    /// 75% of best 5-minute power
    FiveMinute,
    /// Best 60-minute power taken directly
    SixtyMinute,
    /// 40% 20-minute-derived plus 60% 60-minute power
    Blended,
}

impl FtpEstimationMethod {
    /// Stable label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TwentyMinute => "twenty_minute",
            Self::FiveMinute => "five_minute",
            Self::SixtyMinute => "sixty_minute",
            Self::Blended => "blended",
        }
    }
}

/// Confidence attached to an FTP estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FtpConfidence {
    /// Derived from short efforts only
    Moderate,
    /// Derived from a threshold-length effort
    High,
    /// Backed by a full hour of evidence
    VeryHigh,
}

impl FtpConfidence {
    /// Stable label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }
}

/// Banister monotony/strain risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertrainingRisk {
    /// No concern
    Low,
    /// Monotony creeping up
    Watch,
    /// Either monotony or strain elevated
    Moderate,
    /// Both monotony and strain elevated
    High,
}

impl OvertrainingRisk {
    /// Stable label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Watch => "watch",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl fmt::Display for OvertrainingRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form interpretation of Training Stress Balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    /// TSB below -10: accumulated fatigue, recovery needed
    Overreaching,
    /// TSB between -10 and 0: building fitness
    Productive,
    /// TSB between 0 and 10: rested and ready
    Fresh,
    /// TSB above 10: losing fitness
    Detraining,
}

impl TrainingStatus {
    /// Interpret a TSB value
    #[must_use]
    pub fn from_tsb(tsb: f64) -> Self {
        if tsb < -10.0 {
            Self::Overreaching
        } else if tsb < 0.0 {
            Self::Productive
        } else if tsb <= 10.0 {
            Self::Fresh
        } else {
            Self::Detraining
        }
    }

    /// Stable label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overreaching => "overreaching",
            Self::Productive => "productive",
            Self::Fresh => "fresh",
            Self::Detraining => "detraining",
        }
    }
}
