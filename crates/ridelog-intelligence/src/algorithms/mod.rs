// ABOUTME: Load algorithms: per-activity stress estimation and CTL/ATL/TSB aggregation
// ABOUTME: Both operate on already-fetched data and never touch storage

//! Algorithm Module
//!
//! - [`tss`]: converts one activity into stress points
//! - [`training_load`]: aggregates a dense daily stress series into
//!   fitness (CTL), fatigue (ATL), and form (TSB)

pub mod training_load;
pub mod tss;

pub use training_load::{
    calculate_atl, calculate_ctl, calculate_tsb, decay_weighted_load, get_week_start,
    DailyStressSeries, TrainingLoad,
};
pub use tss::{estimate_stress, StressEstimate, StressEstimator, StressMethod};
