// ABOUTME: Descriptive statistics helpers shared by per-ride and longitudinal analytics
// ABOUTME: Mean, population standard deviation, median, and interpolated percentiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ridelog Contributors

//! All helpers return `None` for empty input instead of `NaN`.

/// Arithmetic mean
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation
#[must_use]
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance = values
        .iter()
        .map(|value| {
            let diff = value - avg;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    Some(variance.sqrt())
}

/// Median (average of the two middle values for even-length input)
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Percentile with linear interpolation between closest ranks
///
/// `pct` is clamped to `[0, 100]`.
#[must_use]
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some((sorted[upper] - sorted[lower]).mul_add(weight, sorted[lower]))
}

/// Mean of each of `parts` contiguous chunks; the last chunk absorbs the remainder
///
/// Returns `None` when there are fewer samples than chunks.
#[must_use]
pub fn chunk_means(values: &[f64], parts: usize) -> Option<Vec<f64>> {
    if parts == 0 || values.len() < parts {
        return None;
    }
    let size = values.len() / parts;
    (0..parts)
        .map(|index| {
            let start = index * size;
            let end = if index + 1 == parts {
                values.len()
            } else {
                start + size
            };
            mean(&values[start..end])
        })
        .collect()
}
