//! Sample statistics shared by the estimators

use crate::error::{Result, VarError};

/// Percentile of an ascending-sorted sample using linear interpolation
///
/// `p` is a fraction in [0, 1]; the value is interpolated at rank
/// `p * (n - 1)` between the neighbouring order statistics.
pub(crate) fn interpolated_percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());

    let rank = p * (sorted.len() - 1) as f64;
    let lower_index = rank.floor() as usize;
    let upper_index = (lower_index + 1).min(sorted.len() - 1);
    let fraction = rank - lower_index as f64;

    let lower = sorted[lower_index];
    let upper = sorted[upper_index];
    let diff = upper - lower;

    // Interpolate from whichever end is closer to keep the result inside [lower, upper]
    let value = if fraction < 0.5 {
        lower + diff * fraction
    } else {
        upper - diff * (1.0 - fraction)
    };

    value.clamp(lower, upper)
}

/// Sort a copy of the sample ascending
pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample mean and standard deviation (n - 1 denominator)
pub(crate) fn mean_and_std(values: &[f64]) -> Result<(f64, f64)> {
    if values.len() < 2 {
        return Err(VarError::InsufficientData(format!(
            "Need at least 2 returns for standard deviation, got {}",
            values.len()
        )));
    }

    let mean = mean(values);
    let squared: f64 = values.iter().map(|r| (r - mean).powi(2)).sum();
    let variance = squared / (values.len() - 1) as f64;

    Ok((mean, variance.sqrt()))
}
