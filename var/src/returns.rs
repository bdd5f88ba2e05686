//! Period-over-period returns
//!
//! Converts an aligned [`PriceTable`] into simple returns per asset and
//! provides descriptive statistics over a return series.

use crate::error::{Result, VarError};
use crate::prices::PriceTable;
use crate::stats;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fractional returns aligned to the non-first dates of a price table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReturnSeriesData")]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct ReturnSeriesData {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TryFrom<ReturnSeriesData> for ReturnSeries {
    type Error = VarError;

    fn try_from(data: ReturnSeriesData) -> Result<Self> {
        Self::new(data.dates, data.values)
    }
}

impl ReturnSeries {
    /// Create a series; `dates` and `values` must have the same length
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(VarError::InvalidParameter(format!(
                "Return series has {} dates but {} values",
                dates.len(),
                values.len()
            )));
        }

        Ok(Self { dates, values })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (date, return) pairs
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

impl AsRef<[f64]> for ReturnSeries {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

/// Compute simple returns `(p[t] - p[t-1]) / p[t-1]` for every asset
///
/// Fails with `InsufficientData` when fewer than 2 aligned rows remain.
pub fn compute_returns(prices: &PriceTable) -> Result<BTreeMap<String, ReturnSeries>> {
    if prices.len() < 2 {
        return Err(VarError::InsufficientData(format!(
            "Need at least 2 aligned price rows, got {}",
            prices.len()
        )));
    }

    let dates = prices.dates()[1..].to_vec();

    prices
        .columns()
        .map(|(asset_id, column)| {
            let values = column
                .windows(2)
                .map(|w| (w[1] - w[0]) / w[0])
                .collect();
            Ok((asset_id.to_string(), ReturnSeries::new(dates.clone(), values)?))
        })
        .collect()
}

/// Growth of one unit of capital: running product of `1 + r`
pub fn cumulative_growth(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |wealth, r| {
            *wealth *= 1.0 + r;
            Some(*wealth)
        })
        .collect()
}

/// Descriptive statistics of a return series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std_dev: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ReturnSummary {
    /// Summarize a series of at least 2 returns
    pub fn from_returns(returns: &[f64]) -> Result<Self> {
        let (mean, std_dev) = stats::mean_and_std(returns)?;
        let sorted = stats::sorted(returns);

        Ok(Self {
            count: returns.len(),
            mean,
            std_dev,
            min: sorted[0],
            q25: stats::interpolated_percentile(&sorted, 0.25),
            median: stats::interpolated_percentile(&sorted, 0.5),
            q75: stats::interpolated_percentile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}
