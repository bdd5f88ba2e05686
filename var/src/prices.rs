//! Aligned daily price table
//!
//! A [`PriceTable`] holds one price column per asset over a shared, strictly
//! ascending date index. Tables are only ever built by aligning raw per-asset
//! series: a date survives only if every asset has a finite price on it.

use crate::error::{Result, VarError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Inclusive date window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First date kept (None = unbounded)
    #[serde(default)]
    pub start: Option<NaiveDate>,

    /// Last date kept (None = unbounded)
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Range with no bounds
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Raw price observations for a single asset
///
/// Observations may be unordered and may contain gaps (`None`) or non-finite
/// values; both are treated as missing during alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Asset identifier (e.g., "AAPL")
    pub asset_id: String,

    /// (date, price) observations
    pub observations: Vec<(NaiveDate, Option<f64>)>,
}

impl PriceSeries {
    pub fn new(asset_id: impl Into<String>, observations: Vec<(NaiveDate, Option<f64>)>) -> Self {
        Self {
            asset_id: asset_id.into(),
            observations,
        }
    }

    /// Build a series with no missing values
    pub fn complete(asset_id: impl Into<String>, observations: Vec<(NaiveDate, f64)>) -> Self {
        Self::new(
            asset_id,
            observations.into_iter().map(|(d, p)| (d, Some(p))).collect(),
        )
    }
}

/// Daily prices per asset, aligned on a common date index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PriceTableData")]
pub struct PriceTable {
    assets: Vec<String>,
    dates: Vec<NaiveDate>,
    /// Column-major: `prices[asset_index][row]`
    prices: Vec<Vec<f64>>,
}

/// Serialized form of [`PriceTable`], validated on the way in
#[derive(Deserialize)]
struct PriceTableData {
    assets: Vec<String>,
    dates: Vec<NaiveDate>,
    prices: Vec<Vec<f64>>,
}

impl TryFrom<PriceTableData> for PriceTable {
    type Error = VarError;

    fn try_from(data: PriceTableData) -> Result<Self> {
        if data.assets.len() != data.prices.len() {
            return Err(VarError::InvalidParameter(format!(
                "Price table has {} assets but {} price columns",
                data.assets.len(),
                data.prices.len()
            )));
        }

        Self::from_columns(data.dates, data.assets.into_iter().zip(data.prices).collect())
    }
}

impl PriceTable {
    /// Align raw series into a table
    ///
    /// Rows where any asset is missing a finite price are dropped entirely.
    /// Fails on duplicate assets, duplicate dates within an asset, or
    /// non-positive prices.
    pub fn align(series: Vec<PriceSeries>) -> Result<Self> {
        if series.is_empty() {
            return Err(VarError::InsufficientData(
                "No price series provided".to_string()
            ));
        }

        let mut seen = HashSet::new();
        let mut by_asset: Vec<(String, BTreeMap<NaiveDate, Option<f64>>)> =
            Vec::with_capacity(series.len());

        for s in series {
            if !seen.insert(s.asset_id.clone()) {
                return Err(VarError::InvalidParameter(format!(
                    "Duplicate asset {}",
                    s.asset_id
                )));
            }

            let mut points = BTreeMap::new();
            for (date, price) in s.observations {
                let price = price.filter(|p| p.is_finite());

                if let Some(p) = price {
                    if p <= 0.0 {
                        return Err(VarError::InvalidParameter(format!(
                            "Non-positive price {} for {} on {}",
                            p, s.asset_id, date
                        )));
                    }
                }

                if points.insert(date, price).is_some() {
                    return Err(VarError::InvalidParameter(format!(
                        "Duplicate date {} for {}",
                        date, s.asset_id
                    )));
                }
            }

            by_asset.push((s.asset_id, points));
        }

        // Inner join on dates where every asset has a price
        let mut dates: BTreeSet<NaiveDate> = by_asset[0]
            .1
            .iter()
            .filter_map(|(d, p)| p.map(|_| *d))
            .collect();
        for (_, points) in &by_asset[1..] {
            dates.retain(|d| matches!(points.get(d), Some(Some(_))));
        }

        let dates: Vec<NaiveDate> = dates.into_iter().collect();
        let mut assets = Vec::with_capacity(by_asset.len());
        let mut prices = Vec::with_capacity(by_asset.len());

        for (asset_id, points) in by_asset {
            let column = dates
                .iter()
                .filter_map(|d| points.get(d).copied().flatten())
                .collect::<Vec<f64>>();
            assets.push(asset_id);
            prices.push(column);
        }

        Ok(Self {
            assets,
            dates,
            prices,
        })
    }

    /// Build a table from a shared date index and one column per asset
    ///
    /// NaN entries mark missing prices and drop their row.
    pub fn from_columns(dates: Vec<NaiveDate>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let mut series = Vec::with_capacity(columns.len());

        for (asset_id, column) in columns {
            if column.len() != dates.len() {
                return Err(VarError::InvalidParameter(format!(
                    "Asset {} has {} prices, expected {}",
                    asset_id,
                    column.len(),
                    dates.len()
                )));
            }

            let observations = dates.iter().copied().zip(column.into_iter().map(Some)).collect();
            series.push(PriceSeries::new(asset_id, observations));
        }

        Self::align(series)
    }

    /// Asset identifiers in column order
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Date index (strictly ascending)
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of aligned rows
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Price column for an asset
    pub fn prices(&self, asset_id: &str) -> Option<&[f64]> {
        self.assets
            .iter()
            .position(|a| a == asset_id)
            .map(|i| self.prices[i].as_slice())
    }

    /// Iterate over (asset, prices) columns
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.assets
            .iter()
            .map(String::as_str)
            .zip(self.prices.iter().map(Vec::as_slice))
    }

    /// Last aligned row, if any
    pub fn latest(&self) -> Option<(NaiveDate, Vec<f64>)> {
        let last = self.dates.len().checked_sub(1)?;
        Some((self.dates[last], self.prices.iter().map(|c| c[last]).collect()))
    }

    /// Keep only the rows inside `range`
    pub fn within(&self, range: &DateRange) -> Self {
        let keep: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, d)| range.contains(**d))
            .map(|(i, _)| i)
            .collect();

        Self {
            assets: self.assets.clone(),
            dates: keep.iter().map(|&i| self.dates[i]).collect(),
            prices: self
                .prices
                .iter()
                .map(|column| keep.iter().map(|&i| column[i]).collect())
                .collect(),
        }
    }

    /// Restrict the table to `assets`, in the order given
    pub fn select(&self, assets: &[String]) -> Result<Self> {
        let mut prices = Vec::with_capacity(assets.len());

        for asset_id in assets {
            let column = self.prices(asset_id).ok_or_else(|| {
                VarError::InvalidParameter(format!("Unknown asset {}", asset_id))
            })?;
            prices.push(column.to_vec());
        }

        Ok(Self {
            assets: assets.to_vec(),
            dates: self.dates.clone(),
            prices,
        })
    }
}
