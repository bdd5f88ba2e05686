//! Portfolio weights and the weighted portfolio return series
//!
//! The portfolio return at each date is `r_p = R w`, where `R` is the
//! (dates × assets) matrix of asset returns and `w` the weight vector.

use crate::error::{Result, VarError};
use crate::returns::ReturnSeries;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance for the weights-sum-to-one check
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Fraction of capital allocated to each asset
///
/// Weights are finite and sum to 1.0 within [`WEIGHT_SUM_TOLERANCE`].
/// Negative weights (short positions) are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct PortfolioWeights(BTreeMap<String, f64>);

impl PortfolioWeights {
    pub fn new(weights: BTreeMap<String, f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(VarError::InvalidParameter(
                "Portfolio weights must not be empty".to_string()
            ));
        }

        if let Some((asset, w)) = weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(VarError::InvalidParameter(format!(
                "Weight for {} is not finite: {}",
                asset, w
            )));
        }

        let total: f64 = weights.values().sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(VarError::InvalidParameter(format!(
                "Portfolio weights must sum to 1.0, got {}",
                total
            )));
        }

        Ok(Self(weights))
    }

    /// Equal weight on every asset
    pub fn equal<S: AsRef<str>>(assets: &[S]) -> Result<Self> {
        let w = 1.0 / assets.len() as f64;
        Self::new(assets.iter().map(|a| (a.as_ref().to_string(), w)).collect())
    }

    pub fn weight(&self, asset_id: &str) -> Option<f64> {
        self.0.get(asset_id).copied()
    }

    pub fn assets(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<BTreeMap<String, f64>> for PortfolioWeights {
    type Error = VarError;

    fn try_from(weights: BTreeMap<String, f64>) -> Result<Self> {
        Self::new(weights)
    }
}

impl From<PortfolioWeights> for BTreeMap<String, f64> {
    fn from(weights: PortfolioWeights) -> Self {
        weights.0
    }
}

/// Weighted sum of asset returns at each date
///
/// The asset set of `returns` must equal the asset set of `weights`
/// (`WeightMismatch` otherwise) and every series must share one date index.
pub fn compute_portfolio_return(
    returns: &BTreeMap<String, ReturnSeries>,
    weights: &PortfolioWeights,
) -> Result<ReturnSeries> {
    let missing: Vec<String> = returns
        .keys()
        .filter(|asset| weights.weight(asset).is_none())
        .cloned()
        .collect();
    let unexpected: Vec<String> = weights
        .assets()
        .filter(|asset| !returns.contains_key(*asset))
        .cloned()
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(VarError::WeightMismatch { missing, unexpected });
    }

    let first = returns.values().next().ok_or_else(|| {
        VarError::InsufficientData("No asset returns provided".to_string())
    })?;

    let mut columns = Vec::with_capacity(returns.len());
    let mut weight_vec = Vec::with_capacity(returns.len());

    for (asset, series) in returns {
        if series.dates() != first.dates() || series.len() != first.len() {
            return Err(VarError::InvalidParameter(format!(
                "Returns for {} are not aligned with the other assets",
                asset
            )));
        }

        // Presence checked above
        let w = weights.weight(asset).unwrap_or_default();
        columns.push(series.values());
        weight_vec.push(w);
    }

    let n = first.len();
    let k = columns.len();
    let r = DMatrix::from_fn(n, k, |row, col| columns[col][row]);
    let w = DVector::from_vec(weight_vec);

    let portfolio = r * w;

    ReturnSeries::new(first.dates().to_vec(), portfolio.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn series(values: Vec<f64>) -> ReturnSeries {
        let dates = (0..values.len())
            .map(|i| NaiveDate::from_ymd_opt(2024, 2, 1 + i as u32).unwrap())
            .collect();
        ReturnSeries::new(dates, values).unwrap()
    }

    fn weights(pairs: &[(&str, f64)]) -> PortfolioWeights {
        PortfolioWeights::new(pairs.iter().map(|(a, w)| (a.to_string(), *w)).collect()).unwrap()
    }

    #[test]
    fn test_portfolio_return_dot_product() {
        let mut returns = BTreeMap::new();
        returns.insert("A".to_string(), series(vec![0.10, -0.02, 0.00]));
        returns.insert("B".to_string(), series(vec![-0.05, 0.04, 0.01]));

        let portfolio =
            compute_portfolio_return(&returns, &weights(&[("A", 0.6), ("B", 0.4)])).unwrap();

        assert_eq!(portfolio.len(), 3);
        assert_abs_diff_eq!(portfolio.values()[0], 0.04, epsilon = 1e-12);
        assert_abs_diff_eq!(portfolio.values()[1], 0.004, epsilon = 1e-12);
        assert_abs_diff_eq!(portfolio.values()[2], 0.004, epsilon = 1e-12);
        assert_eq!(portfolio.dates(), returns["A"].dates());
    }

    #[test]
    fn test_weight_mismatch() {
        let mut returns = BTreeMap::new();
        returns.insert("A".to_string(), series(vec![0.01, 0.02]));
        returns.insert("B".to_string(), series(vec![0.03, 0.04]));

        let result = compute_portfolio_return(&returns, &weights(&[("A", 0.5), ("C", 0.5)]));

        match result {
            Err(VarError::WeightMismatch { missing, unexpected }) => {
                assert_eq!(missing, vec!["B".to_string()]);
                assert_eq!(unexpected, vec!["C".to_string()]);
            }
            other => panic!("Expected WeightMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_misaligned_series() {
        let mut returns = BTreeMap::new();
        returns.insert("A".to_string(), series(vec![0.01, 0.02]));
        returns.insert(
            "B".to_string(),
            ReturnSeries::new(
                vec![
                    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                ],
                vec![0.01, 0.02],
            )
            .unwrap(),
        );

        let equal = PortfolioWeights::equal(&["A", "B"]).unwrap();
        let result = compute_portfolio_return(&returns, &equal);
        assert!(matches!(result, Err(VarError::InvalidParameter(_))));
    }

    #[test]
    fn test_uneven_series_rejected() {
        let mut returns = BTreeMap::new();
        returns.insert("A".to_string(), series(vec![0.01, 0.02]));
        returns.insert("B".to_string(), series(vec![0.01]));

        let equal = PortfolioWeights::equal(&["A", "B"]).unwrap();
        let result = compute_portfolio_return(&returns, &equal);
        assert!(matches!(result, Err(VarError::InvalidParameter(_))));

        // A series with a shared date index but fewer values never deserializes
        let uneven = r#"{"dates":["2024-02-01","2024-02-02"],"values":[0.01]}"#;
        assert!(serde_json::from_str::<ReturnSeries>(uneven).is_err());
    }

    #[test]
    fn test_weights_validation() {
        let bad_sum: BTreeMap<String, f64> =
            [("A".to_string(), 0.5), ("B".to_string(), 0.4)].into();
        assert!(matches!(
            PortfolioWeights::new(bad_sum),
            Err(VarError::InvalidParameter(_))
        ));

        let nan: BTreeMap<String, f64> = [("A".to_string(), f64::NAN)].into();
        assert!(PortfolioWeights::new(nan).is_err());

        assert!(PortfolioWeights::new(BTreeMap::new()).is_err());

        // Long/short is fine as long as the total is one
        let long_short = weights(&[("A", 1.5), ("B", -0.5)]);
        assert_eq!(long_short.weight("B"), Some(-0.5));

        let equal = PortfolioWeights::equal(&["A", "B", "C"]).unwrap();
        assert_eq!(equal.len(), 3);
    }

    #[test]
    fn test_weights_deserialize_validates() {
        let ok: PortfolioWeights = serde_yaml::from_str("AAPL: 0.5\nMSFT: 0.5\n").unwrap();
        assert_eq!(ok.weight("AAPL"), Some(0.5));

        let bad: std::result::Result<PortfolioWeights, _> =
            serde_yaml::from_str("AAPL: 0.7\nMSFT: 0.5\n");
        assert!(bad.is_err());
    }
}
