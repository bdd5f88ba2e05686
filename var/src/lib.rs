//! # ag-var: Portfolio Value at Risk
//!
//! This library estimates the one-day Value at Risk of a weighted portfolio
//! from daily prices, using three independent methods over the same return
//! series, and packages the estimates into a comparison report.
//!
//! ## Core Components
//!
//! - **PriceTable**: Daily prices per asset aligned on a common date index
//! - **Returns**: Simple returns per asset and the weighted portfolio series
//! - **Estimators**: Historical, parametric and Monte Carlo VaR, plus CVaR
//! - **ComparisonReport**: The estimates side by side
//! - **PriceSeriesProvider**: Where prices come from (files, caches, fixtures)
//!
//! Everything here is pure computation: no I/O, no logging, no global state.
//! Monte Carlo runs use a generator seeded per call.
//!
//! ## Example Usage
//!
//! ```rust
//! use ag_var::{
//!     analyze, compute_portfolio_return, compute_returns, AnalysisConfig, PortfolioWeights,
//!     PriceTable, VarMethod,
//! };
//! use chrono::NaiveDate;
//!
//! let dates: Vec<NaiveDate> = (1..=6)
//!     .map(|d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap())
//!     .collect();
//!
//! let prices = PriceTable::from_columns(
//!     dates,
//!     vec![
//!         ("AAPL".to_string(), vec![170.0, 172.1, 169.5, 171.0, 168.2, 170.4]),
//!         ("MSFT".to_string(), vec![410.0, 405.3, 408.8, 412.0, 409.1, 404.7]),
//!     ],
//! )
//! .unwrap();
//!
//! let weights = PortfolioWeights::equal(&["AAPL", "MSFT"]).unwrap();
//! let returns = compute_returns(&prices).unwrap();
//! let portfolio = compute_portfolio_return(&returns, &weights).unwrap();
//!
//! let config = AnalysisConfig::with_weights(weights);
//! let analysis = analyze(portfolio.values(), &config);
//!
//! let historical = analysis.report.get(VarMethod::Historical).unwrap();
//! assert!(historical.var_fraction < 0.0); // A loss
//! ```

mod analysis;
mod config;
mod error;
mod portfolio;
mod prices;
mod provider;
mod report;
mod returns;
mod stats;
mod var;

pub use analysis::{analyze, EstimatorFailure, VarAnalysis};
pub use config::AnalysisConfig;
pub use error::{Result, VarError};
pub use portfolio::{compute_portfolio_return, PortfolioWeights, WEIGHT_SUM_TOLERANCE};
pub use prices::{DateRange, PriceSeries, PriceTable};
pub use provider::{PriceSeriesProvider, ProviderError, StaticPriceProvider};
pub use report::{ComparisonReport, ReportEntry};
pub use returns::{compute_returns, cumulative_growth, ReturnSeries, ReturnSummary};
pub use var::{
    conditional_var, historical_var, monte_carlo_var, parametric_var, MonteCarloVar, ParametricVar,
    VarMethod, VarResult,
};
