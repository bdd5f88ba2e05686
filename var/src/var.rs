//! Value at Risk (VaR) estimators
//!
//! Implements three independent VaR methodologies over one return series:
//! - Historical VaR: Empirical percentile of past returns
//! - Parametric VaR: Normal fit, VaR = μ + σ · Φ⁻¹(1 - c)
//! - Monte Carlo VaR: Percentile of returns simulated from the normal fit
//!
//! plus Conditional VaR (Expected Shortfall), the mean return in the tail at
//! or below a VaR threshold.
//!
//! All VaR fractions are signed returns: a loss is negative. Currency values
//! are `fraction × initial_investment`. No estimator scales by holding period.

use crate::error::{Result, VarError};
use crate::stats;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal as StatrsNormal};
use std::fmt;

/// VaR calculation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarMethod {
    Historical,
    Parametric,
    MonteCarlo,
    ConditionalVar,
}

impl VarMethod {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            VarMethod::Historical => "Historical VaR",
            VarMethod::Parametric => "Parametric VaR",
            VarMethod::MonteCarlo => "Monte Carlo VaR",
            VarMethod::ConditionalVar => "Conditional VaR",
        }
    }

    /// Distributional assumption behind the estimate
    pub fn assumption(&self) -> &'static str {
        match self {
            VarMethod::Historical => {
                "no distributional assumption; past returns are taken as representative"
            }
            VarMethod::Parametric => "returns are i.i.d. normal; no fat-tail correction",
            VarMethod::MonteCarlo => {
                "returns are i.i.d. normal with the sample mean and standard deviation; \
                 subject to sampling noise"
            }
            VarMethod::ConditionalVar => {
                "no distributional assumption; averages the historical tail at or below VaR"
            }
        }
    }
}

impl fmt::Display for VarMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// VaR calculation result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarResult {
    /// Calculation method used
    pub method: VarMethod,

    /// Confidence level (e.g., 0.95, 0.99)
    pub confidence_level: f64,

    /// VaR as a fractional return (negative represents a loss)
    pub var_fraction: f64,

    /// VaR in currency units (var_fraction × initial investment)
    pub var_currency: f64,
}

impl VarResult {
    fn new(
        method: VarMethod,
        confidence_level: f64,
        var_fraction: f64,
        initial_investment: f64,
    ) -> Self {
        Self {
            method,
            confidence_level,
            var_fraction,
            var_currency: var_fraction * initial_investment,
        }
    }
}

/// Parametric VaR with the fitted distribution parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParametricVar {
    pub result: VarResult,

    /// Sample mean of returns
    pub mean: f64,

    /// Sample standard deviation of returns (n - 1)
    pub std_dev: f64,

    /// Standard normal quantile at (1 - confidence)
    pub z_score: f64,
}

/// Monte Carlo VaR with the simulated sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloVar {
    pub result: VarResult,

    /// Mean used for the simulated normal
    pub mean: f64,

    /// Standard deviation used for the simulated normal
    pub std_dev: f64,

    /// Simulated returns in draw order
    pub simulated_returns: Vec<f64>,
}

/// Calculate Historical VaR using the empirical percentile
///
/// Formula: VaR = percentile(returns, 1 - c), linearly interpolated at rank
/// `(1 - c)(n - 1)` of the ascending sort.
pub fn historical_var(
    returns: &[f64],
    confidence_level: f64,
    initial_investment: f64,
) -> Result<VarResult> {
    validate_inputs(returns, confidence_level, initial_investment)?;
    require_observations(returns, 2)?;

    let sorted = stats::sorted(returns);
    let var_fraction = stats::interpolated_percentile(&sorted, 1.0 - confidence_level);

    Ok(VarResult::new(
        VarMethod::Historical,
        confidence_level,
        var_fraction,
        initial_investment,
    ))
}

/// Calculate Parametric VaR assuming normally distributed returns
///
/// Formula: VaR = μ + Z · σ
/// where Z is the inverse CDF of the standard normal at (1 - c)
pub fn parametric_var(
    returns: &[f64],
    confidence_level: f64,
    initial_investment: f64,
) -> Result<ParametricVar> {
    validate_inputs(returns, confidence_level, initial_investment)?;
    require_observations(returns, 2)?;

    let (mean, std_dev) = stats::mean_and_std(returns)?;
    let z_score = standard_normal_quantile(1.0 - confidence_level)?;
    let var_fraction = mean + z_score * std_dev;

    Ok(ParametricVar {
        result: VarResult::new(
            VarMethod::Parametric,
            confidence_level,
            var_fraction,
            initial_investment,
        ),
        mean,
        std_dev,
        z_score,
    })
}

/// Calculate Monte Carlo VaR from returns simulated out of a normal fit
///
/// Draws `num_simulations` samples from N(μ, σ) with a generator seeded from
/// `seed`, then takes the same interpolated percentile as [`historical_var`].
/// Identical inputs and seed always produce an identical sample.
pub fn monte_carlo_var(
    returns: &[f64],
    confidence_level: f64,
    initial_investment: f64,
    num_simulations: usize,
    seed: u64,
) -> Result<MonteCarloVar> {
    validate_inputs(returns, confidence_level, initial_investment)?;

    if num_simulations == 0 {
        return Err(VarError::InvalidParameter(
            "Number of simulations must be positive".to_string()
        ));
    }

    require_observations(returns, 2)?;

    let (mean, std_dev) = stats::mean_and_std(returns)?;
    let normal = Normal::new(mean, std_dev)
        .map_err(|e| VarError::InvalidParameter(e.to_string()))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let simulated_returns: Vec<f64> = (0..num_simulations)
        .map(|_| normal.sample(&mut rng))
        .collect();

    let sorted = stats::sorted(&simulated_returns);
    let var_fraction = stats::interpolated_percentile(&sorted, 1.0 - confidence_level);

    Ok(MonteCarloVar {
        result: VarResult::new(
            VarMethod::MonteCarlo,
            confidence_level,
            var_fraction,
            initial_investment,
        ),
        mean,
        std_dev,
        simulated_returns,
    })
}

/// Calculate Conditional VaR (CVaR / Expected Shortfall)
///
/// CVaR is the mean of all returns at or below `var_fraction`, usually the
/// historical VaR at the same confidence level. `confidence_level` only
/// labels the result. Fails with `EmptyTail` when nothing falls in the tail.
pub fn conditional_var(
    returns: &[f64],
    var_fraction: f64,
    confidence_level: f64,
    initial_investment: f64,
) -> Result<VarResult> {
    validate_inputs(returns, confidence_level, initial_investment)?;
    require_observations(returns, 1)?;

    if !var_fraction.is_finite() {
        return Err(VarError::InvalidParameter(format!(
            "VaR threshold must be finite, got {}",
            var_fraction
        )));
    }

    let tail: Vec<f64> = returns
        .iter()
        .copied()
        .filter(|r| *r <= var_fraction)
        .collect();

    if tail.is_empty() {
        return Err(VarError::EmptyTail {
            threshold: var_fraction,
        });
    }

    let average_tail_return = stats::mean(&tail);

    Ok(VarResult::new(
        VarMethod::ConditionalVar,
        confidence_level,
        average_tail_return,
        initial_investment,
    ))
}

/// Standard normal inverse CDF
fn standard_normal_quantile(p: f64) -> Result<f64> {
    let normal = StatrsNormal::new(0.0, 1.0)
        .map_err(|e| VarError::InvalidParameter(e.to_string()))?;

    Ok(normal.inverse_cdf(p))
}

fn require_observations(returns: &[f64], min: usize) -> Result<()> {
    if returns.len() < min {
        return Err(VarError::InsufficientData(format!(
            "Need at least {} observations, got {}",
            min,
            returns.len()
        )));
    }

    Ok(())
}

/// Validate common input parameters
fn validate_inputs(returns: &[f64], confidence_level: f64, initial_investment: f64) -> Result<()> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(VarError::InvalidParameter(format!(
            "Confidence level must be between 0 and 1, got {}",
            confidence_level
        )));
    }

    if !(initial_investment > 0.0 && initial_investment.is_finite()) {
        return Err(VarError::InvalidParameter(format!(
            "Initial investment must be positive, got {}",
            initial_investment
        )));
    }

    if let Some(r) = returns.iter().find(|r| !r.is_finite()) {
        return Err(VarError::InvalidParameter(format!(
            "Returns must be finite, found {}",
            r
        )));
    }

    Ok(())
}
