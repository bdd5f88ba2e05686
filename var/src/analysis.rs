//! Run every estimator over one portfolio return series
//!
//! Estimators are independent: a failure in one is recorded and the others
//! still report. CVaR uses the historical VaR as its threshold, so it is only
//! attempted when the historical estimate succeeded.

use crate::config::AnalysisConfig;
use crate::error::VarError;
use crate::report::ComparisonReport;
use crate::var::{
    conditional_var, historical_var, monte_carlo_var, parametric_var, MonteCarloVar, ParametricVar,
    VarMethod,
};

/// An estimator that did not produce a result
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorFailure {
    pub method: VarMethod,
    pub error: VarError,
}

/// Outcome of a full comparison run
#[derive(Debug, Clone)]
pub struct VarAnalysis {
    /// Historical, parametric, Monte Carlo (whichever succeeded) and CVaR
    pub report: ComparisonReport,

    /// Fitted normal parameters and z-score
    pub parametric: Option<ParametricVar>,

    /// Simulated sample and its parameters
    pub monte_carlo: Option<MonteCarloVar>,

    /// Estimators that failed, in run order
    pub failures: Vec<EstimatorFailure>,
}

impl VarAnalysis {
    /// Whether every estimator produced a result
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Compute historical, parametric and Monte Carlo VaR plus CVaR
pub fn analyze(returns: &[f64], config: &AnalysisConfig) -> VarAnalysis {
    let c = config.confidence_level;
    let investment = config.initial_investment;

    let mut results = Vec::with_capacity(3);
    let mut failures = Vec::new();

    let historical = match historical_var(returns, c, investment) {
        Ok(result) => {
            results.push(result);
            Some(result)
        }
        Err(error) => {
            failures.push(EstimatorFailure {
                method: VarMethod::Historical,
                error,
            });
            None
        }
    };

    let parametric = match parametric_var(returns, c, investment) {
        Ok(p) => {
            results.push(p.result);
            Some(p)
        }
        Err(error) => {
            failures.push(EstimatorFailure {
                method: VarMethod::Parametric,
                error,
            });
            None
        }
    };

    let simulated = monte_carlo_var(returns, c, investment, config.num_simulations, config.seed);
    let monte_carlo = match simulated {
        Ok(mc) => {
            results.push(mc.result);
            Some(mc)
        }
        Err(error) => {
            failures.push(EstimatorFailure {
                method: VarMethod::MonteCarlo,
                error,
            });
            None
        }
    };

    let cvar = historical.and_then(|h| {
        match conditional_var(returns, h.var_fraction, c, investment) {
            Ok(result) => Some(result),
            Err(error) => {
                failures.push(EstimatorFailure {
                    method: VarMethod::ConditionalVar,
                    error,
                });
                None
            }
        }
    });

    VarAnalysis {
        report: ComparisonReport::assemble(results, cvar),
        parametric,
        monte_carlo,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::PortfolioWeights;

    fn config() -> AnalysisConfig {
        let mut config = AnalysisConfig::with_weights(PortfolioWeights::equal(&["A"]).unwrap());
        config.num_simulations = 2_000;
        config
    }

    #[test]
    fn test_full_analysis() {
        let returns = [0.01, -0.02, 0.015, -0.03, 0.005, -0.01, 0.02, -0.025, 0.01, -0.015];
        let analysis = analyze(&returns, &config());

        assert!(analysis.is_complete());
        let methods: Vec<VarMethod> = analysis.report.entries().iter().map(|e| e.method).collect();
        assert_eq!(
            methods,
            vec![VarMethod::Historical, VarMethod::Parametric, VarMethod::MonteCarlo]
        );
        assert!(analysis.report.cvar().is_some());
        assert_eq!(analysis.monte_carlo.as_ref().unwrap().simulated_returns.len(), 2_000);
        assert!(analysis.parametric.is_some());
    }

    #[test]
    fn test_failure_does_not_block_other_estimators() {
        let mut config = config();
        config.num_simulations = 0;

        let returns = [0.01, -0.02, 0.015, -0.03];
        let analysis = analyze(&returns, &config);

        assert_eq!(analysis.failures.len(), 1);
        assert_eq!(analysis.failures[0].method, VarMethod::MonteCarlo);
        assert!(matches!(analysis.failures[0].error, VarError::InvalidParameter(_)));
        assert!(analysis.report.get(VarMethod::Historical).is_some());
        assert!(analysis.report.get(VarMethod::Parametric).is_some());
        assert!(analysis.report.cvar().is_some());
        assert!(analysis.monte_carlo.is_none());
    }

    #[test]
    fn test_all_fail_on_single_observation() {
        let analysis = analyze(&[0.01], &config());

        let failed: Vec<VarMethod> = analysis.failures.iter().map(|f| f.method).collect();
        assert_eq!(
            failed,
            vec![VarMethod::Historical, VarMethod::Parametric, VarMethod::MonteCarlo]
        );
        assert!(analysis.report.is_empty());
    }
}
