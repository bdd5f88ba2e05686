//! Analysis configuration

use crate::error::{Result, VarError};
use crate::portfolio::PortfolioWeights;
use serde::{Deserialize, Serialize};

/// Parameters for one VaR comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Confidence level in (0, 1)
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,

    /// Capital the VaR fractions are scaled by
    #[serde(default = "default_initial_investment")]
    pub initial_investment: f64,

    /// Weight per asset; must sum to 1.0
    pub weights: PortfolioWeights,

    /// Holding period label in days. Estimates are 1-day and never scaled.
    #[serde(default = "default_holding_period_days")]
    pub holding_period_days: u32,

    /// Monte Carlo sample size
    #[serde(default = "default_num_simulations")]
    pub num_simulations: usize,

    /// Monte Carlo seed
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_initial_investment() -> f64 {
    1_000_000.0
}

fn default_holding_period_days() -> u32 {
    1
}

fn default_num_simulations() -> usize {
    10_000
}

fn default_seed() -> u64 {
    42
}

impl AnalysisConfig {
    /// Config with default parameters for the given weights
    pub fn with_weights(weights: PortfolioWeights) -> Self {
        Self {
            confidence_level: default_confidence_level(),
            initial_investment: default_initial_investment(),
            weights,
            holding_period_days: default_holding_period_days(),
            num_simulations: default_num_simulations(),
            seed: default_seed(),
        }
    }

    /// Load from YAML and validate
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_yaml::from_str(yaml)
            .map_err(|e| VarError::InvalidParameter(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from JSON and validate
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)
            .map_err(|e| VarError::InvalidParameter(format!("Failed to parse JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(VarError::InvalidParameter(format!(
                "Confidence level must be between 0 and 1, got {}",
                self.confidence_level
            )));
        }

        if !(self.initial_investment > 0.0 && self.initial_investment.is_finite()) {
            return Err(VarError::InvalidParameter(format!(
                "Initial investment must be positive, got {}",
                self.initial_investment
            )));
        }

        if self.num_simulations == 0 {
            return Err(VarError::InvalidParameter(
                "Number of simulations must be positive".to_string()
            ));
        }

        if self.holding_period_days == 0 {
            return Err(VarError::InvalidParameter(
                "Holding period must be at least one day".to_string()
            ));
        }

        Ok(())
    }

    /// Assets named by the weights, sorted
    pub fn assets(&self) -> Vec<String> {
        self.weights.assets().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_defaults() {
        let yaml = r#"
weights:
  AAPL: 0.5
  MSFT: 0.5
"#;
        let config = AnalysisConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.initial_investment, 1_000_000.0);
        assert_eq!(config.holding_period_days, 1);
        assert_eq!(config.num_simulations, 10_000);
        assert_eq!(config.seed, 42);
        assert_eq!(config.assets(), vec!["AAPL".to_string(), "MSFT".to_string()]);
    }

    #[test]
    fn test_json_overrides() {
        let json = r#"{
            "confidence_level": 0.99,
            "initial_investment": 250000.0,
            "weights": {"SPY": 1.0},
            "num_simulations": 500,
            "seed": 7
        }"#;
        let config = AnalysisConfig::from_json(json).unwrap();

        assert_eq!(config.confidence_level, 0.99);
        assert_eq!(config.num_simulations, 500);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_validation() {
        assert!(AnalysisConfig::from_yaml("confidence_level: 1.2\nweights: {A: 1.0}\n").is_err());
        assert!(AnalysisConfig::from_yaml("num_simulations: 0\nweights: {A: 1.0}\n").is_err());
        assert!(AnalysisConfig::from_yaml("initial_investment: -5\nweights: {A: 1.0}\n").is_err());
        // Weights that do not sum to one fail during deserialization
        assert!(AnalysisConfig::from_yaml("weights: {A: 0.2}\n").is_err());
        // Weights are required
        assert!(AnalysisConfig::from_yaml("seed: 1\n").is_err());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = AnalysisConfig::with_weights(PortfolioWeights::equal(&["A", "B"]).unwrap());
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = AnalysisConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
