use ag_var::{AnalysisConfig, DateRange};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub data: DataConfig,
}

#[derive(Debug, Deserialize)]
pub struct DataConfig {
    /// Inclusive date window applied by every source
    #[serde(default)]
    pub range: DateRange,

    /// Sources tried in order until one succeeds
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// One CSV file per asset
    Csv { files: BTreeMap<String, PathBuf> },

    /// Seeded geometric Brownian motion over business days
    Synthetic {
        #[serde(default = "default_synthetic_seed")]
        seed: u64,

        #[serde(default)]
        assets: BTreeMap<String, SyntheticAsset>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyntheticAsset {
    pub initial_price: f64,

    /// Mean daily log return
    #[serde(default = "default_drift")]
    pub drift: f64,

    /// Daily log return volatility
    #[serde(default = "default_volatility")]
    pub volatility: f64,
}

impl Default for SyntheticAsset {
    fn default() -> Self {
        Self {
            initial_price: 100.0,
            drift: default_drift(),
            volatility: default_volatility(),
        }
    }
}

fn default_synthetic_seed() -> u64 {
    42
}

fn default_drift() -> f64 {
    0.001
}

fn default_volatility() -> f64 {
    0.02
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&contents, base_dir)
    }

    /// Parse YAML, resolving relative CSV paths against `base_dir`
    pub fn parse(yaml: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(yaml).context("Failed to parse config")?;
        config.analysis.validate()?;

        if config.data.sources.is_empty() {
            anyhow::bail!("At least one data source must be configured");
        }

        for source in &mut config.data.sources {
            if let SourceConfig::Csv { files } = source {
                for path in files.values_mut() {
                    if path.is_relative() {
                        *path = base_dir.join(&*path);
                    }
                }
            }
        }

        Ok(config)
    }
}
