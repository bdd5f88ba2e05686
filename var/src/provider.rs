//! Price data sources
//!
//! The estimators never know where prices came from. Anything that can hand
//! back an aligned [`PriceTable`] for a set of assets and a date window
//! implements [`PriceSeriesProvider`]: a file loader, a cache, a fixture.

use crate::error::VarError;
use crate::prices::{DateRange, PriceTable};
use thiserror::Error;

/// Errors raised while acquiring prices
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Price source unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to parse price data: {0}")]
    Parse(String),

    #[error(transparent)]
    Data(#[from] VarError),
}

/// Supplies aligned daily prices
pub trait PriceSeriesProvider: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    /// Load prices for `assets` within `range`
    fn load(&self, assets: &[String], range: &DateRange) -> Result<PriceTable, ProviderError>;
}

/// Serves a fixed, already-aligned table
#[derive(Debug, Clone)]
pub struct StaticPriceProvider {
    table: PriceTable,
}

impl StaticPriceProvider {
    pub fn new(table: PriceTable) -> Self {
        Self { table }
    }
}

impl PriceSeriesProvider for StaticPriceProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn load(&self, assets: &[String], range: &DateRange) -> Result<PriceTable, ProviderError> {
        if let Some(missing) = assets.iter().find(|a| self.table.prices(a).is_none()) {
            return Err(ProviderError::Unavailable(format!("No prices for {}", missing)));
        }

        Ok(self.table.select(assets)?.within(range))
    }
}
