//! Concrete price sources for the CLI
//!
//! - `CsvPriceProvider`: one file per asset, `Adj Close` preferred over `Close`
//! - `SyntheticPriceProvider`: seeded GBM prices on a business-day calendar
//! - `FallbackPriceProvider`: tries sources in order until one succeeds

use crate::config::{DataConfig, SourceConfig, SyntheticAsset};
use ag_var::{DateRange, PriceSeries, PriceSeriesProvider, PriceTable, ProviderError, VarError};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Price columns in order of preference
const PRICE_COLUMNS: [&str; 2] = ["Adj Close", "Close"];

/// Reads one CSV per asset; the first column holds the date
pub struct CsvPriceProvider {
    files: BTreeMap<String, PathBuf>,
}

impl CsvPriceProvider {
    pub fn new(files: BTreeMap<String, PathBuf>) -> Self {
        Self { files }
    }

    fn read_series(
        &self,
        asset_id: &str,
        path: &Path,
        range: &DateRange,
    ) -> Result<PriceSeries, ProviderError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| ProviderError::Unavailable(format!("{}: {}", path.display(), e)))?;

        let headers = reader
            .headers()
            .map_err(|e| ProviderError::Parse(format!("{}: {}", path.display(), e)))?
            .clone();

        let price_col = PRICE_COLUMNS
            .iter()
            .find_map(|name| headers.iter().position(|h| h.trim() == *name))
            .ok_or_else(|| {
                ProviderError::Parse(format!(
                    "{}: no 'Adj Close' or 'Close' column",
                    path.display()
                ))
            })?;

        let mut observations = Vec::new();
        let mut skipped = 0usize;

        for record in reader.records() {
            let record = record
                .map_err(|e| ProviderError::Parse(format!("{}: {}", path.display(), e)))?;

            let date = match record.get(0).and_then(parse_date) {
                Some(date) => date,
                None => {
                    skipped += 1;
                    continue;
                }
            };

            if !range.contains(date) {
                continue;
            }

            let price = record
                .get(price_col)
                .and_then(|s| s.trim().parse::<f64>().ok());
            observations.push((date, price));
        }

        if skipped > 0 {
            debug!(asset = asset_id, skipped, "Skipped rows without a date");
        }

        Ok(PriceSeries::new(asset_id, observations))
    }
}

/// Parse `YYYY-MM-DD`, ignoring any time suffix
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl PriceSeriesProvider for CsvPriceProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn load(&self, assets: &[String], range: &DateRange) -> Result<PriceTable, ProviderError> {
        let mut series = Vec::with_capacity(assets.len());

        for asset_id in assets {
            let path = self.files.get(asset_id).ok_or_else(|| {
                ProviderError::Unavailable(format!("No CSV file configured for {}", asset_id))
            })?;
            series.push(self.read_series(asset_id, path, range)?);
        }

        let table = PriceTable::align(series)?;
        if table.is_empty() {
            return Err(ProviderError::Unavailable(
                "CSV files have no complete rows in range".to_string()
            ));
        }

        Ok(table)
    }
}

/// Generates `p0 · exp(cumsum(N(drift, volatility)))` on Mon–Fri dates
pub struct SyntheticPriceProvider {
    seed: u64,
    assets: BTreeMap<String, SyntheticAsset>,
}

impl SyntheticPriceProvider {
    pub fn new(seed: u64, assets: BTreeMap<String, SyntheticAsset>) -> Self {
        Self { seed, assets }
    }
}

/// Weekdays from `start` to `end` inclusive
fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

impl PriceSeriesProvider for SyntheticPriceProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn load(&self, assets: &[String], range: &DateRange) -> Result<PriceTable, ProviderError> {
        let (start, end) = match (range.start, range.end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(ProviderError::Unavailable(
                    "Synthetic prices need both a start and an end date".to_string()
                ))
            }
        };

        let dates = business_days(start, end);
        if dates.is_empty() {
            return Err(ProviderError::Unavailable(format!(
                "No business days between {} and {}",
                start, end
            )));
        }

        // One generator for all assets, drawn in request order
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut columns = Vec::with_capacity(assets.len());

        for asset_id in assets {
            let params = self.assets.get(asset_id).cloned().unwrap_or_default();
            if params.initial_price <= 0.0 || !params.initial_price.is_finite() {
                return Err(VarError::InvalidParameter(format!(
                    "Initial price for {} must be positive",
                    asset_id
                ))
                .into());
            }

            let normal = Normal::new(params.drift, params.volatility)
                .map_err(|e| VarError::InvalidParameter(format!("{}: {}", asset_id, e)))?;

            let mut log_price = params.initial_price.ln();
            let prices = dates
                .iter()
                .map(|_| {
                    log_price += normal.sample(&mut rng);
                    log_price.exp()
                })
                .collect();

            columns.push((asset_id.clone(), prices));
        }

        Ok(PriceTable::from_columns(dates, columns)?)
    }
}

/// Tries each provider in order and returns the first success
pub struct FallbackPriceProvider {
    providers: Vec<Box<dyn PriceSeriesProvider>>,
}

impl FallbackPriceProvider {
    pub fn new(providers: Vec<Box<dyn PriceSeriesProvider>>) -> Self {
        Self { providers }
    }

    /// Load prices, also returning the name of the provider that served them
    pub fn load_first(
        &self,
        assets: &[String],
        range: &DateRange,
    ) -> Result<(String, PriceTable), ProviderError> {
        let mut failures = Vec::new();

        for provider in &self.providers {
            match provider.load(assets, range) {
                Ok(table) => {
                    info!(source = provider.name(), rows = table.len(), "Loaded prices");
                    return Ok((provider.name().to_string(), table));
                }
                Err(e) => {
                    warn!(source = provider.name(), error = %e, "Price source failed, trying next");
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        Err(ProviderError::Unavailable(if failures.is_empty() {
            "No price sources configured".to_string()
        } else {
            failures.join("; ")
        }))
    }
}

impl PriceSeriesProvider for FallbackPriceProvider {
    fn name(&self) -> &str {
        "fallback"
    }

    fn load(&self, assets: &[String], range: &DateRange) -> Result<PriceTable, ProviderError> {
        self.load_first(assets, range).map(|(_, table)| table)
    }
}

/// Build the provider chain described by the config
pub fn build_provider(config: &DataConfig) -> FallbackPriceProvider {
    let providers = config
        .sources
        .iter()
        .map(|source| -> Box<dyn PriceSeriesProvider> {
            match source {
                SourceConfig::Csv { files } => Box::new(CsvPriceProvider::new(files.clone())),
                SourceConfig::Synthetic { seed, assets } => {
                    Box::new(SyntheticPriceProvider::new(*seed, assets.clone()))
                }
            }
        })
        .collect();

    FallbackPriceProvider::new(providers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_csv_prefers_adj_close() {
        let dir = tempfile::tempdir().unwrap();
        let aapl = write_csv(
            dir.path(),
            "AAPL.csv",
            "Date,Open,Close,Adj Close\n\
             2024-01-02,1,185.6,184.9\n\
             2024-01-03,1,184.2,183.5\n\
             2024-01-04,1,181.9,\n\
             2024-01-05,1,181.2,180.5\n",
        );
        let msft = write_csv(
            dir.path(),
            "MSFT.csv",
            "Date,Close\n\
             2024-01-02 00:00:00-05:00,370.9\n\
             2024-01-03 00:00:00-05:00,370.6\n\
             2024-01-04 00:00:00-05:00,368.0\n\
             2024-01-05 00:00:00-05:00,367.8\n",
        );

        let files = [("AAPL".to_string(), aapl), ("MSFT".to_string(), msft)].into();
        let provider = CsvPriceProvider::new(files);
        let assets = vec!["AAPL".to_string(), "MSFT".to_string()];

        let table = provider.load(&assets, &DateRange::unbounded()).unwrap();

        // Empty Adj Close on the 4th drops that row
        assert_eq!(table.dates(), &[date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 5)]);
        assert_eq!(table.prices("AAPL").unwrap(), &[184.9, 183.5, 180.5]);
        assert_eq!(table.prices("MSFT").unwrap(), &[370.9, 370.6, 367.8]);
    }

    #[test]
    fn test_csv_range_and_header_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "SPY.csv",
            "Price,Close\n\
             Ticker,SPY\n\
             2024-01-02,470.0\n\
             2024-01-03,468.0\n\
             2024-01-04,467.0\n",
        );

        let provider = CsvPriceProvider::new([("SPY".to_string(), path)].into());
        let range = DateRange::new(Some(date(2024, 1, 3)), None);
        let table = provider.load(&["SPY".to_string()], &range).unwrap();

        assert_eq!(table.prices("SPY").unwrap(), &[468.0, 467.0]);
    }

    #[test]
    fn test_csv_errors() {
        let dir = tempfile::tempdir().unwrap();
        let no_price = write_csv(dir.path(), "X.csv", "Date,Volume\n2024-01-02,100\n");

        let provider = CsvPriceProvider::new([("X".to_string(), no_price)].into());
        assert!(matches!(
            provider.load(&["X".to_string()], &DateRange::unbounded()),
            Err(ProviderError::Parse(_))
        ));

        let missing =
            CsvPriceProvider::new([("Y".to_string(), dir.path().join("nope.csv"))].into());
        assert!(matches!(
            missing.load(&["Y".to_string()], &DateRange::unbounded()),
            Err(ProviderError::Unavailable(_))
        ));

        assert!(matches!(
            missing.load(&["Z".to_string()], &DateRange::unbounded()),
            Err(ProviderError::Unavailable(_))
        ));
    }

    #[test]
    fn test_business_days() {
        // Fri 2024-01-05 .. Tue 2024-01-09
        let days = business_days(date(2024, 1, 5), date(2024, 1, 9));
        assert_eq!(days, vec![date(2024, 1, 5), date(2024, 1, 8), date(2024, 1, 9)]);
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        let assets: BTreeMap<String, SyntheticAsset> = [(
            "AAPL".to_string(),
            SyntheticAsset {
                initial_price: 150.0,
                ..Default::default()
            },
        )]
        .into();
        let provider = SyntheticPriceProvider::new(42, assets);
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 3, 29)));
        let wanted = vec!["AAPL".to_string(), "MSFT".to_string()];

        let a = provider.load(&wanted, &range).unwrap();
        let b = provider.load(&wanted, &range).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), business_days(date(2024, 1, 1), date(2024, 3, 29)).len());
        assert!(a.prices("AAPL").unwrap().iter().all(|p| *p > 0.0));
        assert!(a.prices("MSFT").is_some());

        let other = SyntheticPriceProvider::new(7, BTreeMap::new()).load(&wanted, &range).unwrap();
        assert_ne!(a.prices("MSFT"), other.prices("MSFT"));
    }

    #[test]
    fn test_synthetic_needs_bounds() {
        let provider = SyntheticPriceProvider::new(1, BTreeMap::new());
        let result = provider.load(&["A".to_string()], &DateRange::unbounded());
        assert!(matches!(result, Err(ProviderError::Unavailable(_))));
    }

    #[test]
    fn test_fallback_moves_on() {
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));
        let chain = FallbackPriceProvider::new(vec![
            Box::new(CsvPriceProvider::new(BTreeMap::new())),
            Box::new(SyntheticPriceProvider::new(42, BTreeMap::new())),
        ]);

        let (source, table) = chain.load_first(&["A".to_string()], &range).unwrap();
        assert_eq!(source, "synthetic");
        assert_eq!(table.len(), 23);
    }

    #[test]
    fn test_fallback_reports_all_failures() {
        let chain = FallbackPriceProvider::new(vec![
            Box::new(CsvPriceProvider::new(BTreeMap::new())),
            Box::new(SyntheticPriceProvider::new(42, BTreeMap::new())),
        ]);

        match chain.load(&["A".to_string()], &DateRange::unbounded()) {
            Err(ProviderError::Unavailable(msg)) => {
                assert!(msg.contains("csv"));
                assert!(msg.contains("synthetic"));
            }
            other => panic!("Expected Unavailable, got {:?}", other.map(|t| t.len())),
        }

        let empty = FallbackPriceProvider::new(vec![]);
        assert!(empty.load(&["A".to_string()], &DateRange::unbounded()).is_err());
    }
}
