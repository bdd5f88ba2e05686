//! Comparison report across VaR methods

use crate::var::{VarMethod, VarResult};
use serde::{Deserialize, Serialize};

/// One row of the comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub method: VarMethod,
    pub confidence_level: f64,
    pub var_fraction: f64,
    pub var_currency: f64,

    /// Loss magnitude in currency, for display
    pub abs_var_currency: f64,
}

impl From<VarResult> for ReportEntry {
    fn from(result: VarResult) -> Self {
        Self {
            method: result.method,
            confidence_level: result.confidence_level,
            var_fraction: result.var_fraction,
            var_currency: result.var_currency,
            abs_var_currency: result.var_currency.abs(),
        }
    }
}

/// VaR estimates from one return series, in presentation order
///
/// Assembly is pure packaging; nothing is recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    entries: Vec<ReportEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    cvar: Option<ReportEntry>,
}

impl ComparisonReport {
    /// Package results in the order given, with an optional CVaR
    pub fn assemble(results: Vec<VarResult>, cvar: Option<VarResult>) -> Self {
        Self {
            entries: results.into_iter().map(ReportEntry::from).collect(),
            cvar: cvar.map(ReportEntry::from),
        }
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn cvar(&self) -> Option<&ReportEntry> {
        self.cvar.as_ref()
    }

    /// First entry produced by `method`
    pub fn get(&self, method: VarMethod) -> Option<&ReportEntry> {
        self.entries
            .iter()
            .chain(self.cvar.iter())
            .find(|e| e.method == method)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.cvar.is_none()
    }

    /// Render as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
