//! Rendering of a finished analysis

use ag_var::{AnalysisConfig, PriceTable, ReturnSummary, VarAnalysis, VarMethod};
use anyhow::Result;
use clap::ValueEnum;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Everything a presenter may show besides the analysis itself
pub struct RunContext<'a> {
    pub config: &'a AnalysisConfig,

    /// Name of the price source that served the data
    pub source: &'a str,

    pub prices: &'a PriceTable,

    /// Portfolio return statistics, when there were enough returns
    pub summary: Option<&'a ReturnSummary>,

    /// Per-asset return statistics, for assets with enough returns
    pub asset_summaries: &'a BTreeMap<String, ReturnSummary>,

    /// Total compounded portfolio return over the period
    pub cumulative_return: Option<f64>,
}

pub trait Presenter {
    fn render(&self, analysis: &VarAnalysis, ctx: &RunContext<'_>) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn presenter(self) -> Box<dyn Presenter> {
        match self {
            OutputFormat::Text => Box::new(TextPresenter),
            OutputFormat::Json => Box::new(JsonPresenter),
        }
    }
}

/// Human-readable report
pub struct TextPresenter;

/// Strengths (+) and weaknesses (-) shown after the comparison table
fn trade_offs(method: VarMethod) -> &'static [&'static str] {
    match method {
        VarMethod::Historical => &[
            "+ Uses the actual historical distribution",
            "+ No assumptions about distribution shape",
            "- Limited by the history available",
            "- May not capture future extreme events",
        ],
        VarMethod::Parametric => &[
            "+ Fast and easy to calculate",
            "+ Based on statistical theory",
            "- Assumes normal returns (may underestimate tail risk)",
            "- May not work well for non-normal returns",
        ],
        VarMethod::MonteCarlo => &[
            "+ Flexible, can be extended to other distributions",
            "- Computationally heavier",
            "- Depends on the fitted model and the number of simulations",
        ],
        VarMethod::ConditionalVar => &[
            "+ Measures the size of losses beyond VaR",
            "- Needs enough tail observations",
        ],
    }
}

fn rule(out: &mut String) -> std::fmt::Result {
    writeln!(out, "{}", "=".repeat(70))
}

impl Presenter for TextPresenter {
    fn render(&self, analysis: &VarAnalysis, ctx: &RunContext<'_>) -> Result<String> {
        let config = ctx.config;
        let c = config.confidence_level;
        let tail_pct = (1.0 - c) * 100.0;
        let days = config.holding_period_days;
        let mut out = String::new();

        rule(&mut out)?;
        writeln!(out, "Value at Risk (VaR) Analysis")?;
        rule(&mut out)?;
        writeln!(out, "Assets: {}", ctx.prices.assets().join(", "))?;
        let weights: Vec<String> =
            config.weights.iter().map(|(a, w)| format!("{}={}", a, w)).collect();
        writeln!(out, "Weights: {}", weights.join(", "))?;
        writeln!(out, "Initial Investment: ${:.2}", config.initial_investment)?;
        writeln!(out, "Confidence Level: {}%", c * 100.0)?;
        writeln!(out, "Holding Period: {} day(s) (estimates are 1-day, not scaled)", days)?;
        writeln!(out, "Price Source: {}", ctx.source)?;
        if let (Some(first), Some(last)) = (ctx.prices.dates().first(), ctx.prices.dates().last()) {
            writeln!(out, "Data Period: {} to {} ({} rows)", first, last, ctx.prices.len())?;
        }
        if let Some((date, latest)) = ctx.prices.latest() {
            let latest: Vec<String> = ctx
                .prices
                .assets()
                .iter()
                .zip(latest)
                .map(|(a, p)| format!("{}={:.2}", a, p))
                .collect();
            writeln!(out, "Latest Prices ({}): {}", date, latest.join(", "))?;
        }

        if let Some(s) = ctx.summary {
            writeln!(out)?;
            writeln!(out, "Portfolio Returns Statistics:")?;
            writeln!(out, "  Count: {}", s.count)?;
            writeln!(out, "  Mean Daily Return: {:.4}%", s.mean * 100.0)?;
            writeln!(out, "  Standard Deviation: {:.4}%", s.std_dev * 100.0)?;
            writeln!(
                out,
                "  Min / 25% / 50% / 75% / Max: {:.4}% / {:.4}% / {:.4}% / {:.4}% / {:.4}%",
                s.min * 100.0,
                s.q25 * 100.0,
                s.median * 100.0,
                s.q75 * 100.0,
                s.max * 100.0
            )?;
        }
        if let Some(total) = ctx.cumulative_return {
            writeln!(out, "  Cumulative Return: {:.2}%", total * 100.0)?;
        }

        if !ctx.asset_summaries.is_empty() {
            writeln!(out)?;
            writeln!(out, "Asset Returns Statistics:")?;
            writeln!(
                out,
                "  {:<10} {:>6} {:>10} {:>10} {:>10} {:>10}",
                "Asset", "Count", "Mean (%)", "Std (%)", "Min (%)", "Max (%)"
            )?;
            for (asset, s) in ctx.asset_summaries {
                writeln!(
                    out,
                    "  {:<10} {:>6} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
                    asset,
                    s.count,
                    s.mean * 100.0,
                    s.std_dev * 100.0,
                    s.min * 100.0,
                    s.max * 100.0
                )?;
            }
        }

        for entry in analysis.report.entries() {
            writeln!(out)?;
            rule(&mut out)?;
            writeln!(out, "{}", entry.method.name().to_uppercase())?;
            rule(&mut out)?;

            match entry.method {
                VarMethod::Parametric => {
                    if let Some(p) = &analysis.parametric {
                        writeln!(out, "  - Mean Return: {:.4}%", p.mean * 100.0)?;
                        writeln!(out, "  - Standard Deviation: {:.4}%", p.std_dev * 100.0)?;
                        writeln!(out, "  - Z-Score: {:.4}", p.z_score)?;
                    }
                }
                VarMethod::MonteCarlo => {
                    writeln!(out, "  - Number of Simulations: {}", config.num_simulations)?;
                    writeln!(out, "  - Seed: {}", config.seed)?;
                }
                _ => {}
            }

            writeln!(out, "  - VaR (percentage): {:.4}%", entry.var_fraction * 100.0)?;
            writeln!(out, "  - VaR (currency): ${:.2}", entry.abs_var_currency)?;
            writeln!(out, "  Assumption: {}", entry.method.assumption())?;
            writeln!(
                out,
                "  Interpretation: there is a {:.1}% chance that the portfolio will lose \
                 more than ${:.2} in {} day(s).",
                tail_pct, entry.abs_var_currency, days
            )?;
        }

        writeln!(out)?;
        rule(&mut out)?;
        writeln!(out, "COMPARISON")?;
        rule(&mut out)?;
        writeln!(
            out,
            "{:<18} {:>12} {:>16} {:>18}",
            "Method", "VaR (%)", "VaR ($)", "Absolute VaR ($)"
        )?;
        for entry in analysis.report.entries() {
            writeln!(
                out,
                "{:<18} {:>11.4}% {:>16.2} {:>18.2}",
                entry.method.name(),
                entry.var_fraction * 100.0,
                entry.var_currency,
                entry.abs_var_currency
            )?;
        }

        writeln!(out)?;
        writeln!(out, "Key Differences:")?;
        for entry in analysis.report.entries() {
            writeln!(out, "  {}:", entry.method.name())?;
            for line in trade_offs(entry.method) {
                writeln!(out, "    {}", line)?;
            }
        }

        if let Some(cvar) = analysis.report.cvar() {
            writeln!(out)?;
            rule(&mut out)?;
            writeln!(out, "CONDITIONAL VAR (Expected Shortfall)")?;
            rule(&mut out)?;
            writeln!(out, "  - CVaR (percentage): {:.4}%", cvar.var_fraction * 100.0)?;
            writeln!(out, "  - CVaR (currency): ${:.2}", cvar.abs_var_currency)?;
            writeln!(
                out,
                "  Interpretation: given that losses exceed the VaR threshold, \
                 the expected loss is ${:.2}.",
                cvar.abs_var_currency
            )?;
        }

        if !analysis.failures.is_empty() {
            writeln!(out)?;
            writeln!(out, "Failed Estimators:")?;
            for failure in &analysis.failures {
                writeln!(out, "  {}: {}", failure.method.name(), failure.error)?;
            }
        }

        Ok(out)
    }
}

/// Machine-readable report
pub struct JsonPresenter;

impl Presenter for JsonPresenter {
    fn render(&self, analysis: &VarAnalysis, ctx: &RunContext<'_>) -> Result<String> {
        let failures: Vec<_> = analysis
            .failures
            .iter()
            .map(|f| json!({ "method": f.method, "error": f.error.to_string() }))
            .collect();

        let value = json!({
            "source": ctx.source,
            "assets": ctx.prices.assets(),
            "rows": ctx.prices.len(),
            "confidence_level": ctx.config.confidence_level,
            "initial_investment": ctx.config.initial_investment,
            "holding_period_days": ctx.config.holding_period_days,
            "summary": ctx.summary,
            "asset_summaries": ctx.asset_summaries,
            "cumulative_return": ctx.cumulative_return,
            "report": analysis.report,
            "parametric": analysis.parametric.as_ref().map(|p| json!({
                "mean": p.mean,
                "std_dev": p.std_dev,
                "z_score": p.z_score,
            })),
            "monte_carlo": analysis.monte_carlo.as_ref().map(|mc| json!({
                "num_simulations": mc.simulated_returns.len(),
                "seed": ctx.config.seed,
                "mean": mc.mean,
                "std_dev": mc.std_dev,
            })),
            "failures": failures,
        });

        Ok(serde_json::to_string_pretty(&value)?)
    }
}
