use ag_var::{
    analyze, compute_portfolio_return, compute_returns, cumulative_growth, ReturnSummary,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

mod config;
mod presenter;
mod sources;

use config::Config;
use presenter::{OutputFormat, RunContext};
use sources::build_provider;

#[derive(Parser, Debug)]
#[clap(name = "ag-var", about = "Portfolio Value at Risk comparison")]
struct Args {
    #[clap(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[clap(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write the report here instead of stdout
    #[clap(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Logs go to stderr so the report on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!("Loading configuration from {:?}", args.config);
    let config = Config::load(&args.config)?;
    let assets = config.analysis.assets();

    let provider = build_provider(&config.data);
    let (source, prices) = provider
        .load_first(&assets, &config.data.range)
        .context("No price source could serve the portfolio")?;

    let returns = compute_returns(&prices)?;
    let portfolio = compute_portfolio_return(&returns, &config.analysis.weights)?;
    info!(observations = portfolio.len(), "Portfolio returns computed");

    let summary = ReturnSummary::from_returns(portfolio.values()).ok();
    let asset_summaries: BTreeMap<String, ReturnSummary> = returns
        .iter()
        .filter_map(|(asset, series)| {
            let summary = ReturnSummary::from_returns(series.values()).ok()?;
            Some((asset.clone(), summary))
        })
        .collect();
    let cumulative_return = cumulative_growth(portfolio.values()).last().map(|g| g - 1.0);

    let analysis = analyze(portfolio.values(), &config.analysis);
    for failure in &analysis.failures {
        warn!(method = %failure.method, error = %failure.error, "Estimator failed");
    }

    let ctx = RunContext {
        config: &config.analysis,
        source: &source,
        prices: &prices,
        summary: summary.as_ref(),
        asset_summaries: &asset_summaries,
        cumulative_return,
    };
    let rendered = args.format.presenter().render(&analysis, &ctx)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {:?}", path);
        }
        None => print!("{}", rendered),
    }

    if analysis.report.is_empty() {
        anyhow::bail!("Every estimator failed");
    }

    Ok(())
}
