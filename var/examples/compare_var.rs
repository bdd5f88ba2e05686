//! VaR comparison example
//!
//! Builds a two-asset portfolio from deterministic prices and compares the
//! historical, parametric and Monte Carlo estimates.
//!
//! Run with: cargo run -p ag-var --example compare_var

use ag_var::*;
use chrono::{Duration, NaiveDate};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== Value at Risk (VaR) Comparison Example ===\n");

    // 1. Create sample prices (250 trading days for two assets)
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;
    let dates: Vec<NaiveDate> = (0..250).map(|i| start + Duration::days(i)).collect();

    let price_path = |base: f64, phase: f64| -> Vec<f64> {
        let mut price = base;
        (0..250)
            .map(|i| {
                let wave = (i as f64 * 0.37 + phase).sin() * 0.015;
                let shock = wave + ((i * 13) % 7) as f64 * 0.0004 - 0.0011;
                price *= 1.0 + shock;
                price
            })
            .collect()
    };

    let prices = PriceTable::from_columns(
        dates,
        vec![
            ("AAPL".to_string(), price_path(150.0, 0.0)),
            ("MSFT".to_string(), price_path(300.0, 1.3)),
        ],
    )?;

    // 2. Returns and portfolio series
    let weights = PortfolioWeights::equal(prices.assets())?;
    let returns = compute_returns(&prices)?;
    let portfolio = compute_portfolio_return(&returns, &weights)?;

    let summary = ReturnSummary::from_returns(portfolio.values())?;
    println!("Portfolio returns statistics:");
    println!("  Observations: {}", summary.count);
    println!("  Mean return: {:.4}%", summary.mean * 100.0);
    println!("  Std deviation: {:.4}%", summary.std_dev * 100.0);
    println!();

    // 3. Run all estimators
    let config = AnalysisConfig::with_weights(weights);
    println!("Portfolio: ${:.0}", config.initial_investment);
    println!("Confidence Level: {}%", config.confidence_level * 100.0);
    println!();

    let analysis = analyze(portfolio.values(), &config);

    if let Some(p) = &analysis.parametric {
        println!(
            "Parametric fit: mean {:.4}%, std {:.4}%, z {:.4}",
            p.mean * 100.0,
            p.std_dev * 100.0,
            p.z_score
        );
    }

    // 4. Compare all methods
    println!("\n--- Comparison of VaR Methods ---");
    println!("{:<20} {:>10} {:>15}", "Method", "VaR (%)", "VaR ($)");
    println!("{:-<47}", "");
    for entry in analysis.report.entries() {
        println!(
            "{:<20} {:>9.4}% {:>15.2}",
            entry.method.name(),
            entry.var_fraction * 100.0,
            entry.abs_var_currency
        );
    }
    if let Some(cvar) = analysis.report.cvar() {
        println!(
            "{:<20} {:>9.4}% {:>15.2}",
            cvar.method.name(),
            cvar.var_fraction * 100.0,
            cvar.abs_var_currency
        );
    }

    // 5. Multiple confidence levels
    println!("\n--- Parametric VaR at Different Confidence Levels ---");
    for &c in &[0.90, 0.95, 0.99, 0.999] {
        let var = parametric_var(portfolio.values(), c, config.initial_investment)?;
        println!("{}% VaR: ${:>10.2}", c * 100.0, var.result.var_currency.abs());
    }

    for failure in &analysis.failures {
        println!("{} failed: {}", failure.method, failure.error);
    }

    println!("\n=== Example Complete ===");

    Ok(())
}
