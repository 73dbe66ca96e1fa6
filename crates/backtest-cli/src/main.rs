//! Backtest CLI
//!
//! Command-line entrypoint for the lump-sum backtester. Resolves the
//! requested symbol against FinMind, runs the simulation (plus the
//! 006208 benchmark), and prints a summary or the full JSON report.

use anyhow::Result;
use backtest_core::config::Config;
use backtest_core::types::{BacktestReport, SimulationConfig};
use backtest_engine::run_backtest;
use chrono::NaiveDate;
use clap::Parser;
use market_data::FinMindClient;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "backtest", about = "Taiwan equity lump-sum backtester")]
struct Args {
    /// Stock id or a name keyword to search for (e.g. "0050" or "台積電")
    symbol: String,

    /// First day of the backtest window (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// Last day of the backtest window (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,

    /// Lump sum to invest at the start of the window, in NTD
    #[arg(long, default_value = "100000")]
    amount: Decimal,

    /// Reinvest cash dividends on their payout day
    #[arg(long)]
    drip: bool,

    /// Brokerage fee discount in tenths (10 = no discount, 6 = 60% of the list fee)
    #[arg(long, default_value = "10")]
    fee_discount: Decimal,

    /// Deduct securities transaction tax on the final sale
    #[arg(long)]
    tax: bool,

    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backtest_cli=info,backtest_engine=info,market_data=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let client = FinMindClient::new(config.finmind);

    // Plain digits are taken as a stock id; anything else is a search keyword.
    let (symbol, stock_name) = if args.symbol.chars().all(|c| c.is_ascii_digit()) {
        let name = client.stock_name(&args.symbol).await?;
        (args.symbol.clone(), name)
    } else {
        let listing = client.resolve(&args.symbol).await?;
        info!(id = %listing.id, name = %listing.name, "Resolved keyword to listing");
        (listing.id, Some(listing.name))
    };

    let sim_config = SimulationConfig {
        symbol,
        start_date: args.start,
        end_date: args.end,
        investment_amount: args.amount,
        use_drip: args.drip,
        fee_discount: args.fee_discount,
        deduct_tax: args.tax,
    };

    let backtest = run_backtest(&client, &sim_config).await?;
    let report = BacktestReport::assemble(sim_config, stock_name, backtest);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &BacktestReport) {
    let result = &report.backtest.result;
    let name = report.stock_name.as_deref().unwrap_or("-");

    println!("Backtest {} ({})", result.symbol, name);
    println!(
        "  Window:           {} to {}",
        report.config.start_date, report.config.end_date
    );
    println!("  Invested:         {} NTD", report.config.investment_amount);
    println!(
        "  Shares:           {} -> {}",
        result.initial_shares, result.final_shares
    );
    println!("  Final value:      {} NTD", result.final_market_value);
    println!("  Cash dividends:   {} NTD", result.total_cash_dividends);
    println!("  Capital gains:    {} NTD", result.capital_gains);
    println!(
        "  Total return:     {} NTD ({}%)",
        result.total_return, result.return_rate
    );
    println!("  Max drawdown:     {}%", result.max_drawdown);

    for split in &report.backtest.splits {
        println!(
            "  Split:            x{} effective {}",
            split.multiplier, split.effective_date
        );
    }

    if let Some(benchmark) = &report.backtest.benchmark {
        println!(
            "  Benchmark {}:  {} NTD ({}%)",
            benchmark.symbol, benchmark.total_return, benchmark.return_rate
        );
    }
}
