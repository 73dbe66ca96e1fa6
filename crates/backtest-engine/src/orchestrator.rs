//! Orchestrates one composed backtest: the target run plus an optional
//! benchmark run against the 006208 reference listing.
//!
//! The benchmark leg is strictly best-effort: any failure there, in
//! data acquisition or simulation, is logged and swallowed so it can
//! never taint the primary result. Identity (id, timestamp) for the
//! composed result is assigned by the caller.

use crate::{corporate_actions, engine};
use backtest_core::types::{
    Backtest, BenchmarkSummary, DividendEvent, PriceBar, SimulationConfig, SplitEvent,
    SplitSource,
};
use backtest_core::{MarketDataSource, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Fixed reference listing: 006208, Fubon Taiwan 50.
pub const BENCHMARK_SYMBOL: &str = "006208";

/// Run the simulation for `config.symbol` and, when the target is not
/// the benchmark itself, for [`BENCHMARK_SYMBOL`] with the same
/// settings. Both data acquisitions run concurrently.
pub async fn run_backtest<S: MarketDataSource>(
    source: &S,
    config: &SimulationConfig,
) -> Result<Backtest> {
    config.validate()?;

    info!(
        symbol = %config.symbol,
        start = %config.start_date,
        end = %config.end_date,
        amount = %config.investment_amount,
        "Starting backtest"
    );

    let want_benchmark = config.symbol != BENCHMARK_SYMBOL;
    let (target, benchmark) = tokio::join!(
        fetch_series(source, &config.symbol, config.start_date, config.end_date),
        async {
            if want_benchmark {
                Some(fetch_series(source, BENCHMARK_SYMBOL, config.start_date, config.end_date).await)
            } else {
                None
            }
        }
    );

    let (bars, dividends) = target?;
    let splits = corporate_actions::list_splits(
        &config.symbol,
        config.start_date,
        config.end_date,
        &dividends,
    );
    // Derived entries re-state stock-dividend records the engine
    // already processes; only curated splits feed the simulation.
    let result = engine::simulate(&bars, &dividends, &curated_only(&splits), config)?;

    let benchmark = match benchmark {
        None => None,
        Some(Err(e)) => {
            warn!(symbol = BENCHMARK_SYMBOL, error = %e, "Benchmark data unavailable, omitting");
            None
        }
        Some(Ok((bench_bars, bench_dividends))) => {
            let bench_config = config.for_symbol(BENCHMARK_SYMBOL);
            let bench_splits = corporate_actions::list_splits(
                BENCHMARK_SYMBOL,
                config.start_date,
                config.end_date,
                &bench_dividends,
            );
            match engine::simulate(
                &bench_bars,
                &bench_dividends,
                &curated_only(&bench_splits),
                &bench_config,
            ) {
                Ok(bench) => Some(BenchmarkSummary {
                    symbol: BENCHMARK_SYMBOL.to_string(),
                    total_return: bench.total_return,
                    return_rate: bench.return_rate,
                }),
                Err(e) => {
                    warn!(symbol = BENCHMARK_SYMBOL, error = %e, "Benchmark simulation failed, omitting");
                    None
                }
            }
        }
    };

    info!(
        symbol = %config.symbol,
        return_rate = %result.return_rate,
        benchmark = benchmark.is_some(),
        "Backtest completed"
    );

    Ok(Backtest {
        result,
        splits,
        benchmark,
    })
}

async fn fetch_series<S: MarketDataSource>(
    source: &S,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(Vec<PriceBar>, Vec<DividendEvent>)> {
    tokio::try_join!(
        source.price_history(symbol, start, end),
        source.dividends(symbol, start, end),
    )
}

fn curated_only(splits: &[SplitEvent]) -> Vec<SplitEvent> {
    splits
        .iter()
        .filter(|s| s.source == SplitSource::Curated)
        .cloned()
        .collect()
}
