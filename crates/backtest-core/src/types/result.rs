//! Simulation output and composed report types.

use super::events::{EquityPoint, TransactionEvent};
use super::market::SplitEvent;
use super::simulation::SimulationConfig;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full output of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub symbol: String,
    /// Open of the first bar (entry price).
    pub initial_price: Decimal,
    /// Close of the last bar (exit price).
    pub final_price: Decimal,
    /// Shares bought at entry (zero when the entry was unaffordable).
    pub initial_shares: u64,
    /// Shares held just before the exit sale.
    pub final_shares: u64,
    /// Cash after the exit sale, net of fees and tax.
    pub final_market_value: Decimal,
    /// Total return minus accumulated cash dividends.
    pub capital_gains: Decimal,
    pub total_cash_dividends: Decimal,
    /// `final_market_value - investment_amount`.
    pub total_return: Decimal,
    /// Total return over investment, in percent.
    pub return_rate: Decimal,
    /// Worst peak-to-trough equity decline in percent, `<= 0`,
    /// rounded to 2 decimals.
    pub max_drawdown: Decimal,
    pub equity_curve: Vec<EquityPoint>,
    pub events: Vec<TransactionEvent>,
}

/// Condensed benchmark outcome attached to a composed backtest when
/// the target differs from the reference listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub symbol: String,
    pub total_return: Decimal,
    pub return_rate: Decimal,
}

/// Composed outcome of an orchestrated run: the target simulation,
/// the split history used, and the optional benchmark summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backtest {
    pub result: SimulationResult,
    /// Merged split view (curated and dividend-derived) for the
    /// target, for display-oriented consumers.
    pub splits: Vec<SplitEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<BenchmarkSummary>,
}

/// A backtest with caller-assigned identity, ready for presentation
/// or persistence layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub config: SimulationConfig,
    /// Resolved display name of the listing, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_name: Option<String>,
    #[serde(flatten)]
    pub backtest: Backtest,
}

impl BacktestReport {
    /// Stamp a composed backtest with a fresh id and the current time.
    pub fn assemble(config: SimulationConfig, stock_name: Option<String>, backtest: Backtest) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            config,
            stock_name,
            backtest,
        }
    }
}
