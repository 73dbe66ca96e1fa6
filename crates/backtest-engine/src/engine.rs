//! Day-stepped simulation engine.
//!
//! Runs one lump-sum simulation over a daily price series: buy on the
//! first bar's open, apply splits and dividends day by day (with
//! optional DRIP), mark equity per bar, sell everything on the last
//! bar's close. All cash amounts are floored to whole NTD the way a
//! Taiwan broker settles them.

use backtest_core::types::{
    DividendEvent, EquityPoint, PriceBar, SimulationConfig, SimulationResult, SplitEvent,
    TransactionEvent, TransactionKind,
};
use backtest_core::{Error, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

/// Standard brokerage fee rate (0.1425%).
const FEE_RATE: Decimal = Decimal::from_parts(1425, 0, 0, false, 6);
/// Securities transaction tax on sales (0.3%).
const TAX_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 3);
/// Minimum brokerage fee in NTD, charged on any trade with shares.
const MIN_FEE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Run one full simulation.
///
/// Fails only when `bars` is empty; every other edge case is a
/// deterministic policy fallback. Inputs are re-sorted defensively;
/// dates are expected to be unique per series.
pub fn simulate(
    bars: &[PriceBar],
    dividends: &[DividendEvent],
    splits: &[SplitEvent],
    config: &SimulationConfig,
) -> Result<SimulationResult> {
    if bars.is_empty() {
        return Err(Error::EmptyPriceSeries {
            symbol: config.symbol.clone(),
        });
    }

    let mut bars = bars.to_vec();
    bars.sort_by_key(|b| b.date);
    let mut dividends = dividends.to_vec();
    dividends.sort_by_key(|d| d.date);
    let mut splits = splits.to_vec();
    splits.sort_by_key(|s| s.effective_date);

    info!(
        symbol = %config.symbol,
        bars = bars.len(),
        dividends = dividends.len(),
        splits = splits.len(),
        "Starting simulation"
    );

    let mut state = PortfolioState::new(config.investment_amount);
    let discount = config.fee_discount;

    // Entry: maximum whole share count affordable at the first open,
    // fee included. If even one share is out of reach the run proceeds
    // fully in cash.
    let entry_price = bars[0].open;
    let initial_shares = affordable_shares(config.investment_amount, entry_price, discount);
    if initial_shares >= 1 {
        let cost = Decimal::from(initial_shares) * entry_price;
        let fee = brokerage_fee(cost, discount, initial_shares);
        if cost + fee <= state.cash {
            state.shares += initial_shares;
            state.cash -= cost + fee;
            state.log(TransactionEvent {
                date: bars[0].date,
                kind: TransactionKind::Buy,
                price: Some(entry_price),
                shares: Some(initial_shares),
                dividend_per_share: None,
                amount: -(cost + fee),
                balance_after: state.market_value(entry_price),
            });
        } else {
            debug!(symbol = %config.symbol, "Entry unaffordable after fee, staying in cash");
        }
    } else {
        debug!(symbol = %config.symbol, "Entry price exceeds investment, staying in cash");
    }
    let initial_shares = state.shares;

    let mut split_idx = 0;
    let mut div_idx = 0;

    for bar in &bars {
        let today = bar.date;
        let close = bar.close;

        // 1. Splits: apply each once, on the first trading day at or
        //    after its effective date.
        while split_idx < splits.len() && splits[split_idx].effective_date <= today {
            let split = &splits[split_idx];
            let before = state.shares;
            state.shares = (Decimal::from(before) * split.multiplier)
                .floor()
                .to_u64()
                .unwrap_or(before);
            state.log(TransactionEvent {
                date: today,
                kind: TransactionKind::Split,
                price: None,
                // Magnitude of the share-count change; a multiplier
                // below 1 sheds shares instead of adding them.
                shares: Some(state.shares.abs_diff(before)),
                dividend_per_share: None,
                amount: Decimal::ZERO,
                balance_after: state.market_value(close),
            });
            split_idx += 1;
        }

        // 2. Dividends: drain every record dated on or before today.
        while div_idx < dividends.len() && dividends[div_idx].date <= today {
            let dividend = &dividends[div_idx];
            state.apply_stock_dividend(dividend, today, close);
            state.apply_cash_dividend(dividend, today, close, config);
            div_idx += 1;
        }

        // 3. Equity mark.
        state.mark_equity(today, close);
    }

    // Exit: liquidate at the last close.
    let last = &bars[bars.len() - 1];
    let exit_price = last.close;
    let final_shares = state.shares;
    let proceeds = Decimal::from(final_shares) * exit_price;
    let sell_fee = brokerage_fee(proceeds, discount, final_shares);
    let tax = if config.deduct_tax {
        (proceeds * TAX_RATE).floor()
    } else {
        Decimal::ZERO
    };
    let final_cash = state.cash + proceeds - sell_fee - tax;
    state.cash = final_cash;
    state.shares = 0;
    state.log(TransactionEvent {
        date: last.date,
        kind: TransactionKind::Sell,
        price: Some(exit_price),
        shares: Some(final_shares),
        dividend_per_share: None,
        amount: proceeds - sell_fee - tax,
        balance_after: final_cash,
    });

    let total_return = final_cash - config.investment_amount;
    let return_rate = total_return / config.investment_amount * Decimal::ONE_HUNDRED;
    let max_drawdown = state
        .max_drawdown
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    info!(
        symbol = %config.symbol,
        final_value = %final_cash,
        return_rate = %return_rate,
        max_drawdown = %max_drawdown,
        "Simulation completed"
    );

    Ok(SimulationResult {
        symbol: config.symbol.clone(),
        initial_price: entry_price,
        final_price: exit_price,
        initial_shares,
        final_shares,
        final_market_value: final_cash,
        capital_gains: total_return - state.total_cash_dividends,
        total_cash_dividends: state.total_cash_dividends,
        total_return,
        return_rate,
        max_drawdown,
        equity_curve: state.equity_curve,
        events: state.events,
    })
}

/// Maximum whole shares such that `shares × price × (1 + fee rate)`
/// fits in `budget`. Zero when the price is non-positive.
fn affordable_shares(budget: Decimal, price: Decimal, discount: Decimal) -> u64 {
    if price <= Decimal::ZERO {
        return 0;
    }
    let unit_cost = price * (Decimal::ONE + FEE_RATE * discount / Decimal::TEN);
    (budget / unit_cost).floor().to_u64().unwrap_or(0)
}

/// Brokerage fee for a trade: floored, discounted, clamped to the
/// NT$20 floor only when the trade actually moves shares.
fn brokerage_fee(trade_value: Decimal, discount: Decimal, shares: u64) -> Decimal {
    let fee = (trade_value * FEE_RATE * discount / Decimal::TEN).floor();
    if shares > 0 && fee < MIN_FEE {
        MIN_FEE
    } else {
        fee
    }
}

/// Run-local portfolio state, threaded through the day loop and
/// discarded after the run.
struct PortfolioState {
    cash: Decimal,
    shares: u64,
    total_cash_dividends: Decimal,
    peak_equity: Option<Decimal>,
    max_drawdown: Decimal,
    equity_curve: Vec<EquityPoint>,
    events: Vec<TransactionEvent>,
}

impl PortfolioState {
    fn new(investment_amount: Decimal) -> Self {
        Self {
            cash: investment_amount,
            shares: 0,
            total_cash_dividends: Decimal::ZERO,
            peak_equity: None,
            max_drawdown: Decimal::ZERO,
            equity_curve: Vec::new(),
            events: Vec::new(),
        }
    }

    fn market_value(&self, price: Decimal) -> Decimal {
        self.cash + Decimal::from(self.shares) * price
    }

    fn log(&mut self, event: TransactionEvent) {
        self.events.push(event);
    }

    /// Stock portion of a dividend record: whole shares granted per 10
    /// held, remainder dropped. Nothing is logged for a zero grant.
    fn apply_stock_dividend(&mut self, dividend: &DividendEvent, today: chrono::NaiveDate, close: Decimal) {
        if dividend.stock_per_10 <= Decimal::ZERO {
            return;
        }
        let granted = (Decimal::from(self.shares) * dividend.stock_per_10 / Decimal::TEN)
            .floor()
            .to_u64()
            .unwrap_or(0);
        if granted == 0 {
            return;
        }
        self.shares += granted;
        self.log(TransactionEvent {
            date: today,
            kind: TransactionKind::DividendStock,
            price: None,
            shares: Some(granted),
            dividend_per_share: None,
            amount: Decimal::ZERO,
            balance_after: self.market_value(close),
        });
    }

    /// Cash portion of a dividend record. Under DRIP the payout buys
    /// whole shares at the close when the purchase plus fee fits inside
    /// the payout; otherwise the full payout is credited as cash.
    fn apply_cash_dividend(
        &mut self,
        dividend: &DividendEvent,
        today: chrono::NaiveDate,
        close: Decimal,
        config: &SimulationConfig,
    ) {
        if dividend.cash_per_share <= Decimal::ZERO {
            return;
        }
        let payout = (Decimal::from(self.shares) * dividend.cash_per_share).floor();
        self.total_cash_dividends += payout;

        let mut reinvested = 0u64;
        if config.use_drip && close > Decimal::ZERO {
            let shares = (payout / close).floor().to_u64().unwrap_or(0);
            if shares > 0 {
                let cost = Decimal::from(shares) * close;
                let fee = brokerage_fee(cost, config.fee_discount, shares);
                if cost + fee <= payout {
                    self.shares += shares;
                    self.cash += payout - (cost + fee);
                    reinvested = shares;
                } else {
                    debug!(date = %today, "DRIP purchase unaffordable, crediting payout as cash");
                }
            }
        }
        if reinvested == 0 {
            self.cash += payout;
        }

        self.log(TransactionEvent {
            date: today,
            kind: TransactionKind::DividendCash,
            price: None,
            shares: Some(reinvested),
            dividend_per_share: Some(dividend.cash_per_share),
            amount: payout,
            balance_after: self.market_value(close),
        });
    }

    /// Append an equity point and update the running peak / worst
    /// drawdown. The peak is raised before the drawdown is measured,
    /// so the drawdown can never be positive.
    fn mark_equity(&mut self, today: chrono::NaiveDate, close: Decimal) {
        let equity = self.market_value(close);
        self.equity_curve.push(EquityPoint {
            date: today,
            value: equity,
        });

        let peak = match self.peak_equity {
            Some(peak) if peak >= equity => peak,
            _ => {
                self.peak_equity = Some(equity);
                equity
            }
        };
        if peak > Decimal::ZERO {
            let drawdown = (equity - peak) / peak * Decimal::ONE_HUNDRED;
            if drawdown < self.max_drawdown {
                self.max_drawdown = drawdown;
            }
        }
    }
}
