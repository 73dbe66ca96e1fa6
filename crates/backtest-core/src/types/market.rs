//! Market data types: daily price bars, dividend records, split events.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar for a single listing.
///
/// A price series is expected to hold one bar per trading day, with
/// unique dates in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

/// A dividend record as distributed by the exchange.
///
/// `stock_per_10` carries the stock-dividend portion in units granted
/// per 10 held shares (FinMind's `StockEarningsDistribution` field:
/// 0.5 means 50 new shares per 1000 held). Either portion may be zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    pub date: NaiveDate,
    pub cash_per_share: Decimal,
    pub stock_per_10: Decimal,
}

impl DividendEvent {
    /// Cash-only dividend record.
    pub fn cash(date: NaiveDate, per_share: Decimal) -> Self {
        Self {
            date,
            cash_per_share: per_share,
            stock_per_10: Decimal::ZERO,
        }
    }

    /// Stock-only dividend record.
    pub fn stock(date: NaiveDate, per_10: Decimal) -> Self {
        Self {
            date,
            cash_per_share: Decimal::ZERO,
            stock_per_10: per_10,
        }
    }
}

/// Where a split event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSource {
    /// Hand-maintained table of announced forward splits.
    Curated,
    /// Implied by a stock-dividend record (multiplier `1 + s/10`).
    Derived,
}

/// A forward split: held shares are multiplied at the effective date,
/// historical prices are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitEvent {
    pub effective_date: NaiveDate,
    pub multiplier: Decimal,
    pub source: SplitSource,
}
