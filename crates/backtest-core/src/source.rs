//! The market-data collaborator seam.
//!
//! Retrieval, caching, and retry of historical data live behind this
//! trait; the engine and orchestrator only ever see pre-filtered,
//! date-ordered series.

use crate::types::{DividendEvent, PriceBar};
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Supplies historical market data for one listing and date range.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily price bars, ascending by date. An empty series is a valid
    /// response; the engine decides whether that is fatal.
    async fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>>;

    /// Dividend records, ascending by date.
    async fn dividends(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DividendEvent>>;
}
