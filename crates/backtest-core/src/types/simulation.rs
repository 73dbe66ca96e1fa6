//! Simulation run configuration.

use crate::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for one lump-sum simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Listing id, e.g. `2330` or `0050`.
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Lump sum invested on the first trading day (must be positive).
    pub investment_amount: Decimal,
    /// Reinvest cash dividends on the payment day.
    pub use_drip: bool,
    /// Broker fee discount on a scale of 10: 10 = full standard fee,
    /// 6 = 60% of the standard fee. Must lie in (0, 10].
    pub fee_discount: Decimal,
    /// Deduct the securities transaction tax on the exit sale.
    pub deduct_tax: bool,
}

impl SimulationConfig {
    /// Check field-level invariants before a run.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(invalid("symbol must not be empty"));
        }
        if self.start_date > self.end_date {
            return Err(invalid("start_date must not be after end_date"));
        }
        if self.investment_amount <= Decimal::ZERO {
            return Err(invalid("investment_amount must be positive"));
        }
        if self.fee_discount <= Decimal::ZERO || self.fee_discount > Decimal::TEN {
            return Err(invalid("fee_discount must lie in (0, 10]"));
        }
        Ok(())
    }

    /// Same settings aimed at a different listing. Used by the
    /// orchestrator for the benchmark run.
    pub fn for_symbol(&self, symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..self.clone()
        }
    }
}

fn invalid(message: &str) -> Error {
    Error::InvalidConfig {
        message: message.to_string(),
    }
}
