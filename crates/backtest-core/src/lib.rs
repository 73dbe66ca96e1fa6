//! Backtest Core Library
//!
//! Shared domain types, configuration, and the market-data seam for the
//! Taiwan equity lump-sum backtester.

pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use error::{Error, Result};
pub use source::MarketDataSource;
