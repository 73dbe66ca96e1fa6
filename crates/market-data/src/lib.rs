//! Market Data
//!
//! FinMind-backed historical data acquisition for the backtester:
//! daily price bars, dividend records, and listing lookup/search.

pub mod finmind;

pub use finmind::{FinMindClient, StockListing};
