//! Backtest Engine
//!
//! Day-stepped lump-sum simulation for a single Taiwan-listed equity.
//!
//! # Components
//!
//! - **Corporate Action Provider**: one merged, ordered view of forward
//!   splits (curated table plus stock-dividend-derived entries)
//! - **Simulation Engine**: deterministic day-by-day state machine over
//!   a price series, producing an event ledger, an equity curve, and
//!   summary metrics
//! - **Orchestrator**: runs the engine for the target and the 006208
//!   benchmark and composes the two into one result
//!
//! # Example
//!
//! ```ignore
//! use backtest_engine::{run_backtest, BENCHMARK_SYMBOL};
//!
//! let backtest = run_backtest(&client, &config).await?;
//! println!("Return: {}%", backtest.result.return_rate);
//! ```

pub mod corporate_actions;
pub mod engine;
pub mod orchestrator;

// Re-exports
pub use corporate_actions::list_splits;
pub use engine::simulate;
pub use orchestrator::{run_backtest, BENCHMARK_SYMBOL};
