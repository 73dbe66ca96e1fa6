//! Core domain types for the backtester.

pub mod events;
pub mod market;
pub mod result;
pub mod simulation;

pub use events::*;
pub use market::*;
pub use result::*;
pub use simulation::*;
