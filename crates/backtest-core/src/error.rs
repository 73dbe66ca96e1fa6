//! Error types for the backtester.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no price data for {symbol} in the requested range")]
    EmptyPriceSeries { symbol: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("data provider error: {message}")]
    Api { message: String, status: Option<u16> },

    #[error("no listing found for keyword '{query}'")]
    SymbolNotFound { query: String },
}

pub type Result<T> = std::result::Result<T, Error>;
