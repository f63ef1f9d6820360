//! Error type for data loading.

use thiserror::Error;

/// Errors raised while loading or storing candles.
#[derive(Error, Debug)]
pub enum DataError {
    /// The source returned nothing usable.
    #[error("No candle data available: {0}")]
    Unavailable(String),
    /// A single candle failed validation.
    #[error("Malformed candle at {time}")]
    Malformed { time: i64 },
    /// The interval has no exchange equivalent.
    #[error("Unsupported interval: {0}")]
    UnsupportedInterval(String),
    #[error("Exchange error: {0}")]
    Api(#[from] binance_api::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("Failed to parse {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
