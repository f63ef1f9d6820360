//! Candle data for alertchart: historical sources, the live kline feed and
//! the per-session candle store.

pub mod binance;
pub mod csv;
pub mod error;
pub mod live;
pub mod source;
pub mod store;
pub mod validation;

pub use self::csv::CsvSource;
pub use binance::BinanceSource;
pub use error::DataError;
pub use live::{LiveDataEvent, LiveDataManager};
pub use source::{FetchRange, HistoricalSource};
pub use store::CandleStore;
