//! Core types for the alertchart workspace.
//!
//! This crate provides fundamental data structures with no external dependencies:
//! - `Candle` - OHLCV candle data keyed by open time
//! - `Timeframe` - Kline interval enumeration
//! - `TradeHypothesis` - An armed entry / take-profit / stop-loss plan
//! - Symbol and price-string helpers shared by every layer

pub mod candle;
pub mod signal;
pub mod symbol;
pub mod timeframe;

pub use candle::{Candle, OHLCV};
pub use signal::{
    Direction, DrawingPoint, LevelKind, TradeHypothesis, TrendlineDrawing,
};
pub use symbol::{display_pair, format_price, parse_price, sanitize_symbol};
pub use timeframe::Timeframe;
