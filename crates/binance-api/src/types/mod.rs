//! Data types for Binance API responses and stream events.

mod common;
mod market;
mod websocket;

pub use common::*;
pub use market::*;
pub use websocket::*;
