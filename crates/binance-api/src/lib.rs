//! # Binance public market-data client
//!
//! A small async client for the public parts of the Binance spot API used by
//! alertchart: historical klines, ticker prices and the kline WebSocket
//! stream.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use binance_api::{BinanceClient, SpotApi, types::KlineInterval};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), binance_api::Error> {
//!     let spot = SpotApi::new(BinanceClient::public()?);
//!
//!     let klines = spot
//!         .market()
//!         .klines("BTCUSDT", KlineInterval::OneDay, None, None, Some(150))
//!         .await?;
//!     println!("fetched {} klines", klines.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Kline stream
//!
//! ```rust,ignore
//! use binance_api::{KlineStream, types::WsEvent};
//!
//! let mut stream = KlineStream::new();
//! let mut rx = stream.connect("BTCUSDT", "1m").await?;
//!
//! while let Some(event) = rx.recv().await {
//!     if let WsEvent::Kline { kline, .. } = event {
//!         println!("close = {}", kline.close);
//!     }
//! }
//! ```
//!
//! The REST client treats an error-shaped JSON body (`{"code": .., "msg": ..}`)
//! as [`Error::Api`] even when the HTTP status is a success.

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod spot;
pub mod types;
pub mod websocket;

// Re-exports for convenience
pub use client::BinanceClient;
pub use config::{Config, WsConfig};
pub use error::{ApiError, Error, Result};
pub use spot::SpotApi;
pub use websocket::{ConnectionState, KlineStream};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base URL for the Binance spot REST API.
pub const SPOT_BASE_URL: &str = "https://api.binance.com";

/// Base URL for Binance spot WebSocket streams.
pub const SPOT_WS_URL: &str = "wss://stream.binance.com:9443/ws";

/// Prelude module for convenient imports.
pub mod prelude {
    //! Common imports for using the Binance client.

    pub use crate::client::BinanceClient;
    pub use crate::config::{Config, WsConfig};
    pub use crate::error::{Error, Result};
    pub use crate::spot::{MarketApi, SpotApi};
    pub use crate::types::{Kline, KlineInterval, PriceTicker, WsEvent, WsKline};
    pub use crate::websocket::KlineStream;
}
