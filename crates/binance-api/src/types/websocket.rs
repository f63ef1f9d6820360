//! WebSocket message types.

use super::common::StringDecimal;
use serde::{Deserialize, Serialize};

/// Kline payload inside a Binance `kline` stream event (the `k` object).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WsKline {
    /// Open time (window start) in milliseconds.
    #[serde(rename = "t")]
    pub time: i64,
    /// Close time (window end) in milliseconds.
    #[serde(rename = "T", default)]
    pub close_time: Option<i64>,
    /// Interval label.
    #[serde(rename = "i", default)]
    pub interval: Option<String>,
    /// Open price.
    #[serde(rename = "o")]
    pub open: StringDecimal,
    /// High price.
    #[serde(rename = "h")]
    pub high: StringDecimal,
    /// Low price.
    #[serde(rename = "l")]
    pub low: StringDecimal,
    /// Close price.
    #[serde(rename = "c")]
    pub close: StringDecimal,
    /// Base volume.
    #[serde(rename = "v")]
    pub volume: StringDecimal,
    /// Whether this kline is closed (final).
    #[serde(rename = "x", default)]
    pub is_closed: bool,
}

/// A Binance `kline` stream event.
#[derive(Debug, Clone, Deserialize)]
pub struct WsKlineData {
    /// Event type (always "kline").
    #[serde(rename = "e")]
    pub event: String,
    /// Event time in milliseconds.
    #[serde(rename = "E")]
    pub event_time: i64,
    /// Symbol.
    #[serde(rename = "s")]
    pub symbol: String,
    /// Kline payload.
    #[serde(rename = "k")]
    pub kline: WsKline,
}

/// Parsed WebSocket event.
#[derive(Debug, Clone)]
pub enum WsEvent {
    /// Kline update.
    Kline {
        /// Symbol.
        symbol: String,
        /// Interval.
        interval: String,
        /// Kline data.
        kline: WsKline,
        /// Event timestamp.
        timestamp: i64,
    },
    /// Unknown/unparsed event.
    Unknown {
        /// Raw JSON.
        raw: String,
    },
    /// Ping message.
    Ping,
    /// Pong message.
    Pong,
}

impl WsEvent {
    /// Parse a text frame from a raw stream.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<WsKlineData>(text) {
            Ok(data) if data.event == "kline" => {
                let interval = data.kline.interval.clone().unwrap_or_default();
                WsEvent::Kline {
                    symbol: data.symbol,
                    interval,
                    kline: data.kline,
                    timestamp: data.event_time,
                }
            }
            _ => WsEvent::Unknown {
                raw: text.to_string(),
            },
        }
    }
}

/// Raw stream name for a symbol's klines (e.g. `btcusdt@kline_1m`).
pub fn kline_stream_name(symbol: &str, interval: &str) -> String {
    format!("{}@kline_{}", symbol.to_lowercase(), interval)
}
