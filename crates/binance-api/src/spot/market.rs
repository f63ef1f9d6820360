//! Market data endpoints for the spot API.

use crate::client::BinanceClient;
use crate::error::{Error, Result};
use crate::types::{Empty, Kline, KlineInterval, PriceTicker};

/// Maximum klines Binance returns per request.
pub const MAX_KLINES_PER_REQUEST: u32 = 1000;

/// Market data API.
#[derive(Debug, Clone)]
pub struct MarketApi {
    client: BinanceClient,
}

impl MarketApi {
    /// Create a new Market API instance.
    pub fn new(client: BinanceClient) -> Self {
        Self { client }
    }

    /// Test connectivity to the API.
    pub async fn ping(&self) -> Result<Empty> {
        self.client.get("/ping", &[]).await
    }

    /// Get kline/candlestick data.
    ///
    /// # Arguments
    /// * `symbol` - Trading pair (e.g. "BTCUSDT")
    /// * `interval` - Kline interval
    /// * `start_time` - Start timestamp in milliseconds
    /// * `end_time` - End timestamp in milliseconds
    /// * `limit` - Number of klines (default 500, max 1000)
    pub async fn klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Kline>> {
        let params = klines_params(symbol, interval, start_time, end_time, limit)?;
        self.client.get("/klines", &params).await
    }

    /// Get the latest price for several symbols in one request.
    ///
    /// An empty list returns every symbol the exchange knows.
    pub async fn ticker_prices(&self, symbols: &[&str]) -> Result<Vec<PriceTicker>> {
        if symbols.is_empty() {
            return self.client.get("/ticker/price", &[]).await;
        }
        let params = [("symbols", symbols_param(symbols)?)];
        self.client.get("/ticker/price", &params).await
    }

    /// Get the latest price for a single symbol.
    pub async fn ticker_price(&self, symbol: &str) -> Result<PriceTicker> {
        let params = [("symbol", checked_symbol(symbol)?)];
        self.client.get("/ticker/price", &params).await
    }
}

fn checked_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::InvalidParameter(format!("invalid symbol '{symbol}'")));
    }
    Ok(symbol)
}

/// Build the JSON array parameter Binance expects for `symbols`.
fn symbols_param(symbols: &[&str]) -> Result<String> {
    let checked = symbols
        .iter()
        .map(|s| checked_symbol(s))
        .collect::<Result<Vec<_>>>()?;
    Ok(serde_json::to_string(&checked)?)
}

fn klines_params(
    symbol: &str,
    interval: KlineInterval,
    start_time: Option<i64>,
    end_time: Option<i64>,
    limit: Option<u32>,
) -> Result<Vec<(&'static str, String)>> {
    let mut params = vec![
        ("symbol", checked_symbol(symbol)?),
        ("interval", interval.to_string()),
    ];

    if let Some(ts) = start_time {
        params.push(("startTime", ts.to_string()));
    }

    if let Some(ts) = end_time {
        params.push(("endTime", ts.to_string()));
    }

    if let Some(l) = limit {
        if l == 0 || l > MAX_KLINES_PER_REQUEST {
            return Err(Error::InvalidParameter(format!(
                "limit must be in 1..={MAX_KLINES_PER_REQUEST}, got {l}"
            )));
        }
        params.push(("limit", l.to_string()));
    }

    Ok(params)
}
