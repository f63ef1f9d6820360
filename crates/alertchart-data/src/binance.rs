//! Binance REST data source for loading candle data.

use std::collections::HashMap;

use alertchart_core::{Candle, Timeframe};
use async_trait::async_trait;
use binance_api::types::{Kline, KlineInterval, WsKline};
use binance_api::{BinanceClient, SpotApi};

use crate::source::{FetchRange, HistoricalSource};
use crate::validation::validate_price;
use crate::DataError;

/// Binance data source for fetching kline data and ticker prices.
#[derive(Debug, Clone)]
pub struct BinanceSource {
    spot: SpotApi,
}

impl BinanceSource {
    pub fn new(client: BinanceClient) -> Self {
        Self {
            spot: SpotApi::new(client),
        }
    }

    /// Source using the public Binance endpoint.
    pub fn public() -> Result<Self, DataError> {
        Ok(Self::new(BinanceClient::public()?))
    }

    /// Latest prices for `symbols`, keyed by symbol. Invalid quotes are
    /// left out.
    pub async fn latest_prices(&self, symbols: &[&str]) -> Result<HashMap<String, f64>, DataError> {
        let tickers = self.spot.market().ticker_prices(symbols).await?;
        Ok(tickers
            .into_iter()
            .filter_map(|t| {
                let price = t.price.to_f64();
                validate_price(price).then_some((t.symbol, price))
            })
            .collect())
    }
}

/// Map a timeframe onto the exchange's interval enum.
pub fn kline_interval(interval: Timeframe) -> Result<KlineInterval, DataError> {
    KlineInterval::from_label(interval.label())
        .ok_or_else(|| DataError::UnsupportedInterval(interval.label().to_string()))
}

#[async_trait]
impl HistoricalSource for BinanceSource {
    async fn fetch(
        &self,
        symbol: &str,
        interval: Timeframe,
        range: FetchRange,
    ) -> Result<Vec<Candle>, DataError> {
        let klines = self
            .spot
            .market()
            .klines(
                symbol,
                kline_interval(interval)?,
                range.start_time.map(|s| s * 1000),
                range.end_time.map(|s| s * 1000),
                range.limit,
            )
            .await
            .map_err(|e| match e.api_error() {
                Some(api) if api.is_invalid_symbol() => {
                    DataError::Unavailable(format!("unknown symbol {symbol}"))
                }
                _ => DataError::Api(e),
            })?;

        log::debug!("Fetched {} klines for {} {}", klines.len(), symbol, interval);
        Ok(klines.iter().map(kline_to_candle).collect())
    }
}

/// Convert a REST kline to a Candle.
pub fn kline_to_candle(kline: &Kline) -> Candle {
    Candle::new(
        kline.open_time / 1000, // ms → seconds
        kline.open.to_f64(),
        kline.high.to_f64(),
        kline.low.to_f64(),
        kline.close.to_f64(),
        kline.volume.to_f64(),
    )
}

/// Convert a WebSocket kline to a Candle.
pub fn ws_kline_to_candle(kline: &WsKline) -> Candle {
    Candle::new(
        kline.time / 1000,
        kline.open.to_f64(),
        kline.high.to_f64(),
        kline.low.to_f64(),
        kline.close.to_f64(),
        kline.volume.to_f64(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_timeframe_maps_to_an_interval() {
        for tf in Timeframe::all() {
            assert!(kline_interval(*tf).is_ok(), "{tf} has no kline interval");
        }
    }

    #[test]
    fn test_kline_to_candle_converts_ms() {
        let kline: Kline =
            serde_json::from_str(r#"[1700000000000, "100", "110", "90", "105", "7"]"#).unwrap();
        let candle = kline_to_candle(&kline);
        assert_eq!(candle.time, 1_700_000_000);
        assert_eq!(candle.close, 105.0);
        assert_eq!(candle.volume, 7.0);
    }
}
