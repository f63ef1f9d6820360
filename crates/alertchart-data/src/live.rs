//! Live data management for real-time WebSocket updates.

use alertchart_core::{Candle, Timeframe};
use binance_api::{types::WsEvent, KlineStream, WsConfig};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::binance::ws_kline_to_candle;
use crate::validation;
use crate::DataError;

/// Events emitted by the live data manager.
#[derive(Debug, Clone)]
pub enum LiveDataEvent {
    /// A candle has been updated.
    CandleUpdate {
        /// The updated candle data.
        candle: Candle,
        /// Whether the candle is closed (complete) or still forming.
        is_closed: bool,
    },
    /// WebSocket connected successfully.
    Connected,
    /// WebSocket disconnected.
    Disconnected,
    /// A stream fault that did not end the connection.
    Error(String),
}

/// Manages the live kline stream for one symbol and interval at a time.
pub struct LiveDataManager {
    symbol: String,
    interval: Option<Timeframe>,
    config: WsConfig,
    stream: Option<KlineStream>,
    task: Option<JoinHandle<()>>,
}

impl LiveDataManager {
    /// Create a new live data manager.
    pub fn new() -> Self {
        Self::with_config(WsConfig::default())
    }

    pub fn with_config(config: WsConfig) -> Self {
        Self {
            symbol: String::new(),
            interval: None,
            config,
            stream: None,
            task: None,
        }
    }

    /// Subscribe to live kline updates for a symbol.
    ///
    /// Any previous subscription is closed first. Returns a receiver for
    /// live data events.
    pub async fn subscribe(
        &mut self,
        symbol: &str,
        interval: Timeframe,
    ) -> Result<mpsc::Receiver<LiveDataEvent>, DataError> {
        self.unsubscribe().await?;

        self.symbol = symbol.to_uppercase();
        self.interval = Some(interval);

        let (event_tx, event_rx) = mpsc::channel(100);

        let mut stream = KlineStream::with_config(self.config.clone());
        let ws_rx = stream.connect(&self.symbol, interval.label()).await?;

        let _ = event_tx.send(LiveDataEvent::Connected).await;
        log::info!("Subscribed to {} {} klines", self.symbol, interval);

        let symbol = self.symbol.clone();
        self.task = Some(tokio::spawn(async move {
            process_ws_events(ws_rx, event_tx, symbol).await;
        }));
        self.stream = Some(stream);

        Ok(event_rx)
    }

    /// Unsubscribe and close the connection.
    pub async fn unsubscribe(&mut self) -> Result<(), DataError> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(mut stream) = self.stream.take() {
            stream.close().await?;
            log::info!("Unsubscribed from {} klines", self.symbol);
        }
        self.interval = None;
        Ok(())
    }

    /// Get the currently subscribed symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Option<Timeframe> {
        self.interval
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_connected())
    }
}

impl Default for LiveDataManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Process WebSocket events and forward kline updates for `expected_symbol`.
pub(crate) async fn process_ws_events(
    mut ws_rx: mpsc::Receiver<WsEvent>,
    event_tx: mpsc::Sender<LiveDataEvent>,
    expected_symbol: String,
) {
    while let Some(event) = ws_rx.recv().await {
        match event {
            WsEvent::Kline { symbol, kline, .. } => {
                if !symbol.eq_ignore_ascii_case(&expected_symbol) {
                    continue;
                }

                let candle = ws_kline_to_candle(&kline);
                let forwarded = if validation::validate_candle(&candle) {
                    LiveDataEvent::CandleUpdate {
                        candle,
                        is_closed: kline.is_closed,
                    }
                } else {
                    LiveDataEvent::Error(format!("malformed kline at {}", candle.time))
                };

                if event_tx.send(forwarded).await.is_err() {
                    return;
                }
            }
            WsEvent::Ping | WsEvent::Pong => {}
            WsEvent::Unknown { raw } => {
                log::debug!("Unknown WebSocket message: {}", &raw[..raw.len().min(100)]);
            }
        }
    }

    // Connection closed
    let _ = event_tx.send(LiveDataEvent::Disconnected).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kline_frame(symbol: &str, time_ms: i64, close: &str, closed: bool) -> WsEvent {
        WsEvent::parse(&format!(
            r#"{{"e":"kline","E":{time_ms},"s":"{symbol}","k":{{"t":{time_ms},"i":"1m","o":"100","h":"120","l":"90","c":"{close}","v":"1","x":{closed}}}}}"#
        ))
    }

    #[test]
    fn test_live_data_manager_creation() {
        let manager = LiveDataManager::new();
        assert_eq!(manager.symbol(), "");
        assert!(manager.interval().is_none());
    }

    #[tokio::test]
    async fn test_forwards_matching_klines_then_disconnects() {
        let (ws_tx, ws_rx) = mpsc::channel(8);
        let (event_tx, mut event_rx) = mpsc::channel(8);

        ws_tx.send(kline_frame("ETHUSDT", 60_000, "101", false)).await.unwrap();
        ws_tx.send(kline_frame("BTCUSDT", 60_000, "105", false)).await.unwrap();
        ws_tx.send(WsEvent::Ping).await.unwrap();
        ws_tx.send(kline_frame("BTCUSDT", 60_000, "-1", true)).await.unwrap();
        drop(ws_tx);

        process_ws_events(ws_rx, event_tx, "BTCUSDT".to_string()).await;

        match event_rx.recv().await {
            Some(LiveDataEvent::CandleUpdate { candle, is_closed }) => {
                assert_eq!(candle.time, 60);
                assert_eq!(candle.close, 105.0);
                assert!(!is_closed);
            }
            other => panic!("expected candle update, got {other:?}"),
        }
        assert!(matches!(event_rx.recv().await, Some(LiveDataEvent::Error(_))));
        assert!(matches!(event_rx.recv().await, Some(LiveDataEvent::Disconnected)));
    }
}
