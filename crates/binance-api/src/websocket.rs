//! WebSocket client for the Binance kline stream.

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::interval;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::config::WsConfig;
use crate::error::{Error, Result};
use crate::types::{kline_stream_name, WsEvent};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected.
    Disconnected,
    /// Dialing for the first time.
    Connecting,
    /// Connected and ready.
    Connected,
    /// Waiting to redial after the connection dropped.
    Reconnecting,
}

/// Streams live klines for one symbol and interval.
///
/// Binance raw streams carry the subscription in the URL, so a stream is
/// bound to its symbol/interval at connect time. Reconnects reuse the
/// same URL.
#[derive(Debug)]
pub struct KlineStream {
    config: WsConfig,
    state: watch::Receiver<ConnectionState>,
    close_tx: Option<mpsc::Sender<()>>,
}

impl KlineStream {
    /// Create a new stream client with default configuration.
    pub fn new() -> Self {
        Self::with_config(WsConfig::default())
    }

    /// Create a new stream client with custom configuration.
    pub fn with_config(config: WsConfig) -> Self {
        Self {
            config,
            state: idle_state(),
            close_tx: None,
        }
    }

    /// Connect to the kline stream for `symbol` at `interval` (e.g. "1m").
    ///
    /// Resolves once the first connection is up. Any previous connection
    /// held by this client is closed first.
    pub async fn connect(&mut self, symbol: &str, interval: &str) -> Result<mpsc::Receiver<WsEvent>> {
        if symbol.trim().is_empty() {
            return Err(Error::InvalidParameter("empty symbol".to_string()));
        }
        self.close().await?;

        let url = self.config.stream_url(&kline_stream_name(symbol, interval));
        url::Url::parse(&url)?;

        let (close_tx, close_rx) = mpsc::channel(1);
        let (event_tx, event_rx) = mpsc::channel(self.config.channel_buffer_size);
        let (state_tx, mut state_rx) = watch::channel(ConnectionState::Connecting);
        self.close_tx = Some(close_tx);
        self.state = state_rx.clone();

        tracing::info!("Connecting kline stream {}", url);
        tokio::spawn(run_connection(
            self.config.clone(),
            url,
            state_tx,
            close_rx,
            event_tx,
        ));

        match tokio::time::timeout(self.config.connect_timeout, wait_connected(&mut state_rx)).await {
            Ok(Ok(())) => Ok(event_rx),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                self.close().await?;
                Err(Error::Timeout)
            }
        }
    }

    /// Close the WebSocket connection.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(tx) = self.close_tx.take() {
            let _ = tx.send(()).await;
        }
        self.state = idle_state();
        Ok(())
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

impl Default for KlineStream {
    fn default() -> Self {
        Self::new()
    }
}

fn idle_state() -> watch::Receiver<ConnectionState> {
    watch::channel(ConnectionState::Disconnected).1
}

/// Wait for `Connected`. Fails once the connection task has given up.
async fn wait_connected(state: &mut watch::Receiver<ConnectionState>) -> Result<()> {
    loop {
        if *state.borrow_and_update() == ConnectionState::Connected {
            return Ok(());
        }
        if state.changed().await.is_err() {
            return Err(Error::ConnectionClosed);
        }
    }
}

/// Linear reconnect delay with an attempt cap.
#[derive(Debug, Clone)]
struct Backoff {
    enabled: bool,
    max_attempts: u32,
    delay: Duration,
    attempts: u32,
}

impl Backoff {
    fn new(config: &WsConfig) -> Self {
        Self {
            enabled: config.auto_reconnect,
            max_attempts: config.max_reconnect_attempts,
            delay: config.reconnect_delay,
            attempts: 0,
        }
    }

    /// Delay before the next attempt, or `None` when out of attempts.
    fn next_delay(&mut self) -> Option<Duration> {
        if !self.enabled || self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.delay * self.attempts)
    }

    fn reset(&mut self) {
        self.attempts = 0;
    }
}

/// Why a connected session ended.
enum SessionEnd {
    /// The socket dropped; worth redialing.
    Lost,
    /// Closed locally or nobody is listening any more.
    Stopped,
}

/// Dial, pump and redial until closed or out of attempts.
async fn run_connection(
    config: WsConfig,
    url: String,
    state: watch::Sender<ConnectionState>,
    mut close_rx: mpsc::Receiver<()>,
    event_tx: mpsc::Sender<WsEvent>,
) {
    let mut backoff = Backoff::new(&config);

    loop {
        match connect_async(url.as_str()).await {
            Ok((socket, _)) => {
                backoff.reset();
                let _ = state.send(ConnectionState::Connected);
                tracing::info!("Kline stream connected");

                let end = pump(socket, config.ping_interval, &mut close_rx, &event_tx).await;
                if matches!(end, SessionEnd::Stopped) {
                    break;
                }
            }
            Err(e) => tracing::warn!("WebSocket connection failed: {}", e),
        }

        let Some(delay) = backoff.next_delay() else {
            tracing::warn!("Giving up on kline stream after {} attempts", backoff.attempts);
            break;
        };
        let _ = state.send(ConnectionState::Reconnecting);
        tracing::info!("Reconnecting kline stream in {:?} (attempt {})", delay, backoff.attempts);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = close_rx.recv() => break,
        }
    }

    let _ = state.send(ConnectionState::Disconnected);
}

/// Forward frames from one live socket until it ends.
async fn pump(
    socket: Socket,
    ping_every: Duration,
    close_rx: &mut mpsc::Receiver<()>,
    event_tx: &mpsc::Sender<WsEvent>,
) -> SessionEnd {
    let (mut write, mut read) = socket.split();
    let mut ping = interval(ping_every);

    loop {
        tokio::select! {
            frame = read.next() => {
                let event = match frame {
                    Some(Ok(Message::Text(text))) => WsEvent::parse(&text),
                    Some(Ok(Message::Ping(data))) => {
                        let _ = write.send(Message::Pong(data)).await;
                        WsEvent::Ping
                    }
                    Some(Ok(Message::Pong(_))) => WsEvent::Pong,
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("Kline stream closed by server");
                        return SessionEnd::Lost;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error: {}", e);
                        return SessionEnd::Lost;
                    }
                    None => {
                        tracing::info!("Kline stream ended");
                        return SessionEnd::Lost;
                    }
                };
                if event_tx.send(event).await.is_err() {
                    tracing::debug!("Event receiver dropped, closing kline stream");
                    let _ = write.send(Message::Close(None)).await;
                    return SessionEnd::Stopped;
                }
            }

            _ = close_rx.recv() => {
                let _ = write.send(Message::Close(None)).await;
                return SessionEnd::Stopped;
            }

            _ = ping.tick() => {
                if write.send(Message::Ping(Vec::new())).await.is_err() {
                    tracing::warn!("Failed to send ping");
                    return SessionEnd::Lost;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_url() {
        let config = WsConfig::default();
        assert_eq!(
            config.stream_url(&kline_stream_name("BTCUSDT", "1m")),
            "wss://stream.binance.com:9443/ws/btcusdt@kline_1m"
        );
    }

    #[tokio::test]
    async fn test_empty_symbol_rejected() {
        let mut stream = KlineStream::new();
        assert!(matches!(
            stream.connect(" ", "1m").await,
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(stream.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_backoff_grows_then_gives_up() {
        let config = WsConfig::default();
        let mut backoff = Backoff::new(&config);
        let delays: Vec<Duration> = std::iter::from_fn(|| backoff.next_delay()).collect();
        assert_eq!(delays.len(), config.max_reconnect_attempts as usize);
        assert_eq!(delays[0], config.reconnect_delay);
        assert_eq!(delays[2], config.reconnect_delay * 3);

        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(config.reconnect_delay));
    }

    #[test]
    fn test_backoff_disabled() {
        let config = WsConfig::default().with_auto_reconnect(false);
        assert_eq!(Backoff::new(&config).next_delay(), None);
    }

    #[tokio::test]
    async fn test_wait_connected_fails_when_task_exits() {
        let (tx, mut rx) = watch::channel(ConnectionState::Connecting);
        drop(tx);
        assert!(matches!(wait_connected(&mut rx).await, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_wait_connected_sees_later_connect() {
        let (tx, mut rx) = watch::channel(ConnectionState::Connecting);
        let waiter = tokio::spawn(async move { wait_connected(&mut rx).await });
        tx.send(ConnectionState::Connected).unwrap();
        assert!(waiter.await.unwrap().is_ok());
    }
}
