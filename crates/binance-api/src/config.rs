//! Configuration for the Binance API client.

use std::time::Duration;

/// Configuration for the REST client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for REST API (default: https://api.binance.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: crate::SPOT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("alertchart-binance/{}", crate::VERSION),
        }
    }
}

impl Config {
    /// Create a configuration for public endpoints.
    pub fn public() -> Self {
        Self::default()
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// WebSocket configuration.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket base URL; the stream name is appended as a path segment.
    pub url: String,
    /// Ping interval.
    pub ping_interval: Duration,
    /// Reconnect on disconnect.
    pub auto_reconnect: bool,
    /// Maximum reconnect attempts.
    pub max_reconnect_attempts: u32,
    /// Reconnect delay, multiplied by the attempt number.
    pub reconnect_delay: Duration,
    /// Channel buffer size.
    pub channel_buffer_size: usize,
    /// How long `connect` waits for the first connection.
    pub connect_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: crate::SPOT_WS_URL.to_string(),
            ping_interval: Duration::from_secs(30),
            auto_reconnect: true,
            max_reconnect_attempts: 5,
            reconnect_delay: Duration::from_secs(1),
            channel_buffer_size: 1000,
            connect_timeout: Duration::from_secs(15),
        }
    }
}

impl WsConfig {
    /// Create a WebSocket config with custom URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the ping interval.
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Set auto reconnect behavior.
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Set the channel buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.channel_buffer_size = size;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Full URL for a single raw stream, e.g. `btcusdt@kline_1m`.
    pub fn stream_url(&self, stream: &str) -> String {
        format!("{}/{}", self.url, stream)
    }
}
