//! Spot market endpoints.

mod market;

pub use market::*;

use crate::client::BinanceClient;

/// Spot API client wrapper.
#[derive(Debug, Clone)]
pub struct SpotApi {
    client: BinanceClient,
}

impl SpotApi {
    /// Create a new Spot API client.
    pub fn new(client: BinanceClient) -> Self {
        Self { client }
    }

    /// Get the underlying HTTP client.
    pub fn client(&self) -> &BinanceClient {
        &self.client
    }

    /// Get market data API.
    pub fn market(&self) -> MarketApi {
        MarketApi::new(self.client.clone())
    }
}
