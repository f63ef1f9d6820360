//! HTTP client for the public Binance REST API.

use reqwest::{Client, Response};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ApiError, Error, Result};

/// HTTP client for making requests to the Binance API.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    config: Arc<Config>,
    http: Client,
}

impl BinanceClient {
    /// Create a new client with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// Create a client with the default public configuration.
    pub fn public() -> Result<Self> {
        Self::new(Config::public())
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/api/v3{}", self.config.base_url, endpoint)
    }

    /// Make a GET request to a public endpoint.
    pub async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint_url(endpoint);
        tracing::debug!("GET {} {:?}", url, params);

        let response = self.http.get(&url).query(params).send().await?;
        Self::handle_response(response).await
    }

    /// Handle the API response.
    async fn handle_response<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::decode_body(status.as_u16(), &body)
    }

    /// Decode a response body, turning error payloads into [`Error::Api`].
    pub(crate) fn decode_body<T: serde::de::DeserializeOwned>(status: u16, body: &str) -> Result<T> {
        let value: serde_json::Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                if !(200..300).contains(&status) {
                    return Err(Error::Api(ApiError::new(
                        status as i32,
                        format!("HTTP {status}: {body}"),
                    )));
                }
                tracing::error!("Failed to parse response: {}", body);
                return Err(Error::Json(e));
            }
        };

        // Binance can wrap errors in any status, so inspect the payload first
        if let Some(api_error) = ApiError::from_payload(&value) {
            return Err(Error::Api(api_error));
        }

        if !(200..300).contains(&status) {
            return Err(Error::Api(ApiError::new(
                status as i32,
                format!("HTTP {status}: {body}"),
            )));
        }

        serde_json::from_value(value).map_err(|e| {
            tracing::error!("Unexpected response shape: {}", body);
            Error::Json(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let config = Config::public().with_base_url("http://localhost:8080/");
        let client = BinanceClient::new(config).unwrap();
        assert_eq!(
            client.endpoint_url("/klines"),
            "http://localhost:8080/api/v3/klines"
        );
    }

    #[test]
    fn test_decode_error_payload_with_success_status() {
        let result: Result<Vec<serde_json::Value>> =
            BinanceClient::decode_body(200, r#"{"code":-1121,"msg":"Invalid symbol."}"#);
        match result {
            Err(Error::Api(e)) => assert!(e.is_invalid_symbol()),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_non_json_error_status() {
        let result: Result<serde_json::Value> = BinanceClient::decode_body(502, "Bad Gateway");
        match result {
            Err(Error::Api(e)) => assert_eq!(e.code, 502),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_data() {
        let prices: Vec<serde_json::Value> =
            BinanceClient::decode_body(200, r#"[{"symbol":"BTCUSDT","price":"1.5"}]"#).unwrap();
        assert_eq!(prices.len(), 1);
    }
}
