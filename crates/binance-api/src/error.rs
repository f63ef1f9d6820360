//! Error types for the Binance API client.

use std::fmt;

/// Result type alias for Binance API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Binance API client.
#[derive(Debug)]
pub enum Error {
    /// HTTP request failed
    Http(reqwest::Error),
    /// WebSocket error
    WebSocket(tokio_tungstenite::tungstenite::Error),
    /// JSON serialization/deserialization error
    Json(serde_json::Error),
    /// API returned an error payload
    Api(ApiError),
    /// Invalid parameter provided
    InvalidParameter(String),
    /// Connection closed unexpectedly
    ConnectionClosed,
    /// Timeout waiting for a connection
    Timeout,
    /// URL parsing error
    UrlParse(url::ParseError),
}

impl Error {
    /// The exchange's error payload, when the failure carried one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::WebSocket(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Api(e) => Some(e),
            Error::UrlParse(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::WebSocket(e) => write!(f, "WebSocket error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
            Error::Api(e) => write!(f, "API error: {e}"),
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
            Error::ConnectionClosed => write!(f, "Connection closed unexpectedly"),
            Error::Timeout => write!(f, "Timed out"),
            Error::UrlParse(e) => write!(f, "URL parse error: {e}"),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::UrlParse(err)
    }
}

/// Error payload returned by Binance endpoints (`{"code": -1121, "msg": "Invalid symbol."}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error code from the API
    pub code: i32,
    /// Error message
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Extract an error payload from a JSON body, if the body is error-shaped.
    ///
    /// Binance may answer with `{"code": .., "msg": ..}` instead of the
    /// expected data, so callers check the payload and not only the status.
    pub fn from_payload(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let code = obj.get("code")?.as_i64()?;
        let message = obj.get("msg")?.as_str()?;
        Some(Self::new(code as i32, message))
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.code, 429 | -1003)
    }

    /// Check if the symbol was rejected.
    pub fn is_invalid_symbol(&self) -> bool {
        self.code == -1121
    }
}
