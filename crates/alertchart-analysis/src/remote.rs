//! Client for the hosted analysis functions.

use std::time::Duration;

use alertchart_config::{AnalysisConfig, AnalysisMode};
use async_trait::async_trait;
use reqwest::Client;

use crate::error::AnalysisError;
use crate::parse::parse_result;
use crate::types::{AnalysisRequest, AnalysisResult};
use crate::AnalysisService;

/// Posts `{symbol, chartData}` to `{endpoint}/analyze-symbol` (or
/// `analyze-symbol-ultra`) and parses the reply. No retries.
#[derive(Debug, Clone)]
pub struct RemoteAnalyzer {
    endpoint: String,
    api_key: Option<String>,
    http: Client,
}

impl RemoteAnalyzer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: None,
            http,
        })
    }

    /// Build from the `[analysis]` section; `None` when no endpoint is set.
    pub fn from_config(
        config: &AnalysisConfig,
        timeout: Duration,
    ) -> Option<Result<Self, AnalysisError>> {
        let endpoint = config.endpoint.as_deref()?;
        Some(Self::new(endpoint, timeout).map(|a| a.with_api_key(config.api_key.clone())))
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn function_url(&self, mode: AnalysisMode) -> String {
        let function = match mode {
            AnalysisMode::Normal => "analyze-symbol",
            AnalysisMode::Ultra => "analyze-symbol-ultra",
        };
        format!("{}/{function}", self.endpoint)
    }
}

#[async_trait]
impl AnalysisService for RemoteAnalyzer {
    fn name(&self) -> &str {
        "remote"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        if request.candles.is_empty() {
            return Err(AnalysisError::NoData);
        }

        let url = self.function_url(request.mode);
        log::debug!("POST {} ({} candles)", url, request.candles.len());

        let mut builder = self.http.post(&url).json(&request.body());
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        match parse_result(&body) {
            Ok(result) if status.is_success() => Ok(result),
            Ok(_) => Err(AnalysisError::Service(format!("HTTP {status}"))),
            Err(AnalysisError::Parse(_)) if !status.is_success() => {
                Err(AnalysisError::Service(format!("HTTP {status}: {body}")))
            }
            Err(e) => Err(e),
        }
    }
}
