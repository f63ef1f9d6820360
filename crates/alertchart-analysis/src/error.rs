use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analysis service error: {0}")]
    Service(String),
    #[error("failed to parse analysis result: {0}")]
    Parse(String),
    #[error("no chart data to analyze")]
    NoData,
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Parse(err.to_string())
    }
}
