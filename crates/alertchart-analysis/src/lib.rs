//! Trade-signal analysis for alertchart.
//!
//! An [`AnalysisService`] turns a window of candles into an
//! [`AnalysisResult`] carrying entry / take-profit / stop-loss strings, a
//! sentiment label and optional trendline drawings.
//!
//! - [`RemoteAnalyzer`] posts to a hosted analysis function.
//! - [`HeuristicAnalyzer`] computes a simple signal from the last candle,
//!   for offline runs.

pub mod error;
pub mod heuristic;
pub mod parse;
pub mod remote;
pub mod types;

pub use alertchart_config::AnalysisMode;
pub use error::AnalysisError;
pub use heuristic::HeuristicAnalyzer;
pub use parse::parse_result;
pub use remote::RemoteAnalyzer;
pub use types::{AnalysisRequest, AnalysisResult, ChartPoint, DrawingSpec, PointSpec};

use async_trait::async_trait;

/// Anything that can produce a trade signal from candles.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError>;
}
