//! Offline analyzer based on the last two candles.

use alertchart_core::{format_price, Candle};
use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::types::{AnalysisRequest, AnalysisResult};
use crate::AnalysisService;

const ENTRY_FACTOR: f64 = 1.001;
const TAKE_PROFIT_FACTOR: f64 = 1.02;
const STOP_LOSS_FACTOR: f64 = 0.99;

/// Suggests a long setup around the last close. Ignores the request mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

impl HeuristicAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_candles(&self, candles: &[Candle]) -> AnalysisResult {
        let Some(last) = candles.last() else {
            return AnalysisResult::unavailable("Not enough data to perform analysis.");
        };
        let previous = candles.len().checked_sub(2).map_or(last, |i| &candles[i]);

        // A flat candle counts as bearish here
        let bullish = last.close > last.open;
        let body = if bullish { "bullish" } else { "bearish" };
        let trend = if last.close > previous.close {
            "upward"
        } else {
            "downward"
        };

        AnalysisResult {
            description: format!(
                "The last candle was {body} with a general {trend} trend. \
                 Based on this, a potential long entry is suggested."
            ),
            entry_price: format_price(last.close * ENTRY_FACTOR),
            take_profit: format_price(last.close * TAKE_PROFIT_FACTOR),
            stop_loss: format_price(last.close * STOP_LOSS_FACTOR),
            // Levels are always laid out long; a bearish body stays neutral
            // so direction comes from the level geometry.
            sentiment: Some(if bullish { "Bullish" } else { "Neutral" }.to_string()),
            ..AnalysisResult::default()
        }
    }
}

#[async_trait]
impl AnalysisService for HeuristicAnalyzer {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        Ok(self.analyze_candles(&request.candles))
    }
}
