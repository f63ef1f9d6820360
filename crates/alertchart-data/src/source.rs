//! Historical data source trait definition.

use alertchart_core::{Candle, Timeframe};
use async_trait::async_trait;

use crate::DataError;

/// Time window for a historical fetch. Times are unix seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchRange {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub limit: Option<u32>,
}

impl FetchRange {
    /// The most recent `limit` candles.
    pub fn latest(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Whether `time` falls inside the start/end bounds.
    pub fn contains(&self, time: i64) -> bool {
        self.start_time.map_or(true, |s| time >= s) && self.end_time.map_or(true, |e| time <= e)
    }
}

/// Anything that can load a batch of candles for a symbol and interval.
#[async_trait]
pub trait HistoricalSource: Send + Sync {
    async fn fetch(
        &self,
        symbol: &str,
        interval: Timeframe,
        range: FetchRange,
    ) -> Result<Vec<Candle>, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains() {
        let range = FetchRange {
            start_time: Some(10),
            end_time: Some(20),
            limit: None,
        };
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(9));
        assert!(FetchRange::latest(5).contains(i64::MIN));
    }
}
