//! Chart sessions and the dashboard that drives them.
//!
//! A session is one symbol and interval. Opening a new one bumps the
//! generation; results from background tasks carry the generation they
//! were started for, and anything from an older session is dropped.

mod dashboard;
mod sink;

pub use dashboard::{Dashboard, DashboardSettings};
pub use sink::StoreSink;
pub(crate) use sink::unix_now;

use std::fmt;

use alertchart_analysis::AnalysisResult;
use alertchart_core::{Candle, Timeframe};

/// Identifies one opened session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    generation: u64,
    symbol: String,
    interval: Timeframe,
}

impl SessionHandle {
    pub(crate) fn new(generation: u64, symbol: String, interval: Timeframe) -> Self {
        Self {
            generation,
            symbol,
            interval,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Timeframe {
        self.interval
    }

    /// Wrap a background result for this session.
    pub fn tag(&self, message: BackgroundMessage) -> Envelope {
        Envelope {
            generation: self.generation,
            message,
        }
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} #{}", self.symbol, self.interval, self.generation)
    }
}

/// Results sent from background tasks to the dashboard.
#[derive(Debug, Clone)]
pub enum BackgroundMessage {
    /// Historical candles fetched.
    HistoryLoaded(Vec<Candle>),
    HistoryFailed(String),
    /// Live candle update from the kline stream.
    LiveCandle { candle: Candle, is_closed: bool },
    /// Live stream connection status changed.
    ConnectionStatus(bool),
    /// A stream fault.
    StreamError(String),
    AnalysisReady(AnalysisResult),
    AnalysisFailed(String),
}

/// A [`BackgroundMessage`] tagged with the session generation it belongs to.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub generation: u64,
    pub message: BackgroundMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Waiting for history.
    Loading,
    Ready,
    /// History could not be loaded.
    NoData(String),
}
