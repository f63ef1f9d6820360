//! Event and command type definitions.
//!
//! - [`DashboardEvent`] - What happened while the dashboard processed a
//!   message, for the runner to report
//! - [`Command`] - Work the dashboard needs done outside its own thread

use alertchart_analysis::AnalysisRequest;
use alertchart_core::Direction;

use crate::session::SessionHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    SessionOpened(SessionHandle),
    SessionClosed(SessionHandle),
    /// History arrived and the candle series was drawn.
    HistoryLoaded { handle: SessionHandle, candles: usize },
    /// The session has no usable candles.
    NoData { handle: SessionHandle, reason: String },
    ConnectionChanged(bool),
    Armed {
        symbol: String,
        direction: Direction,
    },
    /// A transient message for the user: fired alerts, refused arming,
    /// failed analysis.
    Toast(String),
}

impl DashboardEvent {
    /// One-line description for logs.
    pub fn describe(&self) -> String {
        match self {
            DashboardEvent::SessionOpened(h) => format!("opened {h}"),
            DashboardEvent::SessionClosed(h) => format!("closed {h}"),
            DashboardEvent::HistoryLoaded { handle, candles } => {
                format!("{handle}: {candles} candles loaded")
            }
            DashboardEvent::NoData { handle, reason } => format!("{handle}: no data ({reason})"),
            DashboardEvent::ConnectionChanged(true) => "live stream connected".to_string(),
            DashboardEvent::ConnectionChanged(false) => "live stream disconnected".to_string(),
            DashboardEvent::Armed { symbol, direction } => format!("armed {direction} {symbol}"),
            DashboardEvent::Toast(message) => message.clone(),
        }
    }
}

/// Work for the runner. Every command that produces results carries the
/// handle of the session that asked for it.
#[derive(Debug, Clone)]
pub enum Command {
    FetchHistory(SessionHandle),
    Subscribe(SessionHandle),
    /// Stop the current live stream.
    Unsubscribe,
    Analyze {
        handle: SessionHandle,
        request: AnalysisRequest,
    },
}
