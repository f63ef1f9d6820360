//! User-facing notifications for fired alerts.

use alertchart_core::{display_pair, LevelKind, TradeHypothesis};

use crate::state::AlertEvent;

/// Where notifications go: a transient message for the user and a durable
/// record.
pub trait NotificationSink {
    fn show(&mut self, message: &str);
    fn persist(&mut self, user_id: &str, message: &str);
}

/// A fired alert rendered for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertNotification {
    pub symbol: String,
    pub kind: LevelKind,
    pub level: f64,
    pub time: i64,
    pub message: String,
}

impl AlertNotification {
    pub fn new(event: &AlertEvent, hypothesis: &TradeHypothesis) -> Self {
        Self {
            symbol: hypothesis.symbol.clone(),
            kind: event.kind,
            level: event.level,
            time: event.time,
            message: alert_message(&hypothesis.symbol, event.kind, event.level),
        }
    }

    /// Show and persist through `sink`.
    pub fn deliver(&self, sink: &mut dyn NotificationSink, user_id: &str) {
        sink.show(&self.message);
        sink.persist(user_id, &self.message);
    }
}

/// Message text for a level crossing, e.g.
/// `BTC/USDT has crossed the Entry Price at 100.`
pub fn alert_message(symbol: &str, kind: LevelKind, level: f64) -> String {
    let verb = match kind {
        LevelKind::Entry => "has crossed the",
        LevelKind::TakeProfit => "has reached the",
        LevelKind::StopLoss => "has hit the",
    };
    let level_name = match kind {
        LevelKind::Entry => kind.label().to_string(),
        _ => format!("{} level", kind.label()),
    };
    format!("{} {verb} {level_name} at {level}.", display_pair(symbol))
}
