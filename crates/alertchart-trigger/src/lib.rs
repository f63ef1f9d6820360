//! Live price-alert trigger engine.
//!
//! An armed [`TradeHypothesis`](alertchart_core::TradeHypothesis) moves through
//! `WaitingEntry → InTrade → Closed` as ticks arrive:
//!
//! - [`transition::next`] is the pure per-tick rule.
//! - [`TriggerEngine`] tracks the previous close and the current state.
//! - [`SignalRegistry`] holds at most one armed engine for a session.
//! - [`monitor::process_alerts`] applies threshold checks to stored
//!   [`AlertRecord`]s in batch.
//!
//! Fired events become [`AlertNotification`]s delivered to a
//! [`NotificationSink`].

pub mod engine;
pub mod monitor;
pub mod notification;
pub mod registry;
pub mod state;
pub mod store;
pub mod transition;

pub use engine::TriggerEngine;
pub use monitor::{process_alerts, MonitorNotification, MonitorOutcome};
pub use notification::{alert_message, AlertNotification, NotificationSink};
pub use registry::{ArmError, ArmRequest, SignalRegistry};
pub use state::{AlertEvent, FiredEvents, TriggerState};
pub use store::{
    AlertRecord, AlertStore, HistoryEntry, HistoryStore, MemoryStore, NotificationRecord,
    NotificationStore, StoreError,
};
