//! Persistence interfaces for alerts, notifications and analysis history.
//!
//! The dashboard only needs save/list/update/delete. [`MemoryStore`]
//! implements every trait in memory and can round-trip through a JSON file.

use std::fs;
use std::path::Path;

use alertchart_core::{Direction, TradeHypothesis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No {kind} with id {id}")]
    NotFound { kind: &'static str, id: u64 },
    #[error("Failed to read or write store: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode or decode store: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A persisted price alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(default)]
    pub id: u64,
    pub user_id: String,
    pub symbol: String,
    pub entry_price: Option<f64>,
    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
    pub is_long: bool,
    #[serde(default)]
    pub is_entered: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl AlertRecord {
    /// A fresh, active, not-yet-entered record for an armed hypothesis.
    pub fn from_hypothesis(user_id: &str, hypothesis: &TradeHypothesis) -> Self {
        Self {
            id: 0,
            user_id: user_id.to_string(),
            symbol: hypothesis.symbol.clone(),
            entry_price: hypothesis.entry_price,
            take_profit: hypothesis.take_profit,
            stop_loss: hypothesis.stop_loss,
            is_long: hypothesis.direction.is_long(),
            is_entered: false,
            is_active: true,
        }
    }

    pub fn direction(&self) -> Direction {
        if self.is_long {
            Direction::Long
        } else {
            Direction::Short
        }
    }
}

/// A persisted notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: u64,
    pub user_id: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: i64,
}

/// A saved analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: u64,
    pub user_id: String,
    pub symbol: String,
    pub mode: String,
    pub result: serde_json::Value,
    pub created_at: i64,
}

pub trait AlertStore {
    /// Save a new alert and return its id.
    fn save_alert(&mut self, alert: AlertRecord) -> StoreResult<u64>;
    fn active_alerts(&self) -> StoreResult<Vec<AlertRecord>>;
    fn update_alert(&mut self, alert: &AlertRecord) -> StoreResult<()>;
    fn delete_alert(&mut self, id: u64) -> StoreResult<()>;
}

pub trait NotificationStore {
    fn save_notification(&mut self, user_id: &str, message: &str, created_at: i64) -> StoreResult<u64>;
    /// Up to `limit` notifications for `user_id`, newest first.
    fn notifications(&self, user_id: &str, limit: usize) -> StoreResult<Vec<NotificationRecord>>;
    /// Mark every notification of `user_id` read. Returns how many changed.
    fn mark_all_read(&mut self, user_id: &str) -> StoreResult<usize>;
    fn unread_count(&self, user_id: &str) -> StoreResult<usize>;
    fn delete_notification(&mut self, id: u64) -> StoreResult<()>;
}

pub trait HistoryStore {
    fn save_history(&mut self, entry: HistoryEntry) -> StoreResult<u64>;
    /// Up to `limit` entries for `user_id`, newest first.
    fn history(&self, user_id: &str, limit: usize) -> StoreResult<Vec<HistoryEntry>>;
    fn delete_history(&mut self, id: u64) -> StoreResult<()>;
}

/// In-memory store for all three record kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    next_id: u64,
    alerts: Vec<AlertRecord>,
    notifications: Vec<NotificationRecord>,
    history: Vec<HistoryEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON file.
    ///
    /// Accepts either a full store document or a bare array of alert
    /// records.
    pub fn load<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let content = fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        let mut store = if value.is_array() {
            let alerts: Vec<AlertRecord> = serde_json::from_value(value)?;
            Self {
                alerts,
                ..Self::default()
            }
        } else {
            serde_json::from_value(value)?
        };
        store.renumber();
        Ok(store)
    }

    /// Load from `path` if it exists, otherwise start empty.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn alerts(&self) -> &[AlertRecord] {
        &self.alerts
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Give id-less records an id and move the counter past every id seen.
    fn renumber(&mut self) {
        let max_id = self
            .alerts
            .iter()
            .map(|a| a.id)
            .chain(self.notifications.iter().map(|n| n.id))
            .chain(self.history.iter().map(|h| h.id))
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(max_id);

        for i in 0..self.alerts.len() {
            if self.alerts[i].id == 0 {
                self.alerts[i].id = self.allocate_id();
            }
        }
        for i in 0..self.history.len() {
            if self.history[i].id == 0 {
                self.history[i].id = self.allocate_id();
            }
        }
    }
}

impl AlertStore for MemoryStore {
    fn save_alert(&mut self, mut alert: AlertRecord) -> StoreResult<u64> {
        alert.id = self.allocate_id();
        let id = alert.id;
        self.alerts.push(alert);
        Ok(id)
    }

    fn active_alerts(&self) -> StoreResult<Vec<AlertRecord>> {
        Ok(self.alerts.iter().filter(|a| a.is_active).cloned().collect())
    }

    fn update_alert(&mut self, alert: &AlertRecord) -> StoreResult<()> {
        let slot = self
            .alerts
            .iter_mut()
            .find(|a| a.id == alert.id)
            .ok_or(StoreError::NotFound {
                kind: "alert",
                id: alert.id,
            })?;
        *slot = alert.clone();
        Ok(())
    }

    fn delete_alert(&mut self, id: u64) -> StoreResult<()> {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        if self.alerts.len() == before {
            return Err(StoreError::NotFound { kind: "alert", id });
        }
        Ok(())
    }
}

impl NotificationStore for MemoryStore {
    fn save_notification(&mut self, user_id: &str, message: &str, created_at: i64) -> StoreResult<u64> {
        let id = self.allocate_id();
        self.notifications.push(NotificationRecord {
            id,
            user_id: user_id.to_string(),
            message: message.to_string(),
            is_read: false,
            created_at,
        });
        Ok(id)
    }

    fn notifications(&self, user_id: &str, limit: usize) -> StoreResult<Vec<NotificationRecord>> {
        let mut records: Vec<NotificationRecord> = self
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        records.truncate(limit);
        Ok(records)
    }

    fn mark_all_read(&mut self, user_id: &str) -> StoreResult<usize> {
        let mut changed = 0;
        for n in self.notifications.iter_mut().filter(|n| n.user_id == user_id && !n.is_read) {
            n.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    fn unread_count(&self, user_id: &str) -> StoreResult<usize> {
        Ok(self
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count())
    }

    fn delete_notification(&mut self, id: u64) -> StoreResult<()> {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        if self.notifications.len() == before {
            return Err(StoreError::NotFound {
                kind: "notification",
                id,
            });
        }
        Ok(())
    }
}

impl HistoryStore for MemoryStore {
    fn save_history(&mut self, mut entry: HistoryEntry) -> StoreResult<u64> {
        entry.id = self.allocate_id();
        let id = entry.id;
        self.history.push(entry);
        Ok(id)
    }

    fn history(&self, user_id: &str, limit: usize) -> StoreResult<Vec<HistoryEntry>> {
        let mut entries: Vec<HistoryEntry> = self
            .history
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        entries.truncate(limit);
        Ok(entries)
    }

    fn delete_history(&mut self, id: u64) -> StoreResult<()> {
        let before = self.history.len();
        self.history.retain(|h| h.id != id);
        if self.history.len() == before {
            return Err(StoreError::NotFound { kind: "history entry", id });
        }
        Ok(())
    }
}
