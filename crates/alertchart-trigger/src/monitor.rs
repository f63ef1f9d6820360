//! Batch evaluation of stored alerts against a price snapshot.
//!
//! Unlike [`TriggerEngine`](crate::TriggerEngine), which needs a previous
//! close to detect a crossing, the monitor only sees one price per symbol
//! and compares it against the levels as thresholds.

use std::collections::HashMap;

use alertchart_core::{Direction, LevelKind};

use crate::notification::alert_message;
use crate::store::{AlertRecord, AlertStore, NotificationStore, StoreResult};

/// A message produced for one alert during a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorNotification {
    pub alert_id: u64,
    pub user_id: String,
    pub kind: LevelKind,
    pub message: String,
}

/// Result of one monitor pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorOutcome {
    pub notifications: Vec<MonitorNotification>,
    /// Alerts that crossed their entry during this pass.
    pub entered: Vec<u64>,
    /// Alerts that reached take-profit or stop-loss and are now inactive.
    pub deactivated: Vec<u64>,
}

impl MonitorOutcome {
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Write the pass back: flag entered alerts, deactivate closed ones and
    /// save every notification.
    pub fn apply<S>(&self, alerts: &[AlertRecord], store: &mut S, now: i64) -> StoreResult<()>
    where
        S: AlertStore + NotificationStore,
    {
        for alert in alerts {
            let entered = self.entered.contains(&alert.id);
            let deactivated = self.deactivated.contains(&alert.id);
            if !entered && !deactivated {
                continue;
            }
            let mut updated = alert.clone();
            updated.is_entered |= entered;
            if deactivated {
                updated.is_active = false;
            }
            store.update_alert(&updated)?;
        }

        for n in &self.notifications {
            store.save_notification(&n.user_id, &n.message, now)?;
        }
        Ok(())
    }
}

/// Evaluate every active alert against `prices` (keyed by exchange symbol).
///
/// Alerts whose symbol has no price are skipped. An alert can enter and
/// exit in the same pass. Take-profit is checked before stop-loss.
pub fn process_alerts(alerts: &[AlertRecord], prices: &HashMap<String, f64>) -> MonitorOutcome {
    let mut outcome = MonitorOutcome::default();

    for alert in alerts.iter().filter(|a| a.is_active) {
        let Some(&price) = prices.get(&alert.symbol) else {
            log::debug!("No price for {}, skipping alert {}", alert.symbol, alert.id);
            continue;
        };
        if !price.is_finite() {
            continue;
        }

        let direction = alert.direction();
        let mut entered = alert.is_entered;

        if !entered {
            if let Some(entry) = alert.entry_price {
                if at_or_beyond(direction, price, entry) {
                    entered = true;
                    outcome.entered.push(alert.id);
                    push(&mut outcome, alert, LevelKind::Entry, entry);
                }
            }
        }
        if !entered {
            continue;
        }

        if let Some(tp) = alert.take_profit {
            if at_or_beyond(direction, price, tp) {
                push(&mut outcome, alert, LevelKind::TakeProfit, tp);
                outcome.deactivated.push(alert.id);
                continue;
            }
        }
        if let Some(sl) = alert.stop_loss {
            if at_or_beyond(direction.opposite(), price, sl) {
                push(&mut outcome, alert, LevelKind::StopLoss, sl);
                outcome.deactivated.push(alert.id);
            }
        }
    }

    if !outcome.is_empty() {
        log::info!(
            "Monitor pass: {} notifications, {} entered, {} closed",
            outcome.notifications.len(),
            outcome.entered.len(),
            outcome.deactivated.len()
        );
    }
    outcome
}

/// `price` is at `level` or past it in the favourable direction.
fn at_or_beyond(direction: Direction, price: f64, level: f64) -> bool {
    match direction {
        Direction::Long => price >= level,
        Direction::Short => price <= level,
    }
}

fn push(outcome: &mut MonitorOutcome, alert: &AlertRecord, kind: LevelKind, level: f64) {
    outcome.notifications.push(MonitorNotification {
        alert_id: alert.id,
        user_id: alert.user_id.clone(),
        kind,
        message: alert_message(&alert.symbol, kind, level),
    });
}
