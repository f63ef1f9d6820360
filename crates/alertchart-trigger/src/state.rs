//! Trigger state and the events it emits.

use alertchart_core::LevelKind;

/// Where an armed hypothesis is in its lifecycle.
///
/// The fired-event set is derived from the variant, so it can only grow
/// and can never hold both exits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TriggerState {
    /// Armed, waiting for price to cross the entry level.
    #[default]
    WaitingEntry,
    /// Entry crossed at `entered_at`; watching take-profit and stop-loss.
    InTrade { entered_at: i64 },
    /// An exit fired. Absorbing.
    Closed {
        entered_at: i64,
        exit: LevelKind,
        trade_end_time: i64,
    },
}

impl TriggerState {
    pub fn fired(&self) -> FiredEvents {
        match self {
            TriggerState::WaitingEntry => FiredEvents::default(),
            TriggerState::InTrade { .. } => FiredEvents::from_kinds(&[LevelKind::Entry]),
            TriggerState::Closed { exit, .. } => FiredEvents::from_kinds(&[LevelKind::Entry, *exit]),
        }
    }

    /// Time of the tick that closed the trade.
    pub fn trade_end_time(&self) -> Option<i64> {
        match self {
            TriggerState::Closed { trade_end_time, .. } => Some(*trade_end_time),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, TriggerState::Closed { .. })
    }

    pub fn is_entered(&self) -> bool {
        !matches!(self, TriggerState::WaitingEntry)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TriggerState::WaitingEntry => "waiting for entry",
            TriggerState::InTrade { .. } => "in trade",
            TriggerState::Closed { .. } => "closed",
        }
    }
}

/// Set of level kinds that have fired for one hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FiredEvents {
    entry: bool,
    take_profit: bool,
    stop_loss: bool,
}

impl FiredEvents {
    fn from_kinds(kinds: &[LevelKind]) -> Self {
        let mut set = Self::default();
        for kind in kinds {
            match kind {
                LevelKind::Entry => set.entry = true,
                LevelKind::TakeProfit => set.take_profit = true,
                LevelKind::StopLoss => set.stop_loss = true,
            }
        }
        set
    }

    pub fn contains(&self, kind: LevelKind) -> bool {
        match kind {
            LevelKind::Entry => self.entry,
            LevelKind::TakeProfit => self.take_profit,
            LevelKind::StopLoss => self.stop_loss,
        }
    }

    /// Whether a terminal event (take-profit or stop-loss) is in the set.
    pub fn has_exit(&self) -> bool {
        self.take_profit || self.stop_loss
    }

    pub fn iter(&self) -> impl Iterator<Item = LevelKind> + '_ {
        LevelKind::all().iter().copied().filter(|k| self.contains(*k))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A level crossing detected on a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertEvent {
    pub kind: LevelKind,
    /// Price of the level that was crossed.
    pub level: f64,
    /// Close of the tick that crossed it.
    pub close: f64,
    /// Time of that tick.
    pub time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fired_set_follows_state() {
        assert!(TriggerState::WaitingEntry.fired().is_empty());

        let in_trade = TriggerState::InTrade { entered_at: 5 };
        assert_eq!(in_trade.fired().iter().collect::<Vec<_>>(), vec![LevelKind::Entry]);
        assert!(!in_trade.fired().has_exit());

        let closed = TriggerState::Closed {
            entered_at: 5,
            exit: LevelKind::StopLoss,
            trade_end_time: 9,
        };
        assert_eq!(closed.fired().len(), 2);
        assert!(closed.fired().contains(LevelKind::StopLoss));
        assert!(!closed.fired().contains(LevelKind::TakeProfit));
        assert_eq!(closed.trade_end_time(), Some(9));
    }
}
