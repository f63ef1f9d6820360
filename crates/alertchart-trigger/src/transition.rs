//! The per-tick transition rule.

use alertchart_core::{Direction, LevelKind, TradeHypothesis};

use crate::state::{AlertEvent, TriggerState};

/// Advance `state` by one tick.
///
/// Entry is a strict crossing between `prev_close` and `curr_close`, so it is
/// skipped when there is no previous close. Exits are thresholds on
/// `curr_close`, take-profit first, and are only checked once in trade. A tick
/// performs at most one transition. A level that is `None` never fires.
pub fn next(
    state: TriggerState,
    prev_close: Option<f64>,
    curr_close: f64,
    tick_time: i64,
    hypothesis: &TradeHypothesis,
) -> (TriggerState, Option<AlertEvent>) {
    if !curr_close.is_finite() {
        return (state, None);
    }
    let direction = hypothesis.direction;

    match state {
        TriggerState::WaitingEntry => {
            let (Some(prev), Some(entry)) = (prev_close, hypothesis.entry_price) else {
                return (state, None);
            };
            if !crossed_entry(direction, prev, entry, curr_close) {
                return (state, None);
            }
            let event = AlertEvent {
                kind: LevelKind::Entry,
                level: entry,
                close: curr_close,
                time: tick_time,
            };
            (TriggerState::InTrade { entered_at: tick_time }, Some(event))
        }
        TriggerState::InTrade { entered_at } => {
            let exit = [LevelKind::TakeProfit, LevelKind::StopLoss]
                .into_iter()
                .find_map(|kind| {
                    let level = hypothesis.level(kind)?;
                    exit_reached(direction, kind, level, curr_close).then_some((kind, level))
                });
            match exit {
                Some((kind, level)) => (
                    TriggerState::Closed {
                        entered_at,
                        exit: kind,
                        trade_end_time: tick_time,
                    },
                    Some(AlertEvent {
                        kind,
                        level,
                        close: curr_close,
                        time: tick_time,
                    }),
                ),
                None => (state, None),
            }
        }
        TriggerState::Closed { .. } => (state, None),
    }
}

/// Long: `prev < entry <= curr`. Short: `prev > entry >= curr`.
pub fn crossed_entry(direction: Direction, prev: f64, entry: f64, curr: f64) -> bool {
    match direction {
        Direction::Long => prev < entry && entry <= curr,
        Direction::Short => prev > entry && entry >= curr,
    }
}

/// Threshold test for an exit level. Always false for `Entry`.
pub fn exit_reached(direction: Direction, kind: LevelKind, level: f64, close: f64) -> bool {
    match (kind, direction) {
        (LevelKind::TakeProfit, Direction::Long) | (LevelKind::StopLoss, Direction::Short) => {
            close >= level
        }
        (LevelKind::TakeProfit, Direction::Short) | (LevelKind::StopLoss, Direction::Long) => {
            close <= level
        }
        (LevelKind::Entry, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long() -> TradeHypothesis {
        TradeHypothesis::new("BTCUSDT", Direction::Long, Some(100.0), Some(110.0), Some(95.0), 0)
    }

    fn short() -> TradeHypothesis {
        TradeHypothesis::new("ETHUSDT", Direction::Short, Some(50.0), Some(40.0), Some(55.0), 0)
    }

    #[test]
    fn test_first_tick_never_enters() {
        let (state, event) = next(TriggerState::WaitingEntry, None, 150.0, 1, &long());
        assert_eq!(state, TriggerState::WaitingEntry);
        assert!(event.is_none());
    }

    #[test]
    fn test_long_entry_cross() {
        let (state, event) = next(TriggerState::WaitingEntry, Some(98.0), 100.0, 7, &long());
        assert_eq!(state, TriggerState::InTrade { entered_at: 7 });
        let event = event.unwrap();
        assert_eq!(event.kind, LevelKind::Entry);
        assert_eq!(event.level, 100.0);
        assert_eq!(event.time, 7);
    }

    #[test]
    fn test_starting_on_the_level_is_not_a_cross() {
        let (state, _) = next(TriggerState::WaitingEntry, Some(100.0), 105.0, 1, &long());
        assert_eq!(state, TriggerState::WaitingEntry);
    }

    #[test]
    fn test_short_entry_cross() {
        let (state, event) = next(TriggerState::WaitingEntry, Some(52.0), 49.0, 3, &short());
        assert!(state.is_entered());
        assert_eq!(event.unwrap().kind, LevelKind::Entry);

        let (state, _) = next(TriggerState::WaitingEntry, Some(48.0), 47.0, 3, &short());
        assert_eq!(state, TriggerState::WaitingEntry);
    }

    #[test]
    fn test_exits_not_checked_while_waiting() {
        // Far beyond both exits, but no entry cross yet
        let (state, event) = next(TriggerState::WaitingEntry, Some(120.0), 130.0, 1, &long());
        assert_eq!(state, TriggerState::WaitingEntry);
        assert!(event.is_none());
        let (state, event) = next(TriggerState::WaitingEntry, Some(90.0), 80.0, 1, &long());
        assert_eq!(state, TriggerState::WaitingEntry);
        assert!(event.is_none());
    }

    #[test]
    fn test_take_profit_before_stop_loss() {
        // Degenerate levels where both thresholds hold on the same close
        let h = TradeHypothesis::new("X", Direction::Long, Some(100.0), Some(101.0), Some(105.0), 0);
        let (state, event) = next(TriggerState::InTrade { entered_at: 1 }, Some(100.0), 102.0, 2, &h);
        assert_eq!(event.unwrap().kind, LevelKind::TakeProfit);
        assert_eq!(state.trade_end_time(), Some(2));
    }

    #[test]
    fn test_stop_loss_exit() {
        let (state, event) = next(TriggerState::InTrade { entered_at: 1 }, Some(99.0), 95.0, 4, &long());
        assert_eq!(event.unwrap().kind, LevelKind::StopLoss);
        assert_eq!(
            state,
            TriggerState::Closed {
                entered_at: 1,
                exit: LevelKind::StopLoss,
                trade_end_time: 4
            }
        );
    }

    #[test]
    fn test_closed_is_absorbing() {
        let closed = TriggerState::Closed {
            entered_at: 1,
            exit: LevelKind::TakeProfit,
            trade_end_time: 2,
        };
        for close in [50.0, 94.0, 100.0, 111.0, 200.0] {
            let (state, event) = next(closed, Some(100.0), close, 3, &long());
            assert_eq!(state, closed);
            assert!(event.is_none());
        }
    }

    #[test]
    fn test_missing_level_disables_only_its_branch() {
        let mut h = long();
        h.stop_loss = None;
        let in_trade = TriggerState::InTrade { entered_at: 1 };

        let (state, event) = next(in_trade, Some(99.0), 10.0, 2, &h);
        assert_eq!(state, in_trade);
        assert!(event.is_none());

        let (state, event) = next(in_trade, Some(99.0), 110.0, 3, &h);
        assert!(state.is_closed());
        assert_eq!(event.unwrap().kind, LevelKind::TakeProfit);

        h.entry_price = None;
        let (state, _) = next(TriggerState::WaitingEntry, Some(90.0), 120.0, 1, &h);
        assert_eq!(state, TriggerState::WaitingEntry);
    }

    #[test]
    fn test_non_finite_close_is_ignored() {
        let (state, event) = next(TriggerState::WaitingEntry, Some(98.0), f64::NAN, 1, &long());
        assert_eq!(state, TriggerState::WaitingEntry);
        assert!(event.is_none());
    }
}
