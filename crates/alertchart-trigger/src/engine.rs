//! Stateful wrapper around the transition rule.

use alertchart_core::{display_pair, Candle, TradeHypothesis};

use crate::state::{AlertEvent, FiredEvents, TriggerState};
use crate::transition;

/// Tracks one armed hypothesis across ticks.
#[derive(Debug, Clone)]
pub struct TriggerEngine {
    hypothesis: TradeHypothesis,
    state: TriggerState,
    prev_close: Option<f64>,
}

impl TriggerEngine {
    /// Arm a new engine in `WaitingEntry` with no previous close.
    pub fn new(hypothesis: TradeHypothesis) -> Self {
        Self {
            hypothesis,
            state: TriggerState::WaitingEntry,
            prev_close: None,
        }
    }

    /// Replace the hypothesis and start over.
    pub fn arm(&mut self, hypothesis: TradeHypothesis) {
        self.hypothesis = hypothesis;
        self.reset();
    }

    /// Clear fired events, the trade end time and the previous close.
    pub fn reset(&mut self) {
        self.state = TriggerState::WaitingEntry;
        self.prev_close = None;
    }

    /// Evaluate one tick. The tick's close becomes the next previous close.
    pub fn on_tick(&mut self, candle: &Candle) -> Option<AlertEvent> {
        let (state, event) = transition::next(
            self.state,
            self.prev_close,
            candle.close,
            candle.time,
            &self.hypothesis,
        );
        self.state = state;
        if candle.close.is_finite() {
            self.prev_close = Some(candle.close);
        }

        if let Some(event) = &event {
            log::info!(
                "{} {} fired at {} (close {})",
                display_pair(&self.hypothesis.symbol),
                event.kind.label(),
                event.level,
                event.close
            );
        }
        event
    }

    pub fn hypothesis(&self) -> &TradeHypothesis {
        &self.hypothesis
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn fired(&self) -> FiredEvents {
        self.state.fired()
    }

    pub fn trade_end_time(&self) -> Option<i64> {
        self.state.trade_end_time()
    }

    pub fn prev_close(&self) -> Option<f64> {
        self.prev_close
    }
}
