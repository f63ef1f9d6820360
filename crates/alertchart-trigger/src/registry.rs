//! The session's single armed hypothesis.

use alertchart_core::{
    parse_price, sanitize_symbol, Candle, Direction, TradeHypothesis, TrendlineDrawing,
};
use thiserror::Error;

use crate::engine::TriggerEngine;
use crate::state::AlertEvent;

/// Why a signal could not be armed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArmError {
    #[error("Cannot arm alerts without a symbol")]
    MissingSymbol,
    #[error("No price level of the {symbol} signal could be parsed")]
    NoLevels { symbol: String },
    #[error("Cannot tell whether the {symbol} signal is long or short")]
    AmbiguousDirection { symbol: String },
}

/// Raw signal fields as they come out of an analysis result.
#[derive(Debug, Clone, Default)]
pub struct ArmRequest {
    pub symbol: String,
    pub entry_price: String,
    pub take_profit: String,
    pub stop_loss: String,
    pub sentiment: Option<String>,
    pub drawings: Vec<TrendlineDrawing>,
    /// Time of the last candle when arming.
    pub anchor_time: i64,
}

impl ArmRequest {
    /// Parse levels and resolve the direction.
    ///
    /// Direction comes from the sentiment label. When the label says
    /// neither or both of bullish/bearish, the level geometry decides.
    pub fn into_hypothesis(self) -> Result<TradeHypothesis, ArmError> {
        let symbol = sanitize_symbol(&self.symbol);
        if symbol.is_empty() {
            return Err(ArmError::MissingSymbol);
        }

        let entry = parse_price(&self.entry_price);
        let take_profit = parse_price(&self.take_profit);
        let stop_loss = parse_price(&self.stop_loss);
        if entry.is_none() && take_profit.is_none() && stop_loss.is_none() {
            return Err(ArmError::NoLevels { symbol });
        }

        let direction = self
            .sentiment
            .as_deref()
            .and_then(Direction::from_sentiment)
            .or_else(|| match (entry, take_profit, stop_loss) {
                (Some(e), Some(tp), Some(sl)) => Direction::from_levels(e, tp, sl),
                _ => None,
            })
            .ok_or_else(|| ArmError::AmbiguousDirection {
                symbol: symbol.clone(),
            })?;

        Ok(
            TradeHypothesis::new(symbol, direction, entry, take_profit, stop_loss, self.anchor_time)
                .with_drawings(self.drawings),
        )
    }
}

/// Holds at most one armed hypothesis and its trigger engine.
#[derive(Debug, Clone, Default)]
pub struct SignalRegistry {
    armed: Option<TriggerEngine>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm from raw analysis fields, replacing any armed hypothesis.
    ///
    /// On error the previous hypothesis stays armed.
    pub fn arm(&mut self, request: ArmRequest) -> Result<&TradeHypothesis, ArmError> {
        match request.into_hypothesis() {
            Ok(hypothesis) => Ok(self.arm_hypothesis(hypothesis)),
            Err(e) => {
                log::warn!("Refusing to arm alerts: {}", e);
                Err(e)
            }
        }
    }

    /// Arm an already-built hypothesis, replacing any armed one.
    pub fn arm_hypothesis(&mut self, hypothesis: TradeHypothesis) -> &TradeHypothesis {
        let engine = match self.armed.take() {
            Some(mut engine) => {
                engine.arm(hypothesis);
                engine
            }
            None => TriggerEngine::new(hypothesis),
        };
        self.armed.insert(engine).hypothesis()
    }

    /// Disarm, returning the hypothesis that was armed.
    pub fn clear(&mut self) -> Option<TradeHypothesis> {
        self.armed.take().map(|engine| engine.hypothesis().clone())
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn hypothesis(&self) -> Option<&TradeHypothesis> {
        self.armed.as_ref().map(|e| e.hypothesis())
    }

    pub fn engine(&self) -> Option<&TriggerEngine> {
        self.armed.as_ref()
    }

    /// Feed a tick to the armed engine. Without one, nothing happens.
    pub fn on_tick(&mut self, candle: &Candle) -> Option<AlertEvent> {
        self.armed.as_mut().and_then(|engine| engine.on_tick(candle))
    }
}
