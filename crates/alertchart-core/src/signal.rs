//! Trade hypothesis types shared by the trigger engine and the chart overlay.

use std::fmt;

/// Trade direction of an armed hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Infer direction from a free-text sentiment label.
    ///
    /// Returns `None` when the label mentions neither "bullish" nor
    /// "bearish", or mentions both.
    pub fn from_sentiment(sentiment: &str) -> Option<Direction> {
        let lower = sentiment.to_lowercase();
        match (lower.contains("bullish"), lower.contains("bearish")) {
            (true, false) => Some(Direction::Long),
            (false, true) => Some(Direction::Short),
            _ => None,
        }
    }

    /// Infer direction from where the exits sit relative to the entry.
    pub fn from_levels(entry: f64, take_profit: f64, stop_loss: f64) -> Option<Direction> {
        if take_profit > entry && entry > stop_loss {
            Some(Direction::Long)
        } else if take_profit < entry && entry < stop_loss {
            Some(Direction::Short)
        } else {
            None
        }
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Direction::Long)
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// The three price levels a hypothesis carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelKind {
    Entry,
    TakeProfit,
    StopLoss,
}

impl LevelKind {
    /// Name used in notification messages.
    pub fn label(&self) -> &'static str {
        match self {
            LevelKind::Entry => "Entry Price",
            LevelKind::TakeProfit => "Take Profit",
            LevelKind::StopLoss => "Stop Loss",
        }
    }

    pub fn all() -> &'static [LevelKind] {
        &[LevelKind::Entry, LevelKind::TakeProfit, LevelKind::StopLoss]
    }
}

/// A point of a trendline annotation, in chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingPoint {
    pub time: i64,
    pub price: f64,
}

/// A trendline annotation suggested by the analysis service.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendlineDrawing {
    pub kind: String,
    pub label: Option<String>,
    pub points: Vec<DrawingPoint>,
}

impl TrendlineDrawing {
    /// Points sorted by time with duplicate times collapsed (the later
    /// point wins). Returns `None` when fewer than two points remain.
    pub fn polyline(&self) -> Option<Vec<DrawingPoint>> {
        let mut points: Vec<DrawingPoint> = Vec::with_capacity(self.points.len());
        for point in &self.points {
            if !point.price.is_finite() {
                continue;
            }
            match points.iter_mut().find(|p| p.time == point.time) {
                Some(existing) => *existing = *point,
                None => points.push(*point),
            }
        }
        points.sort_by_key(|p| p.time);

        if points.len() >= 2 {
            Some(points)
        } else {
            None
        }
    }
}

/// An entry / take-profit / stop-loss plan for one symbol.
///
/// Levels are `None` when the source value could not be parsed; a missing
/// level disables its own checks and drawings only.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeHypothesis {
    pub symbol: String,
    pub entry_price: Option<f64>,
    pub take_profit: Option<f64>,
    pub stop_loss: Option<f64>,
    pub direction: Direction,
    /// Time of the last candle when the hypothesis was armed.
    pub anchor_time: i64,
    pub drawings: Vec<TrendlineDrawing>,
}

impl TradeHypothesis {
    pub fn new(
        symbol: impl Into<String>,
        direction: Direction,
        entry_price: Option<f64>,
        take_profit: Option<f64>,
        stop_loss: Option<f64>,
        anchor_time: i64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            entry_price,
            take_profit,
            stop_loss,
            direction,
            anchor_time,
            drawings: Vec::new(),
        }
    }

    pub fn with_drawings(mut self, drawings: Vec<TrendlineDrawing>) -> Self {
        self.drawings = drawings;
        self
    }

    /// Price of the given level, if it parsed.
    pub fn level(&self, kind: LevelKind) -> Option<f64> {
        match kind {
            LevelKind::Entry => self.entry_price,
            LevelKind::TakeProfit => self.take_profit,
            LevelKind::StopLoss => self.stop_loss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_sentiment() {
        assert_eq!(Direction::from_sentiment("Strong Bullish"), Some(Direction::Long));
        assert_eq!(Direction::from_sentiment("bearish"), Some(Direction::Short));
        assert_eq!(Direction::from_sentiment("Ranging/Neutral"), None);
        assert_eq!(Direction::from_sentiment("bullish then bearish"), None);
    }

    #[test]
    fn test_direction_from_levels() {
        assert_eq!(Direction::from_levels(100.0, 110.0, 95.0), Some(Direction::Long));
        assert_eq!(Direction::from_levels(50.0, 40.0, 55.0), Some(Direction::Short));
        assert_eq!(Direction::from_levels(100.0, 110.0, 105.0), None);
    }

    #[test]
    fn test_polyline_dedupes_and_sorts() {
        let drawing = TrendlineDrawing {
            kind: "trendline".into(),
            label: None,
            points: vec![
                DrawingPoint { time: 300, price: 3.0 },
                DrawingPoint { time: 100, price: 1.0 },
                DrawingPoint { time: 300, price: 3.5 },
            ],
        };
        let points = drawing.polyline().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].time, 100);
        assert_eq!(points[1].price, 3.5);
    }

    #[test]
    fn test_polyline_requires_two_points() {
        let drawing = TrendlineDrawing {
            kind: "trendline".into(),
            label: None,
            points: vec![
                DrawingPoint { time: 100, price: 1.0 },
                DrawingPoint { time: 100, price: 2.0 },
            ],
        };
        assert!(drawing.polyline().is_none());
    }

    #[test]
    fn test_level_lookup() {
        let h = TradeHypothesis::new("BTCUSDT", Direction::Long, Some(100.0), None, Some(95.0), 0);
        assert_eq!(h.level(LevelKind::Entry), Some(100.0));
        assert_eq!(h.level(LevelKind::TakeProfit), None);
    }
}
