//! Level lines, profit/loss bands and trendlines for the armed hypothesis.

use alertchart_config::OverlayConfig;
use alertchart_core::{Candle, Direction, LevelKind, TradeHypothesis};
use alertchart_trigger::TriggerState;

use super::layers::{LayerName, LayerRegistry};
use super::surface::{ChartSurface, LineStyle, SeriesPoint, SeriesStyle};

/// Colours and extension used by the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub lookahead_candles: i64,
    pub entry_color: String,
    pub take_profit_color: String,
    pub stop_loss_color: String,
    pub profit_band_color: String,
    pub loss_band_color: String,
    pub trendline_color: String,
    pub background: String,
}

impl From<&OverlayConfig> for OverlayStyle {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            lookahead_candles: i64::from(config.lookahead_candles),
            entry_color: config.entry_color.clone(),
            take_profit_color: config.take_profit_color.clone(),
            stop_loss_color: config.stop_loss_color.clone(),
            profit_band_color: config.profit_band_color.clone(),
            loss_band_color: config.loss_band_color.clone(),
            trendline_color: config.trendline_color.clone(),
            background: config.background.clone(),
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from(&OverlayConfig::default())
    }
}

/// A horizontal band between two prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub bottom: f64,
    pub top: f64,
}

impl Band {
    fn between(a: f64, b: f64) -> Self {
        Self {
            bottom: a.min(b),
            top: a.max(b),
        }
    }
}

/// Profit band: between entry and take-profit.
pub fn profit_band(hypothesis: &TradeHypothesis) -> Option<Band> {
    Some(Band::between(hypothesis.entry_price?, hypothesis.take_profit?))
}

/// Loss band: between stop-loss and entry.
pub fn loss_band(hypothesis: &TradeHypothesis) -> Option<Band> {
    Some(Band::between(hypothesis.entry_price?, hypothesis.stop_loss?))
}

/// Right edge of the level lines.
///
/// Open trades extend `lookahead` intervals past the latest tick; a closed
/// trade stops at its end time. `None` when the edge would not lie after
/// the anchor.
pub fn right_edge(
    anchor_time: i64,
    latest_tick_time: Option<i64>,
    state: TriggerState,
    lookahead_candles: i64,
    interval_secs: i64,
) -> Option<i64> {
    let edge = match state.trade_end_time() {
        Some(end) => end,
        None => latest_tick_time.unwrap_or(anchor_time) + lookahead_candles * interval_secs,
    };
    (edge > anchor_time).then_some(edge)
}

/// Draws the armed hypothesis and keeps it in step with ticks.
#[derive(Debug, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
    layers: LayerRegistry,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            style,
            layers: LayerRegistry::new(),
        }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    pub fn load_candles(&mut self, surface: &mut dyn ChartSurface, candles: &[Candle]) {
        surface.set_candles(candles);
    }

    pub fn push_candle(&mut self, surface: &mut dyn ChartSurface, candle: &Candle) {
        surface.update_candle(candle);
    }

    /// Remove every overlay layer.
    pub fn clear(&mut self, surface: &mut dyn ChartSurface) {
        self.layers.clear_all(surface);
    }

    /// Replace whatever is drawn with `hypothesis`.
    pub fn draw(
        &mut self,
        surface: &mut dyn ChartSurface,
        hypothesis: &TradeHypothesis,
        state: TriggerState,
        latest_tick_time: Option<i64>,
        interval_secs: i64,
    ) {
        self.layers.clear_all(surface);

        // Upper band first: each erase layer paints everything below its
        // band, so the lower band must be drawn over it.
        let mut bands = vec![
            (LayerName::TpBandFill, LayerName::TpBandErase, self.style.profit_band_color.clone()),
            (LayerName::SlBandFill, LayerName::SlBandErase, self.style.loss_band_color.clone()),
        ];
        if hypothesis.direction == Direction::Short {
            bands.reverse();
        }
        for (fill, erase, color) in bands {
            if band_for(hypothesis, fill).is_none() {
                continue;
            }
            let handle = surface.add_series(SeriesStyle::Area { color });
            self.layers.insert(surface, fill, handle);
            let handle = surface.add_series(SeriesStyle::Area {
                color: self.style.background.clone(),
            });
            self.layers.insert(surface, erase, handle);
        }

        for kind in LevelKind::all() {
            if hypothesis.level(*kind).is_none() {
                continue;
            }
            let (layer, color, style) = match kind {
                LevelKind::Entry => (LayerName::EntryLine, &self.style.entry_color, LineStyle::Dashed),
                LevelKind::TakeProfit => (LayerName::TpLine, &self.style.take_profit_color, LineStyle::Solid),
                LevelKind::StopLoss => (LayerName::SlLine, &self.style.stop_loss_color, LineStyle::Solid),
            };
            let handle = surface.add_series(SeriesStyle::Line {
                color: color.clone(),
                width: 2,
                style,
            });
            self.layers.insert(surface, layer, handle);
        }

        // First drawing with at least two distinct points
        if let Some(points) = hypothesis.drawings.iter().find_map(|d| d.polyline()) {
            let handle = surface.add_series(SeriesStyle::Line {
                color: self.style.trendline_color.clone(),
                width: 2,
                style: LineStyle::Solid,
            });
            let data: Vec<SeriesPoint> = points
                .iter()
                .map(|p| SeriesPoint::new(p.time, p.price))
                .collect();
            surface.set_series_data(handle, &data);
            self.layers.insert(surface, LayerName::Trendline, handle);
        }

        self.extend(surface, hypothesis, state, latest_tick_time, interval_secs);
    }

    /// Move the right edge of every line and band.
    pub fn extend(
        &mut self,
        surface: &mut dyn ChartSurface,
        hypothesis: &TradeHypothesis,
        state: TriggerState,
        latest_tick_time: Option<i64>,
        interval_secs: i64,
    ) {
        let anchor = hypothesis.anchor_time;
        let edge = right_edge(
            anchor,
            latest_tick_time,
            state,
            self.style.lookahead_candles,
            interval_secs,
        );
        let span = |value: f64| -> Vec<SeriesPoint> {
            match edge {
                Some(edge) => vec![SeriesPoint::new(anchor, value), SeriesPoint::new(edge, value)],
                None => vec![SeriesPoint::new(anchor, value)],
            }
        };

        for (layer, kind) in [
            (LayerName::EntryLine, LevelKind::Entry),
            (LayerName::TpLine, LevelKind::TakeProfit),
            (LayerName::SlLine, LevelKind::StopLoss),
        ] {
            if let (Some(handle), Some(level)) = (self.layers.get(layer), hypothesis.level(kind)) {
                surface.set_series_data(handle, &span(level));
            }
        }

        for (fill, erase) in [
            (LayerName::TpBandFill, LayerName::TpBandErase),
            (LayerName::SlBandFill, LayerName::SlBandErase),
        ] {
            let Some(band) = band_for(hypothesis, fill) else {
                continue;
            };
            if let Some(handle) = self.layers.get(fill) {
                surface.set_series_data(handle, &span(band.top));
            }
            if let Some(handle) = self.layers.get(erase) {
                surface.set_series_data(handle, &span(band.bottom));
            }
        }
    }
}

fn band_for(hypothesis: &TradeHypothesis, fill: LayerName) -> Option<Band> {
    match fill {
        LayerName::TpBandFill => profit_band(hypothesis),
        _ => loss_band(hypothesis),
    }
}
