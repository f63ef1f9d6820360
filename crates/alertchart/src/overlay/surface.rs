//! The drawing surface the overlay talks to.

use std::collections::BTreeMap;

use alertchart_core::Candle;

/// Opaque id of a series created on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesStyle {
    Line {
        color: String,
        width: u32,
        style: LineStyle,
    },
    /// Filled from the plotted value down to the bottom of the pane.
    Area { color: String },
}

impl SeriesStyle {
    pub fn color(&self) -> &str {
        match self {
            SeriesStyle::Line { color, .. } | SeriesStyle::Area { color } => color,
        }
    }
}

/// One plotted value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub time: i64,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

/// A chart that can show candles and extra series.
pub trait ChartSurface {
    fn set_candles(&mut self, candles: &[Candle]);
    fn update_candle(&mut self, candle: &Candle);
    fn add_series(&mut self, style: SeriesStyle) -> SeriesHandle;
    /// Replace the series' points. Unknown handles are ignored.
    fn set_series_data(&mut self, handle: SeriesHandle, points: &[SeriesPoint]);
    /// Unknown handles are ignored.
    fn remove_series(&mut self, handle: SeriesHandle);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSeries {
    pub style: SeriesStyle,
    pub points: Vec<SeriesPoint>,
}

/// In-memory surface that keeps whatever it is told to draw.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    candles: Vec<Candle>,
    series: BTreeMap<SeriesHandle, RecordedSeries>,
    next_id: u64,
    candle_updates: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Number of `update_candle` calls so far.
    pub fn candle_updates(&self) -> usize {
        self.candle_updates
    }

    pub fn series(&self, handle: SeriesHandle) -> Option<&RecordedSeries> {
        self.series.get(&handle)
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn all_series(&self) -> impl Iterator<Item = (SeriesHandle, &RecordedSeries)> {
        self.series.iter().map(|(h, s)| (*h, s))
    }
}

impl ChartSurface for RecordingSurface {
    fn set_candles(&mut self, candles: &[Candle]) {
        self.candles = candles.to_vec();
    }

    fn update_candle(&mut self, candle: &Candle) {
        self.candle_updates += 1;
        match self.candles.binary_search_by_key(&candle.time, |c| c.time) {
            Ok(i) => self.candles[i] = *candle,
            Err(i) => self.candles.insert(i, *candle),
        }
    }

    fn add_series(&mut self, style: SeriesStyle) -> SeriesHandle {
        self.next_id += 1;
        let handle = SeriesHandle(self.next_id);
        self.series.insert(
            handle,
            RecordedSeries {
                style,
                points: Vec::new(),
            },
        );
        handle
    }

    fn set_series_data(&mut self, handle: SeriesHandle, points: &[SeriesPoint]) {
        if let Some(series) = self.series.get_mut(&handle) {
            series.points = points.to_vec();
        }
    }

    fn remove_series(&mut self, handle: SeriesHandle) {
        self.series.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_surface_series_lifecycle() {
        let mut surface = RecordingSurface::new();
        let handle = surface.add_series(SeriesStyle::Area {
            color: "#fff".to_string(),
        });
        surface.set_series_data(handle, &[SeriesPoint::new(1, 2.0)]);
        assert_eq!(surface.series(handle).unwrap().points.len(), 1);

        surface.remove_series(handle);
        assert_eq!(surface.series_count(), 0);
        // Removing twice is harmless
        surface.remove_series(handle);
        surface.set_series_data(handle, &[SeriesPoint::new(1, 2.0)]);
        assert_eq!(surface.series_count(), 0);
    }

    #[test]
    fn test_update_candle_keeps_order() {
        let mut surface = RecordingSurface::new();
        surface.set_candles(&[Candle::flat(60, 1.0), Candle::flat(180, 3.0)]);
        surface.update_candle(&Candle::flat(120, 2.0));
        surface.update_candle(&Candle::flat(180, 4.0));

        let closes: Vec<f64> = surface.candles().iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 4.0]);
        assert_eq!(surface.candle_updates(), 2);
    }
}
