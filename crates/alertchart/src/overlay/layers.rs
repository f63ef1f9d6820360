//! Named overlay layers and the surface series behind them.

use std::collections::HashMap;

use super::surface::{ChartSurface, SeriesHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerName {
    EntryLine,
    TpLine,
    SlLine,
    TpBandFill,
    TpBandErase,
    SlBandFill,
    SlBandErase,
    Trendline,
}

impl LayerName {
    pub fn all() -> &'static [LayerName] {
        &[
            LayerName::EntryLine,
            LayerName::TpLine,
            LayerName::SlLine,
            LayerName::TpBandFill,
            LayerName::TpBandErase,
            LayerName::SlBandFill,
            LayerName::SlBandErase,
            LayerName::Trendline,
        ]
    }
}

/// Every series the overlay owns, by layer.
#[derive(Debug, Default)]
pub struct LayerRegistry {
    layers: HashMap<LayerName, SeriesHandle>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `name`, removing any series it replaces.
    pub fn insert(&mut self, surface: &mut dyn ChartSurface, name: LayerName, handle: SeriesHandle) {
        if let Some(old) = self.layers.insert(name, handle) {
            surface.remove_series(old);
        }
    }

    pub fn get(&self, name: LayerName) -> Option<SeriesHandle> {
        self.layers.get(&name).copied()
    }

    pub fn contains(&self, name: LayerName) -> bool {
        self.layers.contains_key(&name)
    }

    /// Remove every layer from the surface.
    pub fn clear_all(&mut self, surface: &mut dyn ChartSurface) {
        for (_, handle) in self.layers.drain() {
            surface.remove_series(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::surface::{RecordingSurface, SeriesStyle};

    fn area(surface: &mut RecordingSurface) -> SeriesHandle {
        surface.add_series(SeriesStyle::Area {
            color: "#000".to_string(),
        })
    }

    #[test]
    fn test_replacing_a_layer_removes_old_series() {
        let mut surface = RecordingSurface::new();
        let mut layers = LayerRegistry::new();

        let first = area(&mut surface);
        layers.insert(&mut surface, LayerName::EntryLine, first);
        let second = area(&mut surface);
        layers.insert(&mut surface, LayerName::EntryLine, second);

        assert_eq!(layers.len(), 1);
        assert_eq!(layers.get(LayerName::EntryLine), Some(second));
        assert!(surface.series(first).is_none());
    }

    #[test]
    fn test_clear_all() {
        let mut surface = RecordingSurface::new();
        let mut layers = LayerRegistry::new();
        for name in LayerName::all() {
            let handle = area(&mut surface);
            layers.insert(&mut surface, *name, handle);
        }
        assert_eq!(surface.series_count(), LayerName::all().len());

        layers.clear_all(&mut surface);
        assert!(layers.is_empty());
        assert_eq!(surface.series_count(), 0);
    }
}
