//! Chart overlay for the armed hypothesis.
//!
//! The renderer decides what to draw and when; a [`ChartSurface`] does the
//! drawing. Every series the overlay creates is tracked in a
//! [`LayerRegistry`] so one call can remove all of them.

pub mod layers;
pub mod renderer;
pub mod surface;

pub use layers::{LayerName, LayerRegistry};
pub use renderer::{loss_band, profit_band, right_edge, Band, OverlayRenderer, OverlayStyle};
pub use surface::{
    ChartSurface, LineStyle, RecordedSeries, RecordingSurface, SeriesHandle, SeriesPoint,
    SeriesStyle,
};
