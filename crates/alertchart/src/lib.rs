//! alertchart - live trade-signal alerts with a synchronized chart overlay.
//!
//! The [`Dashboard`] owns one chart session at a time: its candles, the
//! armed hypothesis and the trigger engine. Network work happens in the
//! [`runner`], which feeds results back as tagged [`Envelope`]s.

pub mod events;
pub mod overlay;
pub mod runner;
pub mod session;

pub use events::{Command, DashboardEvent, EventBus};
pub use overlay::{ChartSurface, OverlayRenderer, OverlayStyle, RecordingSurface};
pub use session::{
    BackgroundMessage, Dashboard, DashboardSettings, Envelope, SessionHandle, SessionStatus,
};
