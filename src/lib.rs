//! Focus Veil: a focus-overlay engine that dims and blurs everything on
//! screen except the window being worked in.
//!
//! The engine continuously resolves which screen region is "the active
//! window" (plus any transient menu surfaces that should also stay clear),
//! adapts its re-sampling cadence to pointer interaction, and maintains
//! one translucent overlay surface per display with rounded-rectangle
//! holes tracking the active window in real time.

pub mod cadence;
pub mod classify;
pub mod config;
pub mod constants;
pub mod controller;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod mask;
pub mod raster;
pub mod resolver;
pub mod snapshot;
pub mod state;
pub mod surface;
pub mod tracing_sub;

pub use cadence::{Cadence, CadencePhase, TrackingProfile};
pub use config::EngineConfig;
pub use controller::OverlayEngine;
pub use error::EngineError;
pub use event_loop::{ControlFlow, EngineLoop};
pub use geometry::{DisplayId, DisplayInfo, Rect, WindowId};
pub use mask::{MaskPurpose, MaskRegion};
pub use resolver::SnapshotResolver;
pub use snapshot::ActiveWindowSnapshot;
pub use surface::{FillStyle, MaskState, OverlaySurface};
