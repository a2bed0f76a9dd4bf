//! Trait seams to the host system. The engine only ever talks to these
//! traits; production code wires in real OS queries, tests and the demo
//! binary wire in [`sim`].

pub mod sim;

use std::time::Duration;

use crate::geometry::{DisplayInfo, ProcessId, Rect};
use crate::snapshot::WindowDescriptor;

/// Ordered, on-screen window metadata, independent of any permission grant.
pub trait WindowServer {
    /// The server's current z-ordered, on-screen, non-desktop window list.
    fn list_windows(&mut self) -> Vec<WindowDescriptor>;
}

/// Permissioned UI-element introspection. Availability can change at
/// runtime, so callers re-check [`Accessibility::is_trusted`] on every use
/// rather than caching the grant.
pub trait Accessibility {
    fn is_trusted(&mut self) -> bool;

    /// Screen-space frame of the focused window of `pid`, or of the
    /// frontmost application when `pid` is `None`.
    fn focused_window_frame(&mut self, pid: Option<ProcessId>) -> Option<Rect>;
}

/// Best-effort per-process window corner radius probe. Absence is the
/// normal case and handled via [`CornerRadii::fallback_radius`].
pub trait CornerRadii {
    fn corner_radius(&mut self, pid: ProcessId) -> Option<f64>;

    /// Host-version-dependent fallback: 0 on hosts that draw square
    /// corners, a fixed rounded value on hosts that round everything.
    fn fallback_radius(&self) -> f64;
}

/// Connected displays with stable identifiers and frames.
pub trait DisplayTopology {
    fn displays(&mut self) -> Vec<DisplayInfo>;
}

/// Pointer interaction transition, the only payload the cadence needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Began,
    Dragged,
    Ended,
}

/// Source of pointer-interaction transitions driving the cadence.
pub trait PointerSource {
    /// Wait up to `timeout` for the next transition; `None` on timeout.
    fn poll(&mut self, timeout: Duration) -> Option<PointerPhase>;
}

impl<T: WindowServer + ?Sized> WindowServer for &mut T {
    fn list_windows(&mut self) -> Vec<WindowDescriptor> {
        (**self).list_windows()
    }
}

impl<T: Accessibility + ?Sized> Accessibility for &mut T {
    fn is_trusted(&mut self) -> bool {
        (**self).is_trusted()
    }

    fn focused_window_frame(&mut self, pid: Option<ProcessId>) -> Option<Rect> {
        (**self).focused_window_frame(pid)
    }
}

impl<T: CornerRadii + ?Sized> CornerRadii for &mut T {
    fn corner_radius(&mut self, pid: ProcessId) -> Option<f64> {
        (**self).corner_radius(pid)
    }

    fn fallback_radius(&self) -> f64 {
        (**self).fallback_radius()
    }
}

impl<T: DisplayTopology + ?Sized> DisplayTopology for &mut T {
    fn displays(&mut self) -> Vec<DisplayInfo> {
        (**self).displays()
    }
}

impl<T: PointerSource + ?Sized> PointerSource for &mut T {
    fn poll(&mut self, timeout: Duration) -> Option<PointerPhase> {
        (**self).poll(timeout)
    }
}
