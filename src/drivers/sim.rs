//! A scripted in-memory desktop. Implements every driver seam through a
//! shared handle so the demo binary and the integration tests can mutate
//! the "host" between ticks while the engine holds the seams.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::constants::MODERN_FALLBACK_RADIUS;
use crate::drivers::{Accessibility, CornerRadii, DisplayTopology, PointerPhase, PointerSource, WindowServer};
use crate::geometry::{DisplayId, DisplayInfo, ProcessId, Rect, WindowId};
use crate::snapshot::WindowDescriptor;

/// Mutable state of the simulated host.
#[derive(Debug, Default)]
pub struct SimDesktop {
    /// Server-ordered on-screen window list (front of the vec = front of
    /// the z-order), in server coordinates.
    pub windows: Vec<WindowDescriptor>,
    pub displays: Vec<DisplayInfo>,
    /// Whether the Accessibility grant is currently in place.
    pub trusted: bool,
    /// Focused-window frames (screen space) the Accessibility API would
    /// report per process.
    pub ax_frames: BTreeMap<ProcessId, Rect>,
    /// The frontmost application, used when no pid is given.
    pub frontmost: Option<ProcessId>,
    /// Per-process corner radii the probe can answer with.
    pub radii: BTreeMap<ProcessId, f64>,
    /// Whether the simulated host rounds all window corners.
    pub modern_host: bool,
    /// Scripted pointer transitions, drained one per poll.
    pub pointer_script: VecDeque<PointerPhase>,
}

impl SimDesktop {
    /// A trusted single-display host (1920×1080, 25pt menu bar, 2x scale).
    pub fn single_display() -> Self {
        let frame = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        let visible = Rect::new(0.0, 0.0, 1920.0, 1055.0);
        Self {
            displays: vec![DisplayInfo::with_anchor(
                DisplayId(1),
                frame,
                visible,
                2.0,
                frame.max_y(),
            )],
            trusted: true,
            modern_host: true,
            ..Self::default()
        }
    }

    /// Append a plain normal-layer window to the back of the z-order.
    pub fn push_window(&mut self, id: u32, owner: i32, bounds: Rect) {
        self.windows.push(WindowDescriptor {
            id: WindowId(id),
            owner: ProcessId(owner),
            layer: crate::constants::NORMAL_WINDOW_LAYER,
            alpha: 1.0,
            bounds,
            name: None,
            owner_name: None,
        });
    }

    pub fn script_pointer(&mut self, phases: impl IntoIterator<Item = PointerPhase>) {
        self.pointer_script.extend(phases);
    }
}

/// Cloneable handle onto a [`SimDesktop`]; every driver seam is implemented
/// on the handle so one desktop can sit behind all of them at once.
#[derive(Debug, Clone, Default)]
pub struct SimHandle {
    inner: Rc<RefCell<SimDesktop>>,
}

impl SimHandle {
    pub fn new(desktop: SimDesktop) -> Self {
        Self {
            inner: Rc::new(RefCell::new(desktop)),
        }
    }

    pub fn desktop(&self) -> Ref<'_, SimDesktop> {
        self.inner.borrow()
    }

    pub fn desktop_mut(&self) -> RefMut<'_, SimDesktop> {
        self.inner.borrow_mut()
    }
}

impl WindowServer for SimHandle {
    fn list_windows(&mut self) -> Vec<WindowDescriptor> {
        self.inner.borrow().windows.clone()
    }
}

impl Accessibility for SimHandle {
    fn is_trusted(&mut self) -> bool {
        self.inner.borrow().trusted
    }

    fn focused_window_frame(&mut self, pid: Option<ProcessId>) -> Option<Rect> {
        let desktop = self.inner.borrow();
        if !desktop.trusted {
            return None;
        }
        let pid = pid.or(desktop.frontmost)?;
        desktop.ax_frames.get(&pid).copied()
    }
}

impl CornerRadii for SimHandle {
    fn corner_radius(&mut self, pid: ProcessId) -> Option<f64> {
        self.inner.borrow().radii.get(&pid).copied()
    }

    fn fallback_radius(&self) -> f64 {
        if self.inner.borrow().modern_host {
            MODERN_FALLBACK_RADIUS
        } else {
            0.0
        }
    }
}

impl DisplayTopology for SimHandle {
    fn displays(&mut self) -> Vec<DisplayInfo> {
        self.inner.borrow().displays.clone()
    }
}

impl PointerSource for SimHandle {
    fn poll(&mut self, timeout: Duration) -> Option<PointerPhase> {
        if let Some(phase) = self.inner.borrow_mut().pointer_script.pop_front() {
            return Some(phase);
        }
        // An empty script behaves like a quiet pointer: the wait is the
        // caller's only sleep, so it must be honored.
        std::thread::sleep(timeout);
        None
    }
}
