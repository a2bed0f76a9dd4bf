//! Shared crate-wide constants.

use std::time::Duration;

/// Number of leading window-server entries scanned by the resolver's fast
/// path before falling back to a full-list scan.
///
/// The focused window is almost always near the front of the server's
/// z-ordered list; bounding the first pass keeps the common case cheap on
/// desktops with hundreds of windows. Increase for window managers that
/// push many high-layer utility surfaces ahead of application windows.
pub const FAST_SCAN_PREFIX: usize = 24;

/// Minimum alpha for a window-server entry to count as visible.
///
/// Entries at or below this are fade-out remnants or intentionally hidden
/// helpers and must never be picked as the focused window.
pub const MIN_WINDOW_ALPHA: f64 = 0.05;

/// Minimum width/height (in points) for a window-server entry to count as a
/// real window rather than a 1px event-tap or drag-tracking artifact.
pub const MIN_WINDOW_SIDE: f64 = 4.0;

/// Window-server layer occupied by ordinary application windows.
pub const NORMAL_WINDOW_LAYER: i32 = 0;

/// Corner radius applied to every window on hosts known to round all window
/// corners, used when the per-process probe has no answer.
///
/// Units: points. Older hosts fall back to 0 instead.
pub const MODERN_FALLBACK_RADIUS: f64 = 10.0;

/// Extra padding (in points) added around the focused application window
/// before it is punched out of the overlay fill.
pub const WINDOW_MASK_MARGIN: f64 = 2.0;

/// Extra padding (in points) added around application menus and popovers.
///
/// Menus carry a drop shadow the window server does not report as part of
/// the bounds; the larger margin swallows the shadow fringe so it is not
/// dimmed.
pub const APP_MENU_MASK_MARGIN: f64 = 10.0;

/// Extra padding (in points) added around system menu surfaces (menu-bar
/// dropdowns, menu extras), which cast the widest shadows.
pub const SYSTEM_MENU_MASK_MARGIN: f64 = 14.0;

/// Corner radius (in points) clamped onto classified menu-like surfaces.
pub const MENU_MASK_RADIUS: f64 = 8.0;

/// Fraction of a surface's area at which a clipped mask region is treated
/// as "no mask": the fill would be nearly invisible, so the overlay hides
/// itself instead of rasterizing a degenerate ring.
pub const FULL_COVERAGE_FRACTION: f64 = 0.98;

/// Floor for the position/size tolerance used by mask change suppression.
///
/// The effective tolerance is `max(MIN_MASK_TOLERANCE, 1 / backing_scale)`,
/// so sub-pixel jitter never forces a re-rasterization.
pub const MIN_MASK_TOLERANCE: f64 = 0.25;

/// How long a pointer press/drag keeps the cadence interaction-boosted past
/// the most recent event.
pub const DRAG_BOOST_DURATION: Duration = Duration::from_millis(1500);

/// Shorter cooldown boost applied when a pointer release completes a
/// gesture; long enough to catch the settling animation, no longer.
pub const RELEASE_BOOST_DURATION: Duration = Duration::from_millis(600);
