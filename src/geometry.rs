//! Screen-space geometry shared by the resolver, the mask model and the
//! overlay surfaces.
//!
//! Two coordinate spaces are in play. The window server reports bounds in a
//! flipped space (origin at the top-left of the display arrangement, y grows
//! downward). Overlay surfaces and displays live in screen space (origin
//! bottom-left, y grows upward). [`DisplayInfo`] carries a frame in both
//! spaces so a rectangle can be reflected through its owning display.

use serde::{Deserialize, Serialize};

/// Stable per-connection identifier for a physical display. Reassigned by
/// the OS on reconnect; used as a map key everywhere, owned by nobody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DisplayId(pub u32);

/// Window-server window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u32);

/// Owning-process identifier for a window-server entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub i32);

/// Axis-aligned rectangle. The same struct is used in both coordinate
/// spaces; which space a value lives in is a property of where it came
/// from, not of the type.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width * self.height
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Intersection with `other`; `Rect::ZERO`-like empty rect when disjoint.
    pub fn intersection(&self, other: Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        if max_x <= x || max_y <= y {
            return Rect::ZERO;
        }
        Rect::new(x, y, max_x - x, max_y - y)
    }

    pub fn intersection_area(&self, other: Rect) -> f64 {
        self.intersection(other).area()
    }

    pub fn intersects(&self, other: Rect) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Grow the rect by `margin` on every side. Negative margins shrink and
    /// collapse to an empty rect rather than inverting.
    pub fn expanded(&self, margin: f64) -> Rect {
        let width = self.width + margin * 2.0;
        let height = self.height + margin * 2.0;
        if width <= 0.0 || height <= 0.0 {
            return Rect::ZERO;
        }
        Rect::new(self.x - margin, self.y - margin, width, height)
    }

    /// Field-wise comparison with a shared absolute tolerance.
    pub fn approx_eq(&self, other: Rect, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

/// Clamp a corner radius into `[0, min(width, height) / 2]` for the rect it
/// will be applied to. NaN and negative inputs clamp to zero.
pub fn clamp_corner_radius(radius: f64, frame: Rect) -> f64 {
    let limit = (frame.width.min(frame.height) / 2.0).max(0.0);
    if radius.is_nan() {
        return 0.0;
    }
    radius.clamp(0.0, limit)
}

/// One connected display: identity, screen-space frame, the visible frame
/// with the menu-bar strip removed, the same frame in window-server space,
/// and the backing scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayInfo {
    pub id: DisplayId,
    pub frame: Rect,
    pub visible_frame: Rect,
    pub server_frame: Rect,
    pub scale: f64,
}

impl DisplayInfo {
    /// Build a display whose server-space frame is derived by reflecting the
    /// screen frame through `anchor_top`, the top edge of the arrangement in
    /// screen space (the primary display's `max_y` in the common case).
    pub fn with_anchor(
        id: DisplayId,
        frame: Rect,
        visible_frame: Rect,
        scale: f64,
        anchor_top: f64,
    ) -> Self {
        let server_frame = Rect::new(frame.x, anchor_top - frame.max_y(), frame.width, frame.height);
        Self {
            id,
            frame,
            visible_frame,
            server_frame,
            scale,
        }
    }

    /// Reflect a window-server rect into screen space through this display.
    pub fn server_to_screen(&self, bounds: Rect) -> Rect {
        let from_display_top = bounds.y - self.server_frame.y;
        let top = self.frame.max_y() - from_display_top;
        Rect::new(bounds.x, top - bounds.height, bounds.width, bounds.height)
    }

    /// The menu-bar strip: the part of the frame not covered by the visible
    /// frame, along the top edge. Empty when the display has no strip.
    pub fn menu_bar_strip(&self) -> Rect {
        let strip_height = self.frame.max_y() - self.visible_frame.max_y();
        if strip_height <= 0.0 {
            return Rect::ZERO;
        }
        Rect::new(self.frame.x, self.visible_frame.max_y(), self.frame.width, strip_height)
    }
}

/// Pick the display whose server-space frame has the largest geometric
/// intersection with `bounds`. Ties break toward the earlier entry.
pub fn owning_display(displays: &[DisplayInfo], bounds: Rect) -> Option<&DisplayInfo> {
    let mut best: Option<(&DisplayInfo, f64)> = None;
    for display in displays {
        let area = display.server_frame.intersection_area(bounds);
        if area <= 0.0 {
            continue;
        }
        match best {
            Some((_, best_area)) if best_area >= area => {}
            _ => best = Some((display, area)),
        }
    }
    best.map(|(display, _)| display)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display() -> DisplayInfo {
        DisplayInfo::with_anchor(
            DisplayId(1),
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(0.0, 0.0, 1920.0, 1055.0),
            2.0,
            1080.0,
        )
    }

    #[test]
    fn intersection_disjoint_is_empty() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(a.intersection(b).is_empty());
        assert_eq!(a.intersection_area(b), 0.0);
    }

    #[test]
    fn intersection_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let i = a.intersection(b);
        assert_eq!(i, Rect::new(5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn expanded_negative_collapses() {
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        assert!(a.expanded(-3.0).is_empty());
        assert_eq!(a.expanded(1.0), Rect::new(-1.0, -1.0, 6.0, 6.0));
    }

    #[test]
    fn corner_radius_clamps_into_half_short_side() {
        let frame = Rect::new(0.0, 0.0, 100.0, 40.0);
        assert_eq!(clamp_corner_radius(-5.0, frame), 0.0);
        assert_eq!(clamp_corner_radius(12.0, frame), 12.0);
        assert_eq!(clamp_corner_radius(500.0, frame), 20.0);
        assert_eq!(clamp_corner_radius(f64::NAN, frame), 0.0);
    }

    #[test]
    fn server_round_trips_through_screen_space() {
        let d = display();
        // Window 200pt tall whose top edge sits 100pt below the display top.
        let server = Rect::new(50.0, 100.0, 300.0, 200.0);
        let screen = d.server_to_screen(server);
        assert_eq!(screen, Rect::new(50.0, 780.0, 300.0, 200.0));
    }

    #[test]
    fn menu_bar_strip_spans_top_edge() {
        let d = display();
        let strip = d.menu_bar_strip();
        assert_eq!(strip, Rect::new(0.0, 1055.0, 1920.0, 25.0));
    }

    #[test]
    fn owning_display_prefers_largest_overlap() {
        let left = display();
        let right = DisplayInfo::with_anchor(
            DisplayId(2),
            Rect::new(1920.0, 0.0, 1280.0, 1024.0),
            Rect::new(1920.0, 0.0, 1280.0, 1024.0),
            1.0,
            1080.0,
        );
        let displays = [left, right];
        // Mostly on the right display.
        let bounds = Rect::new(1800.0, 200.0, 400.0, 300.0);
        let owner = owning_display(&displays, bounds).unwrap();
        assert_eq!(owner.id, DisplayId(2));
        // Fully off every display.
        assert!(owning_display(&displays, Rect::new(9000.0, 9000.0, 10.0, 10.0)).is_none());
    }
}
