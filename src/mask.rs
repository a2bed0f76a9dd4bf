//! Mask regions: the rounded-rectangle holes carved out of the overlay fill.

use crate::constants::{
    APP_MENU_MASK_MARGIN, MIN_MASK_TOLERANCE, SYSTEM_MENU_MASK_MARGIN, WINDOW_MASK_MARGIN,
};
use crate::geometry::{clamp_corner_radius, Rect};
use strum::EnumIter;

/// What a mask region represents. The purpose drives the padding applied
/// before clipping (menus include shadows the server does not report) and
/// the sort priority used when multiple regions are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumIter)]
pub enum MaskPurpose {
    ApplicationWindow,
    ApplicationMenu,
    SystemMenu,
}

/// Per-purpose rendering policy, kept in one table so classification and
/// margin logic stay independently testable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PurposeProfile {
    /// Extra points added on every side before clipping to a display.
    pub margin: f64,
    /// Lower sorts earlier when regions are combined deterministically.
    pub priority: u8,
}

impl MaskPurpose {
    pub fn profile(self) -> PurposeProfile {
        match self {
            MaskPurpose::ApplicationWindow => PurposeProfile {
                margin: WINDOW_MASK_MARGIN,
                priority: 0,
            },
            MaskPurpose::ApplicationMenu => PurposeProfile {
                margin: APP_MENU_MASK_MARGIN,
                priority: 1,
            },
            MaskPurpose::SystemMenu => PurposeProfile {
                margin: SYSTEM_MENU_MASK_MARGIN,
                priority: 2,
            },
        }
    }
}

/// A rectangle-plus-corner-radius area excluded from the overlay fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskRegion {
    pub frame: Rect,
    pub corner_radius: f64,
    pub purpose: MaskPurpose,
}

impl MaskRegion {
    /// Construct with the radius clamped into `[0, min(w, h) / 2]`.
    pub fn new(frame: Rect, corner_radius: f64, purpose: MaskPurpose) -> Self {
        Self {
            frame,
            corner_radius: clamp_corner_radius(corner_radius, frame),
            purpose,
        }
    }

    /// Expand by the purpose margin, then clip to `bounds`. Returns `None`
    /// when nothing of the region lands inside the bounds.
    pub fn expanded_and_clipped(&self, bounds: Rect) -> Option<MaskRegion> {
        let expanded = self.frame.expanded(self.purpose.profile().margin);
        let clipped = expanded.intersection(bounds);
        if clipped.is_empty() {
            return None;
        }
        Some(MaskRegion::new(clipped, self.corner_radius, self.purpose))
    }

    pub fn approx_eq(&self, other: &MaskRegion, tolerance: f64) -> bool {
        self.purpose == other.purpose
            && (self.corner_radius - other.corner_radius).abs() <= tolerance
            && self.frame.approx_eq(other.frame, tolerance)
    }
}

/// Sort by purpose priority, then top-to-bottom, left-to-right, then size.
/// Used by the classifier so supplementary regions diff deterministically.
pub fn sort_by_purpose(regions: &mut [MaskRegion]) {
    regions.sort_by(|a, b| {
        a.purpose
            .profile()
            .priority
            .cmp(&b.purpose.profile().priority)
            .then(b.frame.max_y().total_cmp(&a.frame.max_y()))
            .then(a.frame.x.total_cmp(&b.frame.x))
            .then(a.frame.area().total_cmp(&b.frame.area()))
    });
}

/// Canonical geometric order (y, then x, then width, then height) used by
/// the surfaces, so equivalent sets in different orders compare equal.
pub fn sort_geometric(regions: &mut [MaskRegion]) {
    regions.sort_by(|a, b| {
        a.frame
            .y
            .total_cmp(&b.frame.y)
            .then(a.frame.x.total_cmp(&b.frame.x))
            .then(a.frame.width.total_cmp(&b.frame.width))
            .then(a.frame.height.total_cmp(&b.frame.height))
    });
}

/// Position/size tolerance for change suppression on a surface with the
/// given backing scale: one device pixel, floored at a quarter point.
pub fn suppression_tolerance(scale: f64) -> f64 {
    if scale > 0.0 {
        MIN_MASK_TOLERANCE.max(1.0 / scale)
    } else {
        MIN_MASK_TOLERANCE
    }
}

/// Order-independent set equivalence under a tolerance. Both sides are
/// sorted into the canonical geometric order before pairwise comparison.
pub fn regions_equivalent(a: &[MaskRegion], b: &[MaskRegion], tolerance: f64) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut left = a.to_vec();
    let mut right = b.to_vec();
    sort_geometric(&mut left);
    sort_geometric(&mut right);
    left.iter()
        .zip(right.iter())
        .all(|(l, r)| l.approx_eq(r, tolerance))
}
