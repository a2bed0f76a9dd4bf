//! Immutable snapshots of the focused window and its supplementary
//! surfaces, produced once per resolution and superseded by the next.

use crate::geometry::{clamp_corner_radius, ProcessId, Rect, WindowId};
use crate::mask::MaskRegion;
use smallvec::SmallVec;

/// One row from the window-server's on-screen window list, in server
/// coordinates (top-left origin).
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDescriptor {
    pub id: WindowId,
    pub owner: ProcessId,
    pub layer: i32,
    pub alpha: f64,
    pub bounds: Rect,
    pub name: Option<String>,
    pub owner_name: Option<String>,
}

/// The resolved focus state for one tick: the focused window's screen-space
/// frame, its corner rounding, and any menu-like surfaces that should stay
/// clear alongside it. Values are never mutated; the next resolution
/// replaces the whole snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveWindowSnapshot {
    pub frame: Rect,
    pub corner_radius: f64,
    pub supplementary_masks: SmallVec<[MaskRegion; 4]>,
}

impl ActiveWindowSnapshot {
    pub fn new(
        frame: Rect,
        corner_radius: f64,
        supplementary_masks: SmallVec<[MaskRegion; 4]>,
    ) -> Self {
        Self {
            frame,
            corner_radius: clamp_corner_radius(corner_radius, frame),
            supplementary_masks,
        }
    }

    /// The primary frame plus supplementary masks as one region list, in
    /// the order they should be combined.
    pub fn regions(&self) -> Vec<MaskRegion> {
        let mut regions = Vec::with_capacity(1 + self.supplementary_masks.len());
        regions.push(MaskRegion::new(
            self.frame,
            self.corner_radius,
            crate::mask::MaskPurpose::ApplicationWindow,
        ));
        regions.extend(self.supplementary_masks.iter().copied());
        regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn snapshot_clamps_radius_on_construction() {
        let snap = ActiveWindowSnapshot::new(Rect::new(0.0, 0.0, 30.0, 10.0), 80.0, smallvec![]);
        assert_eq!(snap.corner_radius, 5.0);
    }

    #[test]
    fn regions_lead_with_the_primary_window() {
        let snap = ActiveWindowSnapshot::new(Rect::new(0.0, 0.0, 800.0, 600.0), 12.0, smallvec![]);
        let regions = snap.regions();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].frame, Rect::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(regions[0].corner_radius, 12.0);
    }
}
