//! One overlay surface per connected display: a borderless, topmost,
//! input-transparent fill (blur + tint) with holes carved out for the
//! active window and its menus.
//!
//! The surface owns its mask state and re-rasterizes only when the region
//! set actually moved by more than the suppression tolerance. Regions
//! arrive already expanded and clipped to this display by the engine, in
//! screen coordinates; the surface translates them into its own pixel
//! space.

use crate::constants::FULL_COVERAGE_FRACTION;
use crate::geometry::{DisplayInfo, Rect, WindowId};
use crate::mask::{regions_equivalent, sort_geometric, suppression_tolerance, MaskRegion};
use crate::raster::MaskImage;

/// Appearance of the dimming fill. The mask stays a pure coverage buffer;
/// the compositor multiplies it by this opacity and colors it with this
/// tint (tint-only when the blur filters are disabled).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillStyle {
    pub opacity: f64,
    pub tint: [u8; 3],
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            opacity: 0.55,
            tint: [16, 16, 20],
        }
    }
}

/// What the surface currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskState {
    /// Fill visible with the given alpha mask (holes already subtracted).
    Masked(MaskImage),
    /// Fill hidden entirely: a region covered (nearly) the whole surface,
    /// so the overlay would have been invisible anyway.
    Uncovered,
}

#[derive(Debug)]
pub struct OverlaySurface {
    /// This surface's own window-server identity, excluded from resolution.
    window_id: WindowId,
    display: DisplayInfo,
    static_exclusions: Vec<Rect>,
    applied: Vec<MaskRegion>,
    has_applied: bool,
    state: MaskState,
    fill: FillStyle,
    filters_enabled: bool,
    click_through: bool,
    rasterizations: usize,
}

impl OverlaySurface {
    pub fn new(window_id: WindowId, display: DisplayInfo) -> Self {
        let mut surface = Self {
            window_id,
            display,
            static_exclusions: Vec::new(),
            applied: Vec::new(),
            has_applied: false,
            state: MaskState::Uncovered,
            fill: FillStyle::default(),
            filters_enabled: true,
            click_through: true,
            rasterizations: 0,
        };
        surface.recompute_static_exclusions();
        surface.state = MaskState::Masked(surface.rasterize(&[]));
        surface
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    pub fn display_id(&self) -> crate::geometry::DisplayId {
        self.display.id
    }

    pub fn display(&self) -> &DisplayInfo {
        &self.display
    }

    pub fn state(&self) -> &MaskState {
        &self.state
    }

    pub fn applied_regions(&self) -> &[MaskRegion] {
        &self.applied
    }

    /// Number of times the mask has been rasterized since creation. Change
    /// suppression is observable through this staying put.
    pub fn rasterization_count(&self) -> usize {
        self.rasterizations
    }

    pub fn set_fill(&mut self, fill: FillStyle) {
        self.fill = fill;
    }

    pub fn fill(&self) -> FillStyle {
        self.fill
    }

    pub fn set_filters_enabled(&mut self, enabled: bool) {
        if self.filters_enabled != enabled {
            tracing::debug!(display = ?self.display.id, enabled, "blur filters toggled");
        }
        self.filters_enabled = enabled;
    }

    pub fn filters_enabled(&self) -> bool {
        self.filters_enabled
    }

    pub fn set_click_through(&mut self, enabled: bool) {
        self.click_through = enabled;
    }

    pub fn click_through(&self) -> bool {
        self.click_through
    }

    /// React to the assigned display's frame changing (resolution switch,
    /// arrangement change): static exclusions are recomputed and the mask
    /// re-rasterized at the new size.
    pub fn update_to_display_frame(&mut self, display: DisplayInfo) {
        if self.display == display {
            return;
        }
        let display_id = display.id;
        let frame = display.frame;
        tracing::debug!(display = ?display_id, ?frame, "surface frame updated");
        self.display = display;
        self.recompute_static_exclusions();
        let regions = self.applied.clone();
        self.apply_now(&regions);
    }

    /// Apply a new set of mask regions (screen coordinates, already clipped
    /// to this display). Equivalent sets, in any order, within tolerance,
    /// are suppressed without rasterizing.
    pub fn apply_mask(&mut self, regions: &[MaskRegion]) {
        let tolerance = suppression_tolerance(self.display.scale);
        if self.has_applied && regions_equivalent(&self.applied, regions, tolerance) {
            tracing::trace!(display = ?self.display.id, "mask unchanged; skipping rasterization");
            return;
        }
        self.apply_now(regions);
    }

    /// Drop all mask state. Used on engine stop; the surrounding app hides
    /// the overlay window at the same time.
    pub fn reset(&mut self) {
        self.applied.clear();
        self.has_applied = false;
        self.state = MaskState::Uncovered;
    }

    fn apply_now(&mut self, regions: &[MaskRegion]) {
        let mut sorted = regions.to_vec();
        sort_geometric(&mut sorted);
        self.applied = sorted;
        self.has_applied = true;

        let surface_area = self.display.frame.area();
        let degenerate = self.applied.iter().any(|region| {
            surface_area > 0.0
                && region.frame.intersection_area(self.display.frame)
                    >= surface_area * FULL_COVERAGE_FRACTION
        });
        if degenerate {
            tracing::debug!(display = ?self.display.id, "region covers surface; hiding fill");
            self.state = MaskState::Uncovered;
            return;
        }
        let mask = self.rasterize(&self.applied.clone());
        self.state = MaskState::Masked(mask);
    }

    fn recompute_static_exclusions(&mut self) {
        self.static_exclusions.clear();
        let strip = self.display.menu_bar_strip();
        if !strip.is_empty() {
            self.static_exclusions.push(strip);
        }
    }

    fn rasterize(&mut self, regions: &[MaskRegion]) -> MaskImage {
        self.rasterizations += 1;
        let scale = self.display.scale;
        let width = (self.display.frame.width * scale).round() as u32;
        let height = (self.display.frame.height * scale).round() as u32;
        let mut mask = MaskImage::opaque(width, height);
        for exclusion in &self.static_exclusions {
            mask.subtract_rect(self.to_pixel(*exclusion));
        }
        for region in regions {
            mask.subtract_rounded_rect(self.to_pixel(region.frame), region.corner_radius * scale);
        }
        tracing::trace!(
            display = ?self.display.id,
            regions = regions.len(),
            "rasterized overlay mask"
        );
        mask
    }

    fn to_pixel(&self, rect: Rect) -> Rect {
        let scale = self.display.scale;
        Rect::new(
            (rect.x - self.display.frame.x) * scale,
            (rect.y - self.display.frame.y) * scale,
            rect.width * scale,
            rect.height * scale,
        )
    }
}
