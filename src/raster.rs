//! Rasterization of the combined overlay alpha mask.
//!
//! One mask image per surface, sized to the surface's pixel bounds, starts
//! fully opaque (fill visible everywhere) and has exclusions subtracted as
//! rounded-rectangle holes. Composing every hole into a single buffer
//! bounds the per-frame cost regardless of region count. Coverage is
//! binary per pixel center, which keeps equal inputs byte-identical.

use crate::geometry::Rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl MaskImage {
    /// Fully opaque mask: the translucent fill shows everywhere.
    pub fn opaque(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![u8::MAX; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Fraction of pixels still covered by the fill.
    pub fn opaque_fraction(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let opaque = self.data.iter().filter(|&&alpha| alpha == u8::MAX).count();
        opaque as f64 / self.data.len() as f64
    }

    /// Punch a rounded-rectangle hole. `rect` and `radius` are in pixel
    /// space with the image's origin; the radius is clamped to half the
    /// shorter side.
    pub fn subtract_rounded_rect(&mut self, rect: Rect, radius: f64) {
        if rect.is_empty() {
            return;
        }
        let radius = radius.clamp(0.0, rect.width.min(rect.height) / 2.0);
        let x0 = rect.x.floor().max(0.0) as u32;
        let y0 = rect.y.floor().max(0.0) as u32;
        let x1 = (rect.max_x().ceil().max(0.0) as u32).min(self.width);
        let y1 = (rect.max_y().ceil().max(0.0) as u32).min(self.height);
        for py in y0..y1 {
            let cy = py as f64 + 0.5;
            let row = py as usize * self.width as usize;
            for px in x0..x1 {
                let cx = px as f64 + 0.5;
                if rounded_rect_contains(rect, radius, cx, cy) {
                    self.data[row + px as usize] = 0;
                }
            }
        }
    }

    /// Punch a square-cornered hole (static exclusions).
    pub fn subtract_rect(&mut self, rect: Rect) {
        self.subtract_rounded_rect(rect, 0.0);
    }
}

/// Point-in-rounded-rect test on pixel centers.
fn rounded_rect_contains(rect: Rect, radius: f64, x: f64, y: f64) -> bool {
    if x < rect.x || x >= rect.max_x() || y < rect.y || y >= rect.max_y() {
        return false;
    }
    if radius <= 0.0 {
        return true;
    }
    let left = rect.x + radius;
    let right = rect.max_x() - radius;
    let bottom = rect.y + radius;
    let top = rect.max_y() - radius;
    // Inside the cross formed by the two inner slabs.
    if (x >= left && x < right) || (y >= bottom && y < top) {
        return true;
    }
    let corner_x = if x < left { left } else { right };
    let corner_y = if y < bottom { bottom } else { top };
    let dx = x - corner_x;
    let dy = y - corner_y;
    dx * dx + dy * dy <= radius * radius
}
