//! Heuristic classification of transient menu-like surfaces that should
//! stay clear alongside the focused window.
//!
//! The thresholds here were tuned empirically against one window-server
//! generation and do not obviously generalize, so they are configuration
//! rather than truths; `ClassifierConfig::default()` carries the tuned
//! values.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{MENU_MASK_RADIUS, MIN_WINDOW_ALPHA, MIN_WINDOW_SIDE, NORMAL_WINDOW_LAYER};
use crate::geometry::{owning_display, DisplayInfo, WindowId};
use crate::mask::{sort_by_purpose, MaskPurpose, MaskRegion};
use crate::snapshot::WindowDescriptor;

fn def_popup_layer() -> i32 {
    101
}

fn def_compact_max_height() -> f64 {
    620.0
}

fn def_compact_max_area() -> f64 {
    520_000.0
}

fn def_menu_needles() -> Vec<String> {
    vec!["menu".into(), "popover".into(), "context".into()]
}

fn def_system_ui_owners() -> Vec<String> {
    vec!["SystemUIServer".into(), "Window Server".into()]
}

fn def_menu_radius() -> f64 {
    MENU_MASK_RADIUS
}

/// Tunable thresholds for the menu/popover heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Window-server layer at or above which a surface is popup-like.
    #[serde(default = "def_popup_layer")]
    pub popup_layer: i32,

    /// Maximum height (points) for the compact-geometry rule.
    #[serde(default = "def_compact_max_height")]
    pub compact_max_height: f64,

    /// Maximum area (square points) for the compact-geometry rule.
    #[serde(default = "def_compact_max_area")]
    pub compact_max_area: f64,

    /// Case-insensitive substrings of window names that mark a menu.
    #[serde(default = "def_menu_needles")]
    pub menu_name_needles: Vec<String>,

    /// Owner-name values treated as the system menu-bar process.
    #[serde(default = "def_system_ui_owners")]
    pub system_ui_owners: Vec<String>,

    /// Corner radius clamped onto classified surfaces.
    #[serde(default = "def_menu_radius")]
    pub menu_radius: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            popup_layer: def_popup_layer(),
            compact_max_height: def_compact_max_height(),
            compact_max_area: def_compact_max_area(),
            menu_name_needles: def_menu_needles(),
            system_ui_owners: def_system_ui_owners(),
            menu_radius: def_menu_radius(),
        }
    }
}

impl ClassifierConfig {
    fn is_system_ui(&self, window: &WindowDescriptor) -> bool {
        window
            .owner_name
            .as_deref()
            .is_some_and(|owner| self.system_ui_owners.iter().any(|known| known == owner))
    }

    fn name_matches_menu(&self, window: &WindowDescriptor) -> bool {
        window.name.as_deref().is_some_and(|name| {
            let name = name.to_lowercase();
            self.menu_name_needles
                .iter()
                .any(|needle| name.contains(needle.as_str()))
        })
    }

    fn is_compact(&self, window: &WindowDescriptor) -> bool {
        window.bounds.height <= self.compact_max_height
            && window.bounds.area() <= self.compact_max_area
    }

    /// Classify a single non-primary entry. Priority order matters: the
    /// first rule that fires decides the purpose.
    pub fn classify(
        &self,
        window: &WindowDescriptor,
        primary: &WindowDescriptor,
    ) -> Option<MaskPurpose> {
        if window.owner == primary.owner {
            return Some(MaskPurpose::ApplicationMenu);
        }
        if self.is_system_ui(window) {
            return Some(MaskPurpose::SystemMenu);
        }
        if window.layer >= self.popup_layer {
            return Some(MaskPurpose::SystemMenu);
        }
        if self.name_matches_menu(window) {
            return Some(MaskPurpose::SystemMenu);
        }
        if window.layer > NORMAL_WINDOW_LAYER && self.is_compact(window) {
            return Some(MaskPurpose::SystemMenu);
        }
        None
    }

    /// Scan the window list for surfaces that should stay clear alongside
    /// the primary match at `primary_index`.
    ///
    /// Only entries stacked above the primary are considered: menus and
    /// popovers always render in front of the window they belong to, and
    /// looking below would sweep in the owner's background windows.
    /// Matches are deduplicated by window id, converted to screen space
    /// through their owning display, and sorted for deterministic diffing.
    pub fn supplementary_masks(
        &self,
        windows: &[WindowDescriptor],
        primary_index: usize,
        displays: &[DisplayInfo],
        excluding: &BTreeSet<WindowId>,
    ) -> SmallVec<[MaskRegion; 4]> {
        let Some(primary) = windows.get(primary_index) else {
            return SmallVec::new();
        };
        let mut seen: BTreeSet<WindowId> = BTreeSet::new();
        let mut regions: Vec<MaskRegion> = Vec::new();
        for window in &windows[..primary_index] {
            if window.id == primary.id || excluding.contains(&window.id) || !seen.insert(window.id)
            {
                continue;
            }
            if window.alpha <= MIN_WINDOW_ALPHA
                || window.bounds.width < MIN_WINDOW_SIDE
                || window.bounds.height < MIN_WINDOW_SIDE
            {
                continue;
            }
            let Some(purpose) = self.classify(window, primary) else {
                continue;
            };
            let Some(display) = owning_display(displays, window.bounds) else {
                continue;
            };
            let frame = display.server_to_screen(window.bounds);
            regions.push(MaskRegion::new(frame, self.menu_radius, purpose));
        }
        sort_by_purpose(&mut regions);
        regions.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{DisplayId, ProcessId, Rect};

    fn window(id: u32, owner: i32, layer: i32, bounds: Rect) -> WindowDescriptor {
        WindowDescriptor {
            id: WindowId(id),
            owner: ProcessId(owner),
            layer,
            alpha: 1.0,
            bounds,
            name: None,
            owner_name: None,
        }
    }

    fn displays() -> Vec<DisplayInfo> {
        vec![DisplayInfo::with_anchor(
            DisplayId(1),
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(0.0, 0.0, 1920.0, 1055.0),
            2.0,
            1080.0,
        )]
    }

    #[test]
    fn same_owner_wins_over_every_other_rule() {
        let config = ClassifierConfig::default();
        let primary = window(1, 42, 0, Rect::new(0.0, 100.0, 800.0, 600.0));
        let mut candidate = window(2, 42, 200, Rect::new(50.0, 120.0, 200.0, 300.0));
        candidate.owner_name = Some("SystemUIServer".into());
        assert_eq!(
            config.classify(&candidate, &primary),
            Some(MaskPurpose::ApplicationMenu)
        );
    }

    #[test]
    fn system_ui_owner_is_a_system_menu() {
        let config = ClassifierConfig::default();
        let primary = window(1, 42, 0, Rect::new(0.0, 100.0, 800.0, 600.0));
        let mut candidate = window(2, 99, 0, Rect::new(50.0, 0.0, 300.0, 400.0));
        candidate.owner_name = Some("SystemUIServer".into());
        assert_eq!(
            config.classify(&candidate, &primary),
            Some(MaskPurpose::SystemMenu)
        );
    }

    #[test]
    fn popup_layer_and_name_rules() {
        let config = ClassifierConfig::default();
        let primary = window(1, 42, 0, Rect::new(0.0, 100.0, 800.0, 600.0));
        let elevated = window(2, 99, 101, Rect::new(0.0, 0.0, 5000.0, 5000.0));
        assert_eq!(
            config.classify(&elevated, &primary),
            Some(MaskPurpose::SystemMenu)
        );
        let mut named = window(3, 99, 0, Rect::new(0.0, 0.0, 300.0, 400.0));
        named.name = Some("Context Menu".into());
        assert_eq!(
            config.classify(&named, &primary),
            Some(MaskPurpose::SystemMenu)
        );
    }

    #[test]
    fn compact_geometry_requires_an_elevated_layer() {
        let config = ClassifierConfig::default();
        let primary = window(1, 42, 0, Rect::new(0.0, 100.0, 800.0, 600.0));
        let compact_normal = window(2, 99, 0, Rect::new(0.0, 0.0, 300.0, 400.0));
        assert_eq!(config.classify(&compact_normal, &primary), None);
        let compact_elevated = window(3, 99, 8, Rect::new(0.0, 0.0, 300.0, 400.0));
        assert_eq!(
            config.classify(&compact_elevated, &primary),
            Some(MaskPurpose::SystemMenu)
        );
        // Too tall for the compact rule.
        let tall_elevated = window(4, 99, 8, Rect::new(0.0, 0.0, 300.0, 700.0));
        assert_eq!(config.classify(&tall_elevated, &primary), None);
    }

    #[test]
    fn scan_only_considers_surfaces_above_the_primary() {
        let config = ClassifierConfig::default();
        let menu = window(2, 42, 8, Rect::new(100.0, 120.0, 200.0, 300.0));
        let primary = window(1, 42, 0, Rect::new(0.0, 100.0, 800.0, 600.0));
        let background = window(3, 42, 0, Rect::new(900.0, 100.0, 640.0, 480.0));
        let windows = vec![menu, primary, background];
        let masks = config.supplementary_masks(&windows, 1, &displays(), &BTreeSet::new());
        assert_eq!(masks.len(), 1);
        assert_eq!(masks[0].purpose, MaskPurpose::ApplicationMenu);
        assert_eq!(masks[0].corner_radius, MENU_MASK_RADIUS);
    }

    #[test]
    fn matches_are_deduplicated_and_sorted() {
        let config = ClassifierConfig::default();
        let mut ext_a = window(5, 99, 200, Rect::new(700.0, 0.0, 60.0, 24.0));
        ext_a.owner_name = Some("SystemUIServer".into());
        let mut ext_b = window(6, 99, 200, Rect::new(300.0, 0.0, 60.0, 24.0));
        ext_b.owner_name = Some("SystemUIServer".into());
        let dup = ext_a.clone();
        let app_menu = window(7, 42, 8, Rect::new(10.0, 50.0, 180.0, 240.0));
        let primary = window(1, 42, 0, Rect::new(0.0, 100.0, 800.0, 600.0));
        let windows = vec![ext_a, ext_b, dup, app_menu, primary];
        let masks = config.supplementary_masks(&windows, 4, &displays(), &BTreeSet::new());
        assert_eq!(masks.len(), 3);
        // Application menus sort before system menus; system menus sort
        // left-to-right at the same height.
        assert_eq!(masks[0].purpose, MaskPurpose::ApplicationMenu);
        assert_eq!(masks[1].purpose, MaskPurpose::SystemMenu);
        assert!(masks[1].frame.x < masks[2].frame.x);
    }
}
