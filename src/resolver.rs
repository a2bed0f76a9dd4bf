//! Resolution of the focused window into an [`ActiveWindowSnapshot`].
//!
//! Strategies are tried in a fixed priority order: a bounded-prefix scan of
//! the window-server list, a full-list re-scan, then the Accessibility
//! fallback. Each strategy sits behind a driver seam so it can be exercised
//! with a fake host. A total miss returns `None`; the caller holds its
//! previous state rather than clearing anything.

use std::collections::BTreeSet;

use smallvec::SmallVec;

use crate::classify::ClassifierConfig;
use crate::constants::{FAST_SCAN_PREFIX, MIN_WINDOW_ALPHA, MIN_WINDOW_SIDE, NORMAL_WINDOW_LAYER};
use crate::drivers::{Accessibility, CornerRadii, WindowServer};
use crate::geometry::{owning_display, DisplayInfo, WindowId};
use crate::snapshot::{ActiveWindowSnapshot, WindowDescriptor};

pub struct SnapshotResolver<S, A, C> {
    server: S,
    accessibility: A,
    radii: C,
    classifier: ClassifierConfig,
    fast_scan_prefix: usize,
}

impl<S: WindowServer, A: Accessibility, C: CornerRadii> SnapshotResolver<S, A, C> {
    pub fn new(server: S, accessibility: A, radii: C) -> Self {
        Self {
            server,
            accessibility,
            radii,
            classifier: ClassifierConfig::default(),
            fast_scan_prefix: FAST_SCAN_PREFIX,
        }
    }

    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn classifier(&self) -> &ClassifierConfig {
        &self.classifier
    }

    /// Full resolution: window-server scan, per-process corner radius,
    /// supplementary mask discovery, Accessibility fallback.
    pub fn resolve(
        &mut self,
        displays: &[DisplayInfo],
        excluding: &BTreeSet<WindowId>,
    ) -> Option<ActiveWindowSnapshot> {
        let windows = self.server.list_windows();
        if let Some(index) = self.primary_index(&windows, excluding) {
            return self.snapshot_from_list(&windows, index, displays, excluding, None);
        }
        self.resolve_from_accessibility()
    }

    /// Window-server-only re-check for the frame-synchronized fast path.
    /// Skips the Accessibility and corner-radius queries; `cached_radius`
    /// carries the rounding from the last full resolution. A miss here
    /// defers to the next full tick instead of falling back.
    pub fn resolve_fast(
        &mut self,
        displays: &[DisplayInfo],
        excluding: &BTreeSet<WindowId>,
        cached_radius: f64,
    ) -> Option<ActiveWindowSnapshot> {
        let windows = self.server.list_windows();
        let index = self.primary_index(&windows, excluding)?;
        self.snapshot_from_list(&windows, index, displays, excluding, Some(cached_radius))
    }

    /// Scan a bounded prefix first; re-scan the remainder only when the
    /// fast path comes up empty.
    fn primary_index(
        &self,
        windows: &[WindowDescriptor],
        excluding: &BTreeSet<WindowId>,
    ) -> Option<usize> {
        let prefix = self.fast_scan_prefix.min(windows.len());
        windows[..prefix]
            .iter()
            .position(|window| Self::is_primary_candidate(window, excluding))
            .or_else(|| {
                windows[prefix..]
                    .iter()
                    .position(|window| Self::is_primary_candidate(window, excluding))
                    .map(|offset| prefix + offset)
            })
    }

    fn is_primary_candidate(window: &WindowDescriptor, excluding: &BTreeSet<WindowId>) -> bool {
        window.layer == NORMAL_WINDOW_LAYER
            && window.alpha > MIN_WINDOW_ALPHA
            && window.bounds.width >= MIN_WINDOW_SIDE
            && window.bounds.height >= MIN_WINDOW_SIDE
            && !excluding.contains(&window.id)
    }

    fn snapshot_from_list(
        &mut self,
        windows: &[WindowDescriptor],
        index: usize,
        displays: &[DisplayInfo],
        excluding: &BTreeSet<WindowId>,
        cached_radius: Option<f64>,
    ) -> Option<ActiveWindowSnapshot> {
        let primary = &windows[index];
        let display = owning_display(displays, primary.bounds)?;
        let frame = display.server_to_screen(primary.bounds);
        let radius = match cached_radius {
            Some(radius) => radius,
            None => self
                .radii
                .corner_radius(primary.owner)
                .unwrap_or_else(|| self.radii.fallback_radius()),
        };
        let supplementary = self
            .classifier
            .supplementary_masks(windows, index, displays, excluding);
        Some(ActiveWindowSnapshot::new(frame, radius, supplementary))
    }

    /// Last-resort strategy: ask the Accessibility API for the frontmost
    /// application's focused window. Returns no supplementary masks; the
    /// window list already failed to produce anything usable.
    fn resolve_from_accessibility(&mut self) -> Option<ActiveWindowSnapshot> {
        if !self.accessibility.is_trusted() {
            tracing::debug!("accessibility untrusted; resolution miss");
            return None;
        }
        let frame = self.accessibility.focused_window_frame(None)?;
        let radius = self.radii.fallback_radius();
        Some(ActiveWindowSnapshot::new(frame, radius, SmallVec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::sim::{SimDesktop, SimHandle};
    use crate::geometry::{ProcessId, Rect};

    fn resolver(handle: &SimHandle) -> SnapshotResolver<SimHandle, SimHandle, SimHandle> {
        SnapshotResolver::new(handle.clone(), handle.clone(), handle.clone())
    }

    fn displays(handle: &SimHandle) -> Vec<DisplayInfo> {
        handle.desktop().displays.clone()
    }

    #[test]
    fn picks_first_normal_layer_window_and_flips_coordinates() {
        let handle = SimHandle::new(SimDesktop::single_display());
        {
            let mut desktop = handle.desktop_mut();
            // A high-layer surface ahead of the real window.
            desktop.push_window(1, 10, Rect::new(0.0, 0.0, 1920.0, 25.0));
            desktop.windows[0].layer = 25;
            desktop.push_window(2, 42, Rect::new(100.0, 50.0, 800.0, 600.0));
            desktop.radii.insert(ProcessId(42), 12.0);
        }
        let mut resolver = resolver(&handle);
        let snap = resolver
            .resolve(&displays(&handle), &BTreeSet::new())
            .unwrap();
        // Server y=50 with height 600 on a 1080-tall display.
        assert_eq!(snap.frame, Rect::new(100.0, 430.0, 800.0, 600.0));
        assert_eq!(snap.corner_radius, 12.0);
    }

    #[test]
    fn skips_excluded_transparent_and_tiny_entries() {
        let handle = SimHandle::new(SimDesktop::single_display());
        {
            let mut desktop = handle.desktop_mut();
            desktop.push_window(1, 42, Rect::new(0.0, 0.0, 800.0, 600.0));
            desktop.push_window(2, 42, Rect::new(0.0, 0.0, 2.0, 2.0));
            desktop.push_window(3, 43, Rect::new(10.0, 10.0, 640.0, 480.0));
            desktop.windows[0].alpha = 0.01;
            desktop.push_window(4, 44, Rect::new(20.0, 20.0, 640.0, 480.0));
        }
        let mut resolver = resolver(&handle);
        let excluding: BTreeSet<WindowId> = [WindowId(3)].into();
        let snap = resolver.resolve(&displays(&handle), &excluding).unwrap();
        assert_eq!(snap.frame.x, 20.0);
    }

    #[test]
    fn rescans_past_the_fast_prefix_when_it_yields_nothing() {
        let handle = SimHandle::new(SimDesktop::single_display());
        {
            let mut desktop = handle.desktop_mut();
            for i in 0..FAST_SCAN_PREFIX as u32 {
                desktop.push_window(i, 10, Rect::new(0.0, 0.0, 100.0, 100.0));
                desktop.windows[i as usize].layer = 25;
            }
            desktop.push_window(500, 42, Rect::new(0.0, 0.0, 800.0, 600.0));
        }
        let mut resolver = resolver(&handle);
        let snap = resolver
            .resolve(&displays(&handle), &BTreeSet::new())
            .unwrap();
        assert_eq!(snap.frame.width, 800.0);
    }

    #[test]
    fn falls_back_to_accessibility_when_list_is_useless() {
        let handle = SimHandle::new(SimDesktop::single_display());
        {
            let mut desktop = handle.desktop_mut();
            desktop.frontmost = Some(ProcessId(42));
            desktop
                .ax_frames
                .insert(ProcessId(42), Rect::new(50.0, 60.0, 700.0, 500.0));
        }
        let mut resolver = resolver(&handle);
        let snap = resolver
            .resolve(&displays(&handle), &BTreeSet::new())
            .unwrap();
        assert_eq!(snap.frame, Rect::new(50.0, 60.0, 700.0, 500.0));
        assert!(snap.supplementary_masks.is_empty());
    }

    #[test]
    fn untrusted_and_empty_list_is_a_miss() {
        let handle = SimHandle::new(SimDesktop::single_display());
        {
            let mut desktop = handle.desktop_mut();
            desktop.trusted = false;
            desktop.frontmost = Some(ProcessId(42));
            desktop
                .ax_frames
                .insert(ProcessId(42), Rect::new(50.0, 60.0, 700.0, 500.0));
        }
        let mut resolver = resolver(&handle);
        assert!(resolver
            .resolve(&displays(&handle), &BTreeSet::new())
            .is_none());
    }

    #[test]
    fn fast_path_reuses_the_cached_radius_and_never_falls_back() {
        let handle = SimHandle::new(SimDesktop::single_display());
        {
            let mut desktop = handle.desktop_mut();
            desktop.frontmost = Some(ProcessId(42));
            desktop
                .ax_frames
                .insert(ProcessId(42), Rect::new(0.0, 0.0, 10.0, 10.0));
        }
        let mut resolver = resolver(&handle);
        // Empty list: the fast path defers instead of using AX.
        assert!(resolver
            .resolve_fast(&displays(&handle), &BTreeSet::new(), 9.0)
            .is_none());
        handle
            .desktop_mut()
            .push_window(1, 42, Rect::new(0.0, 0.0, 800.0, 600.0));
        let snap = resolver
            .resolve_fast(&displays(&handle), &BTreeSet::new(), 9.0)
            .unwrap();
        assert_eq!(snap.corner_radius, 9.0);
    }
}
