//! The overlay engine: owns the cadence, the resolver and one surface per
//! connected display; turns resolved snapshots into per-display masks.
//!
//! Everything here runs in a single cooperative scheduling domain. A tick
//! resolves at most one snapshot and applies the resulting masks to every
//! surface before returning, so no display ever shows a mix of stale and
//! fresh regions from different resolution cycles.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use crate::cadence::{Cadence, CadencePhase, TrackingProfile};
use crate::drivers::{Accessibility, CornerRadii, DisplayTopology, PointerPhase, WindowServer};
use crate::geometry::{DisplayId, DisplayInfo, WindowId};
use crate::resolver::SnapshotResolver;
use crate::snapshot::ActiveWindowSnapshot;
use crate::state::EngineState;
use crate::surface::{FillStyle, OverlaySurface};

/// Window-server ids handed to overlay surfaces start here, far above
/// anything the simulated or real hosts allocate for ordinary windows.
const OVERLAY_WINDOW_ID_BASE: u32 = 0xF000_0000;

pub struct OverlayEngine<S, A, C, D> {
    resolver: SnapshotResolver<S, A, C>,
    topology: D,
    cadence: Cadence,
    surfaces: BTreeMap<DisplayId, OverlaySurface>,
    cached: Option<ActiveWindowSnapshot>,
    state: EngineState,
    fill: FillStyle,
    last_displays: Vec<DisplayInfo>,
    next_overlay_window: u32,
}

impl<S, A, C, D> OverlayEngine<S, A, C, D>
where
    S: WindowServer,
    A: Accessibility,
    C: CornerRadii,
    D: DisplayTopology,
{
    pub fn new(resolver: SnapshotResolver<S, A, C>, topology: D, profile: TrackingProfile) -> Self {
        Self {
            resolver,
            topology,
            cadence: Cadence::new(profile),
            surfaces: BTreeMap::new(),
            cached: None,
            state: EngineState::new(),
            fill: FillStyle::default(),
            last_displays: Vec::new(),
            next_overlay_window: OVERLAY_WINDOW_ID_BASE,
        }
    }

    /// Override the cadence boost durations, usually from config.
    pub fn with_boost_durations(mut self, drag: Duration, release: Duration) -> Self {
        self.cadence =
            Cadence::new(self.cadence.profile().clone()).with_boost_durations(drag, release);
        self
    }

    pub fn running(&self) -> bool {
        self.state.running()
    }

    pub fn cached_snapshot(&self) -> Option<&ActiveWindowSnapshot> {
        self.cached.as_ref()
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &OverlaySurface> {
        self.surfaces.values()
    }

    pub fn surface(&self, display: DisplayId) -> Option<&OverlaySurface> {
        self.surfaces.get(&display)
    }

    /// Begin tracking: reconcile surfaces against the current topology and
    /// resolve an initial snapshot right away.
    pub fn start(&mut self, now: Instant) {
        if self.state.running() {
            return;
        }
        tracing::info!(profile = %self.cadence.profile().name, "overlay engine started");
        self.state.set_running(true);
        self.tick(now);
    }

    /// End tracking: the cadence stops and every surface's mask state is
    /// cleared, synchronously. There is nothing asynchronous to await.
    pub fn stop(&mut self) {
        if !self.state.running() {
            return;
        }
        tracing::info!("overlay engine stopped");
        self.state.set_running(false);
        self.cadence.reset();
        self.cached = None;
        for surface in self.surfaces.values_mut() {
            surface.reset();
        }
    }

    /// Seed mask state immediately, before the surrounding application
    /// un-hides the overlay windows, so no unmasked frame is ever shown.
    /// With no snapshot supplied, one is resolved on the spot.
    pub fn prime_mask(&mut self, snapshot: Option<ActiveWindowSnapshot>) {
        self.reconcile_displays();
        let snapshot = snapshot.or_else(|| {
            let excluding = self.excluded_window_ids();
            self.resolver.resolve(&self.last_displays, &excluding)
        });
        if let Some(snapshot) = snapshot {
            self.apply_snapshot(&snapshot);
            self.cached = Some(snapshot);
        }
    }

    pub fn set_click_through(&mut self, enabled: bool) {
        self.state.set_click_through(enabled);
        self.flush_surface_settings();
    }

    pub fn set_filters_enabled(&mut self, enabled: bool) {
        self.state.set_filters_enabled(enabled);
        self.flush_surface_settings();
    }

    /// Set the dimming fill appearance on every surface, current and future.
    pub fn set_fill_style(&mut self, fill: FillStyle) {
        self.fill = fill;
        for surface in self.surfaces.values_mut() {
            surface.set_fill(fill);
        }
    }

    /// Switch the polling tiers at runtime; takes effect on the next
    /// scheduled tick without restarting the engine.
    pub fn update_tracking_profile(&mut self, profile: TrackingProfile) {
        self.cadence.set_profile(profile);
    }

    pub fn profile(&self) -> &TrackingProfile {
        self.cadence.profile()
    }

    /// Feed a pointer transition into the cadence.
    pub fn note_pointer(&mut self, phase: PointerPhase, now: Instant) {
        self.cadence.note_pointer(phase, now);
    }

    /// The interval the next tick should be scheduled with.
    pub fn tick_interval(&self, now: Instant) -> Duration {
        self.cadence.tick_interval(now)
    }

    pub fn cadence_phase(&self, now: Instant) -> CadencePhase {
        self.cadence.phase(now)
    }

    pub fn frame_sync_active(&self, now: Instant) -> bool {
        self.cadence.frame_sync_active(now)
    }

    /// Reconcile overlay surfaces against the connected display set:
    /// create for new displays, destroy for removed ones, resize for
    /// changed frames. Keeps the invariant of exactly one live surface per
    /// connected display.
    pub fn refresh_overlay_windows(&mut self) {
        self.reconcile_displays();
    }

    /// One full tracking tick: reconcile, resolve excluding our own
    /// surfaces, diff against the cache, push masks. A resolution miss
    /// with a cached snapshot leaves every mask untouched.
    pub fn tick(&mut self, now: Instant) {
        if !self.state.running() {
            return;
        }
        self.cadence.expire(now);
        self.reconcile_displays();
        self.flush_surface_settings();
        let excluding = self.excluded_window_ids();
        match self.resolver.resolve(&self.last_displays, &excluding) {
            Some(snapshot) => {
                if self.cached.as_ref() == Some(&snapshot) {
                    return;
                }
                if self.cached.is_some() && self.cadence.phase(now) == CadencePhase::Idle {
                    self.cadence.note_snapshot_changed(now);
                }
                self.apply_snapshot(&snapshot);
                self.cached = Some(snapshot);
            }
            None => {
                // Hold the previous mask; transient misses (Space switches,
                // permission races) must not flash the screen fully dimmed.
                tracing::debug!("resolution miss; holding previous mask");
            }
        }
    }

    /// The frame-synchronized fast path: window-server-only re-check with
    /// the cached corner radius. Returns true when it applied an update; a
    /// miss defers to the next full tick.
    pub fn frame_tick(&mut self, now: Instant) -> bool {
        if !self.state.running() || !self.cadence.frame_sync_active(now) {
            return false;
        }
        let cached_radius = self
            .cached
            .as_ref()
            .map(|snapshot| snapshot.corner_radius)
            .unwrap_or(0.0);
        let excluding = self.excluded_window_ids();
        let Some(snapshot) =
            self.resolver
                .resolve_fast(&self.last_displays, &excluding, cached_radius)
        else {
            return false;
        };
        if self.cached.as_ref() == Some(&snapshot) {
            return false;
        }
        self.apply_snapshot(&snapshot);
        self.cached = Some(snapshot);
        true
    }

    fn excluded_window_ids(&self) -> BTreeSet<WindowId> {
        self.surfaces
            .values()
            .map(|surface| surface.window_id())
            .collect()
    }

    fn reconcile_displays(&mut self) {
        let displays = self.topology.displays();
        let desired: BTreeSet<DisplayId> = displays.iter().map(|display| display.id).collect();
        let stale: Vec<DisplayId> = self
            .surfaces
            .keys()
            .copied()
            .filter(|id| !desired.contains(id))
            .collect();
        for id in stale {
            tracing::info!(display = ?id, "display disconnected; tearing down surface");
            self.surfaces.remove(&id);
        }
        for display in &displays {
            match self.surfaces.get_mut(&display.id) {
                Some(surface) => surface.update_to_display_frame(*display),
                None => {
                    let display_id = display.id;
                    tracing::info!(display = ?display_id, "display connected; creating surface");
                    let window_id = WindowId(self.next_overlay_window);
                    self.next_overlay_window += 1;
                    let mut surface = OverlaySurface::new(window_id, *display);
                    surface.set_fill(self.fill);
                    surface.set_click_through(self.state.click_through());
                    surface.set_filters_enabled(self.state.filters_enabled());
                    self.surfaces.insert(display.id, surface);
                }
            }
        }
        self.last_displays = displays;
    }

    fn flush_surface_settings(&mut self) {
        if let Some(click_through) = self.state.take_click_through_change() {
            for surface in self.surfaces.values_mut() {
                surface.set_click_through(click_through);
            }
        }
        if let Some(filters) = self.state.take_filters_change() {
            for surface in self.surfaces.values_mut() {
                surface.set_filters_enabled(filters);
            }
        }
    }

    /// Expand every snapshot region by its purpose margin, clip per
    /// display, and push. Displays a region misses entirely are skipped
    /// for that region; a display left with zero regions gets its mask
    /// cleared outright.
    fn apply_snapshot(&mut self, snapshot: &ActiveWindowSnapshot) {
        let regions = snapshot.regions();
        for surface in self.surfaces.values_mut() {
            let bounds = surface.display().frame;
            let clipped: Vec<_> = regions
                .iter()
                .filter_map(|region| region.expanded_and_clipped(bounds))
                .collect();
            surface.apply_mask(&clipped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::sim::{SimDesktop, SimHandle};
    use crate::geometry::Rect;

    fn engine(
        handle: &SimHandle,
    ) -> OverlayEngine<SimHandle, SimHandle, SimHandle, SimHandle> {
        let resolver =
            SnapshotResolver::new(handle.clone(), handle.clone(), handle.clone());
        OverlayEngine::new(resolver, handle.clone(), TrackingProfile::standard())
    }

    #[test]
    fn start_creates_one_surface_per_display_and_resolves() {
        let handle = SimHandle::new(SimDesktop::single_display());
        handle
            .desktop_mut()
            .push_window(1, 42, Rect::new(0.0, 480.0, 800.0, 600.0));
        let mut engine = engine(&handle);
        engine.start(Instant::now());
        assert_eq!(engine.surfaces().count(), 1);
        assert!(engine.cached_snapshot().is_some());
    }

    #[test]
    fn own_overlay_surfaces_are_excluded_from_resolution() {
        let handle = SimHandle::new(SimDesktop::single_display());
        let mut engine = engine(&handle);
        let now = Instant::now();
        engine.start(now);
        // Inject the overlay's own window at the front of the z-order.
        let overlay_id = engine.surfaces().next().unwrap().window_id();
        {
            let mut desktop = handle.desktop_mut();
            desktop.push_window(overlay_id.0, 1, Rect::new(0.0, 0.0, 1920.0, 1080.0));
            desktop.push_window(2, 42, Rect::new(100.0, 100.0, 640.0, 480.0));
        }
        engine.tick(now);
        let snap = engine.cached_snapshot().unwrap();
        assert_eq!(snap.frame.width, 640.0);
    }

    #[test]
    fn resolution_miss_holds_the_previous_mask() {
        let handle = SimHandle::new(SimDesktop::single_display());
        handle
            .desktop_mut()
            .push_window(1, 42, Rect::new(0.0, 480.0, 800.0, 600.0));
        let mut engine = engine(&handle);
        let now = Instant::now();
        engine.start(now);
        let before = engine.cached_snapshot().cloned().unwrap();
        let count_before = engine.surfaces().next().unwrap().rasterization_count();
        // The host stops reporting anything at all.
        {
            let mut desktop = handle.desktop_mut();
            desktop.windows.clear();
            desktop.trusted = false;
        }
        engine.tick(now + Duration::from_millis(500));
        assert_eq!(engine.cached_snapshot(), Some(&before));
        let surface = engine.surfaces().next().unwrap();
        assert_eq!(surface.rasterization_count(), count_before);
    }

    #[test]
    fn topology_change_reconciles_surfaces() {
        let handle = SimHandle::new(SimDesktop::single_display());
        let mut engine = engine(&handle);
        let now = Instant::now();
        engine.start(now);
        assert_eq!(engine.surfaces().count(), 1);
        {
            let mut desktop = handle.desktop_mut();
            let second = crate::geometry::DisplayInfo::with_anchor(
                DisplayId(2),
                Rect::new(1920.0, 0.0, 1280.0, 1024.0),
                Rect::new(1920.0, 0.0, 1280.0, 1024.0),
                1.0,
                1080.0,
            );
            desktop.displays.push(second);
        }
        engine.refresh_overlay_windows();
        assert_eq!(engine.surfaces().count(), 2);
        handle.desktop_mut().displays.truncate(1);
        engine.refresh_overlay_windows();
        assert_eq!(engine.surfaces().count(), 1);
        assert!(engine.surface(DisplayId(2)).is_none());
    }

    #[test]
    fn idle_tick_snapshot_change_boosts_the_cadence() {
        let handle = SimHandle::new(SimDesktop::single_display());
        handle
            .desktop_mut()
            .push_window(1, 42, Rect::new(0.0, 480.0, 800.0, 600.0));
        let mut engine = engine(&handle);
        let now = Instant::now();
        engine.start(now);
        let later = now + Duration::from_secs(10);
        assert_eq!(engine.cadence_phase(later), CadencePhase::Idle);
        handle.desktop_mut().windows[0].bounds = Rect::new(300.0, 480.0, 800.0, 600.0);
        engine.tick(later);
        assert_eq!(engine.cadence_phase(later), CadencePhase::Boosted);
    }

    #[test]
    fn stop_clears_mask_state() {
        let handle = SimHandle::new(SimDesktop::single_display());
        handle
            .desktop_mut()
            .push_window(1, 42, Rect::new(0.0, 480.0, 800.0, 600.0));
        let mut engine = engine(&handle);
        engine.start(Instant::now());
        engine.stop();
        assert!(engine.cached_snapshot().is_none());
        for surface in engine.surfaces() {
            assert!(surface.applied_regions().is_empty());
        }
    }

    #[test]
    fn fill_style_reaches_surfaces_created_later() {
        let handle = SimHandle::new(SimDesktop::single_display());
        let mut engine = engine(&handle);
        let fill = FillStyle {
            opacity: 0.8,
            tint: [0, 0, 0],
        };
        engine.set_fill_style(fill);
        engine.start(Instant::now());
        assert!(engine.surfaces().all(|surface| surface.fill() == fill));
        {
            let mut desktop = handle.desktop_mut();
            let second = crate::geometry::DisplayInfo::with_anchor(
                DisplayId(2),
                Rect::new(1920.0, 0.0, 1280.0, 1024.0),
                Rect::new(1920.0, 0.0, 1280.0, 1024.0),
                1.0,
                1080.0,
            );
            desktop.displays.push(second);
        }
        engine.refresh_overlay_windows();
        assert_eq!(engine.surface(DisplayId(2)).unwrap().fill(), fill);
    }

    #[test]
    fn click_through_propagates_to_surfaces() {
        let handle = SimHandle::new(SimDesktop::single_display());
        let mut engine = engine(&handle);
        engine.start(Instant::now());
        engine.set_click_through(false);
        assert!(engine.surfaces().all(|surface| !surface.click_through()));
        engine.set_click_through(true);
        assert!(engine.surfaces().all(|surface| surface.click_through()));
    }
}
