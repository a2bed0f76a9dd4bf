//! Tracking cadence: how often the focused window is re-sampled.
//!
//! Two logical states, Idle and Interaction-Boosted, plus a
//! frame-synchronized sub-mode layered on top of the boost while the
//! pointer is actively down. The state machine is pure: every transition
//! takes an explicit `Instant`, so tests drive it without real timers.

use std::time::{Duration, Instant};

use crate::constants::{DRAG_BOOST_DURATION, RELEASE_BOOST_DURATION};
use crate::drivers::PointerPhase;

/// Named polling configuration. Invariant: the interaction interval never
/// exceeds the idle interval; constructors clamp rather than reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingProfile {
    pub name: String,
    pub idle_interval: Duration,
    pub interaction_interval: Duration,
}

impl TrackingProfile {
    pub fn new(
        name: impl Into<String>,
        idle_interval: Duration,
        interaction_interval: Duration,
    ) -> Self {
        let name = name.into();
        let clamped = interaction_interval.min(idle_interval);
        if clamped != interaction_interval {
            tracing::warn!(
                profile = %name,
                "interaction interval exceeded idle interval; clamping"
            );
        }
        Self {
            name,
            idle_interval,
            interaction_interval: clamped,
        }
    }

    /// Default tier: easy on the CPU, re-samples a few times a second.
    pub fn standard() -> Self {
        Self::new(
            "standard",
            Duration::from_millis(400),
            Duration::from_millis(80),
        )
    }

    /// Snappier tier for users who drag windows around all day.
    pub fn high_performance() -> Self {
        Self::new(
            "high-performance",
            Duration::from_millis(200),
            Duration::from_millis(33),
        )
    }
}

impl Default for TrackingProfile {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadencePhase {
    Idle,
    Boosted,
}

/// The cadence state machine. Owned by the overlay engine; also read by the
/// frame-synchronized callback, which is why it is an explicit object
/// passed around rather than ambient state.
#[derive(Debug, Clone)]
pub struct Cadence {
    profile: TrackingProfile,
    drag_boost: Duration,
    release_boost: Duration,
    boost_deadline: Option<Instant>,
    frame_sync: bool,
}

impl Cadence {
    pub fn new(profile: TrackingProfile) -> Self {
        Self {
            profile,
            drag_boost: DRAG_BOOST_DURATION,
            release_boost: RELEASE_BOOST_DURATION,
            boost_deadline: None,
            frame_sync: false,
        }
    }

    /// Override the boost durations; the defaults suit most hosts.
    pub fn with_boost_durations(mut self, drag: Duration, release: Duration) -> Self {
        self.drag_boost = drag;
        self.release_boost = release;
        self
    }

    pub fn profile(&self) -> &TrackingProfile {
        &self.profile
    }

    /// Switch profiles at runtime. Takes effect on the next interval query;
    /// no restart of the polling loop is required.
    pub fn set_profile(&mut self, profile: TrackingProfile) {
        tracing::info!(profile = %profile.name, "tracking profile changed");
        self.profile = profile;
    }

    pub fn phase(&self, now: Instant) -> CadencePhase {
        match self.boost_deadline {
            Some(deadline) if deadline > now => CadencePhase::Boosted,
            _ => CadencePhase::Idle,
        }
    }

    /// The polling interval the next tick should be scheduled with.
    pub fn tick_interval(&self, now: Instant) -> Duration {
        match self.phase(now) {
            CadencePhase::Boosted => self.profile.interaction_interval,
            CadencePhase::Idle => self.profile.idle_interval,
        }
    }

    /// Whether the display-refresh-rate fast path should run this frame.
    pub fn frame_sync_active(&self, now: Instant) -> bool {
        self.frame_sync && self.phase(now) == CadencePhase::Boosted
    }

    /// Fold a pointer transition into the state machine. Presses and drags
    /// take the long boost and arm the frame-synchronized sub-mode; a
    /// release drops to the shorter cooldown boost and disarms it.
    pub fn note_pointer(&mut self, phase: PointerPhase, now: Instant) {
        match phase {
            PointerPhase::Began | PointerPhase::Dragged => {
                self.frame_sync = true;
                self.boost(self.drag_boost, now);
            }
            PointerPhase::Ended => {
                self.frame_sync = false;
                self.boost(self.release_boost, now);
            }
        }
    }

    /// A snapshot change observed on an idle-cadence tick also boosts: the
    /// window is moving even though we saw no pointer event for it.
    pub fn note_snapshot_changed(&mut self, now: Instant) {
        if self.phase(now) == CadencePhase::Idle {
            tracing::debug!("snapshot changed at idle cadence; boosting");
        }
        self.boost(self.drag_boost, now);
    }

    /// Boosting is idempotent: overlapping requests extend, never shorten,
    /// the rolling deadline.
    fn boost(&mut self, duration: Duration, now: Instant) {
        let candidate = now + duration;
        self.boost_deadline = Some(match self.boost_deadline {
            Some(existing) => existing.max(candidate),
            None => candidate,
        });
    }

    /// Retire an elapsed boost. Returns true when the machine transitioned
    /// back to Idle on this call.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.boost_deadline {
            Some(deadline) if deadline <= now => {
                self.boost_deadline = None;
                self.frame_sync = false;
                tracing::debug!("interaction boost expired; back to idle cadence");
                true
            }
            _ => false,
        }
    }

    /// Drop all boost state, used when tracking stops.
    pub fn reset(&mut self) {
        self.boost_deadline = None;
        self.frame_sync = false;
    }
}
