use std::time::{Duration, Instant};

use crate::controller::OverlayEngine;
use crate::drivers::{Accessibility, CornerRadii, DisplayTopology, PointerSource, WindowServer};

/// Interval of the frame-synchronized fast path while a boost is active.
/// Stands in for a display-refresh callback (60 Hz).
const FRAME_SYNC_INTERVAL: Duration = Duration::from_millis(16);

pub enum ControlFlow {
    Continue,
    Quit,
}

/// The one polling loop that drives the engine.
///
/// There is exactly one timer per process, not per display: this loop owns
/// it. It is responsible for:
/// 1. Waiting out the cadence-chosen interval (idle or boosted) on the
///    pointer source, so interaction events wake it early.
/// 2. Feeding pointer transitions into the cadence.
/// 3. Dispatching full ticks when the interval elapses, and cheap
///    frame-synchronized re-checks in between while a boost is active.
///
/// Mask application happens synchronously inside the tick, on this thread;
/// by the time `tick` returns, every display has the new mask.
pub struct EngineLoop<P> {
    pointer: P,
}

impl<P: PointerSource> EngineLoop<P> {
    pub fn new(pointer: P) -> Self {
        Self { pointer }
    }

    pub fn pointer(&mut self) -> &mut P {
        &mut self.pointer
    }

    /// Drive one iteration: poll the pointer up to the next deadline, fold
    /// any transition into the cadence, then run whichever of the full
    /// tick or the frame-synchronized re-check is due. Returns the next
    /// tick deadline.
    pub fn step<S, A, C, D>(
        &mut self,
        engine: &mut OverlayEngine<S, A, C, D>,
        next_tick: Instant,
    ) -> Instant
    where
        S: WindowServer,
        A: Accessibility,
        C: CornerRadii,
        D: DisplayTopology,
    {
        let now = Instant::now();
        let until_tick = next_tick.saturating_duration_since(now);
        let wait = if engine.frame_sync_active(now) {
            until_tick.min(FRAME_SYNC_INTERVAL)
        } else {
            until_tick
        };
        if let Some(phase) = self.pointer.poll(wait) {
            engine.note_pointer(phase, Instant::now());
        }
        let now = Instant::now();
        if now >= next_tick {
            engine.tick(now);
            now + engine.tick_interval(now)
        } else {
            if engine.frame_sync_active(now) {
                engine.frame_tick(now);
            }
            next_tick
        }
    }

    /// Run until the handler quits. The handler is called once per loop
    /// iteration, after any tick, and decides whether to keep going.
    pub fn run<S, A, C, D, F>(&mut self, engine: &mut OverlayEngine<S, A, C, D>, mut handler: F)
    where
        S: WindowServer,
        A: Accessibility,
        C: CornerRadii,
        D: DisplayTopology,
        F: FnMut(&mut OverlayEngine<S, A, C, D>) -> ControlFlow,
    {
        let now = Instant::now();
        engine.start(now);
        let mut next_tick = now + engine.tick_interval(now);
        loop {
            next_tick = self.step(engine, next_tick);
            if let ControlFlow::Quit = handler(engine) {
                engine.stop();
                return;
            }
        }
    }
}
