//! Demo binary: runs the overlay engine against the simulated desktop and
//! logs mask activity. Useful for eyeballing cadence and mask behavior
//! without a real window server.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use focus_veil::drivers::sim::{SimDesktop, SimHandle};
use focus_veil::drivers::PointerPhase;
use focus_veil::{
    ControlFlow, EngineConfig, EngineLoop, MaskState, OverlayEngine, Rect, SnapshotResolver,
};

#[derive(Debug, Parser)]
#[command(name = "focus-veil", about = "Focus overlay engine demo")]
struct Args {
    /// Path to a YAML config file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tracking profile tier to select, overriding the config.
    #[arg(long)]
    profile: Option<String>,

    /// Number of loop iterations to run before exiting.
    #[arg(long, default_value_t = 40)]
    ticks: usize,
}

fn main() -> anyhow::Result<()> {
    focus_veil::tracing_sub::init_default();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path).context("loading config")?,
        None => EngineConfig::default(),
    };
    if let Some(profile) = args.profile {
        config.profile = profile;
    }
    let profile = config.selected_profile()?;
    tracing::info!(
        profile = %profile.name,
        "starting {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let handle = SimHandle::new(demo_desktop());
    let resolver = SnapshotResolver::new(handle.clone(), handle.clone(), handle.clone())
        .with_classifier(config.classifier.clone());
    let mut engine = OverlayEngine::new(resolver, handle.clone(), profile)
        .with_boost_durations(config.drag_boost(), config.release_boost());
    engine.set_fill_style(config.fill_style());
    engine.set_click_through(config.click_through);
    engine.set_filters_enabled(config.blur_enabled);

    let mut remaining = args.ticks;
    let mut event_loop = EngineLoop::new(handle.clone());
    event_loop.run(&mut engine, |engine| {
        // Nudge everything sideways so the masks visibly track it.
        {
            let mut desktop = handle.desktop_mut();
            for window in desktop.windows.iter_mut() {
                window.bounds.x += 6.0;
            }
        }
        for surface in engine.surfaces() {
            match surface.state() {
                MaskState::Masked(mask) => tracing::info!(
                    display = ?surface.display_id(),
                    regions = surface.applied_regions().len(),
                    rasterizations = surface.rasterization_count(),
                    coverage = format!("{:.3}", mask.opaque_fraction()),
                    "surface"
                ),
                MaskState::Uncovered => {
                    tracing::info!(display = ?surface.display_id(), "surface uncovered")
                }
            }
        }
        remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            ControlFlow::Quit
        } else {
            ControlFlow::Continue
        }
    });

    tracing::info!("done");
    Ok(())
}

/// A desktop with a focused editor window, a context menu above it, and a
/// short scripted drag to exercise the interaction boost.
fn demo_desktop() -> SimDesktop {
    let mut desktop = SimDesktop::single_display();
    // Front of the list = front of the z-order: the menu sits above the
    // editor it belongs to.
    desktop.push_window(2, 42, Rect::new(200.0, 160.0, 320.0, 420.0));
    desktop.windows[0].layer = 8;
    desktop.windows[0].name = Some("Edit Menu".into());
    desktop.push_window(1, 42, Rect::new(160.0, 120.0, 1200.0, 800.0));
    desktop.script_pointer([
        PointerPhase::Began,
        PointerPhase::Dragged,
        PointerPhase::Dragged,
        PointerPhase::Ended,
    ]);
    desktop
}
