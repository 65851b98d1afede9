//! Engine orchestration — one `GazeEngine` owning the whole pipeline.
//!
//! Per tracking sample: drain queued settings writes, run blink detection,
//! intersect the gaze rays with the target plane, smooth the hit, project it
//! to screen space through the renderer-supplied `FocusProjector`, and keep
//! the result as the latest focus coordinate. The host polls `poll()` on its
//! own fixed cadence to drive the scroll controller. Both entry points are
//! expected to run on one logical owner thread; settings writes from UI
//! input threads go through `queue_update` and are applied at the start of
//! the next tick, never concurrently with an evaluation.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::blink::{BlinkDetector, BlinkEvent};
use crate::clock::Clock;
use crate::config::{ConfigUpdate, EngineConfig};
use crate::math::{Vec2, Vec3};
use crate::ray::RayIntersector;
use crate::sample::TrackingSample;
use crate::scroll::{ScrollCommand, ScrollController, Viewport};
use crate::smoother::FocusSmoother;

// ── Focus projection seam ────────────────────────────────────

/// Maps a world-space focus point to screen pixels. Implemented by the
/// rendering collaborator, which owns the camera.
pub trait FocusProjector: Send {
    /// Screen position for a world point, or None if it projects off-camera.
    fn project(&self, world: Vec3) -> Option<Vec2>;
}

/// Simple projector for a fronto-parallel target plane: plane coordinates
/// map linearly onto the screen, origin top-left, y down. Used by the demo
/// binary and tests; a real renderer supplies its own camera projection.
#[derive(Debug, Clone, Copy)]
pub struct PlanarProjector {
    pub screen_width: f32,
    pub screen_height: f32,
    /// Physical extent of the target plane (meters).
    pub plane_width: f32,
    pub plane_height: f32,
}

impl PlanarProjector {
    pub fn new(screen_width: f32, screen_height: f32, plane_width: f32, plane_height: f32) -> Self {
        Self {
            screen_width,
            screen_height,
            plane_width,
            plane_height,
        }
    }
}

impl FocusProjector for PlanarProjector {
    fn project(&self, world: Vec3) -> Option<Vec2> {
        if !world.is_finite() || self.plane_width <= 0.0 || self.plane_height <= 0.0 {
            return None;
        }
        let u = world.x / self.plane_width + 0.5;
        let v = 0.5 - world.y / self.plane_height; // y-flip for screen coords
        Some(Vec2::new(u * self.screen_width, v * self.screen_height))
    }
}

// ── Frame output ─────────────────────────────────────────────

/// Result of processing one tracking sample.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Smoothed focus point on the target plane, if one could be computed.
    pub focus_world: Option<Vec3>,
    /// Screen-space projection of the focus point, for the focus marker.
    pub focus_screen: Option<Vec2>,
    /// Blink events emitted by this sample.
    pub events: Vec<BlinkEvent>,
}

impl FrameOutput {
    fn empty() -> Self {
        Self {
            focus_world: None,
            focus_screen: None,
            events: Vec::new(),
        }
    }

    /// Whether this frame produced the double-blink gesture.
    pub fn gesture_detected(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, BlinkEvent::DoubleBlink { .. }))
    }
}

// ── GazeEngine ───────────────────────────────────────────────

pub struct GazeEngine {
    config: EngineConfig,
    projector: Box<dyn FocusProjector>,
    clock: Arc<dyn Clock>,

    intersector: RayIntersector,
    smoother: FocusSmoother,
    blink: BlinkDetector,
    scroll: ScrollController,

    /// Latest projected focus, consumed by the poll loop.
    latest_focus: Option<Vec2>,
    /// Settings writes queued from UI input, drained at tick start.
    pending_updates: Mutex<Vec<ConfigUpdate>>,
    /// When the last double-blink gesture fired.
    last_gesture_at: Option<Instant>,
}

impl GazeEngine {
    pub fn new(
        config: EngineConfig,
        projector: Box<dyn FocusProjector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!("gaze engine initialized");
        Self {
            config,
            projector,
            clock: clock.clone(),
            intersector: RayIntersector::new(),
            smoother: FocusSmoother::new(),
            blink: BlinkDetector::new(),
            scroll: ScrollController::new(clock),
            latest_focus: None,
            pending_updates: Mutex::new(Vec::new()),
            last_gesture_at: None,
        }
    }

    /// Queue a settings write. Safe to call from a UI input thread; the
    /// update is applied at the start of the next evaluation tick.
    pub fn queue_update(&self, update: ConfigUpdate) {
        self.pending_updates.lock().unwrap().push(update);
    }

    fn drain_updates(&mut self) {
        let updates: Vec<ConfigUpdate> = self.pending_updates.lock().unwrap().drain(..).collect();
        for update in updates {
            debug!("applying config update {:?}", update);
            self.config.apply(update);
        }
    }

    /// Process one tracking sample: blink evaluation, ray intersection,
    /// smoothing, projection. A sample with no tracked eye is a no-op frame.
    pub fn on_sample(&mut self, sample: &TrackingSample) -> FrameOutput {
        self.drain_updates();

        if !sample.has_any_eye() {
            debug!("sample at t={:.3}s has no tracked eyes", sample.timestamp_s);
            return FrameOutput::empty();
        }

        let events = self.blink.update(sample, &self.config);

        let focus_world = self
            .intersector
            .intersect(sample, &self.config)
            .map(|raw| self.smoother.push(raw, self.config.smoothing_window()));

        let focus_screen = focus_world.and_then(|world| self.projector.project(world));
        if let Some(screen) = focus_screen {
            self.latest_focus = Some(screen);
        }

        if events
            .iter()
            .any(|e| matches!(e, BlinkEvent::DoubleBlink { .. }))
        {
            self.last_gesture_at = Some(self.clock.now());
        }

        FrameOutput {
            focus_world,
            focus_screen,
            events,
        }
    }

    /// Fixed-cadence scroll evaluation; the host calls this from its tick
    /// source (e.g. every 100 ms) with fresh viewport geometry.
    pub fn poll(&mut self, viewport: &Viewport) -> Option<ScrollCommand> {
        self.drain_updates();
        self.scroll.evaluate(self.latest_focus, viewport, &self.config)
    }

    /// Whether the double-blink gesture pulse is still live (e.g. for the
    /// renderer's flash effect). Expires `dismiss_duration_s` after firing.
    pub fn gesture_pulse_active(&self) -> bool {
        match self.last_gesture_at {
            Some(at) => {
                let lifetime = Duration::from_secs_f64(self.config.dismiss_duration_s());
                self.clock.now().duration_since(at) < lifetime
            }
            None => false,
        }
    }

    /// Latest projected focus coordinate, for drawing the focus marker.
    pub fn latest_focus(&self) -> Option<Vec2> {
        self.latest_focus
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TestClock;
    use crate::math::Quat;
    use crate::sample::EyePose;

    const SCREEN_W: f32 = 375.0;
    const SCREEN_H: f32 = 812.0;

    fn engine_with_clock() -> (GazeEngine, Arc<TestClock>) {
        let clock = Arc::new(TestClock::new());
        let mut config = EngineConfig::default();
        config.set_vertical_tilt(std::f32::consts::FRAC_PI_2);
        let projector = PlanarProjector::new(SCREEN_W, SCREEN_H, 0.2, 0.2);
        let engine = GazeEngine::new(config, Box::new(projector), clock.clone());
        (engine, clock)
    }

    fn gaze_sample(pitch: f32, t: f64) -> TrackingSample {
        let orientation = Quat::from_euler(0.0, pitch, 0.0);
        TrackingSample::binocular(
            EyePose::new(Vec3::new(-0.03, 0.0, 0.3), orientation),
            EyePose::new(Vec3::new(0.03, 0.0, 0.3), orientation),
            t,
        )
    }

    #[test]
    fn test_sample_produces_focus_and_projection() {
        let (mut engine, _clock) = engine_with_clock();
        let out = engine.on_sample(&gaze_sample(0.0, 0.0));

        let world = out.focus_world.expect("focus point expected");
        assert!(world.x.abs() < 1e-5);
        let screen = out.focus_screen.expect("projection expected");
        assert!((screen.x - SCREEN_W / 2.0).abs() < 1.0);
        assert_eq!(engine.latest_focus(), Some(screen));
    }

    #[test]
    fn test_eyeless_sample_is_noop() {
        let (mut engine, _clock) = engine_with_clock();
        engine.on_sample(&gaze_sample(0.0, 0.0));
        let before = engine.latest_focus();

        let mut blind = gaze_sample(0.0, 0.016);
        blind.left_eye = None;
        blind.right_eye = None;
        let out = engine.on_sample(&blind);

        assert!(out.focus_world.is_none());
        assert!(out.events.is_empty());
        assert_eq!(engine.latest_focus(), before, "latest focus must be retained");
    }

    #[test]
    fn test_downward_gaze_drives_scroll() {
        let (mut engine, _clock) = engine_with_clock();
        let vp = Viewport::new(SCREEN_W, SCREEN_H, 0.0, SCREEN_H * 4.0);

        // Look downward; verify the projection lands in the bottom zone,
        // then dwell through the debounce threshold.
        let out = engine.on_sample(&gaze_sample(-0.23, 0.0));
        let screen = out.focus_screen.unwrap();
        assert!(
            screen.y > SCREEN_H * 0.8,
            "downward gaze should project low on screen: {:?}",
            screen
        );

        let mut command = None;
        for _ in 0..=engine.config().counter_threshold() {
            command = engine.poll(&vp);
        }
        let cmd = command.expect("sustained bottom gaze should scroll");
        assert_eq!(cmd.direction, crate::scroll::ScrollDirection::Down);
    }

    #[test]
    fn test_double_blink_sets_gesture_pulse() {
        let (mut engine, clock) = engine_with_clock();

        engine.on_sample(&gaze_sample(0.0, 0.0).with_closure(0.9, 0.9));
        engine.on_sample(&gaze_sample(0.0, 0.1).with_closure(0.1, 0.1));
        engine.on_sample(&gaze_sample(0.0, 0.5).with_closure(0.9, 0.9));
        let out = engine.on_sample(&gaze_sample(0.0, 0.6).with_closure(0.1, 0.1));

        assert!(out.gesture_detected());
        assert!(engine.gesture_pulse_active());

        // Pulse dismisses itself after the configured duration.
        clock.advance(Duration::from_secs_f64(
            engine.config().dismiss_duration_s(),
        ));
        assert!(!engine.gesture_pulse_active());
    }

    #[test]
    fn test_queued_update_applies_on_next_tick() {
        let (mut engine, _clock) = engine_with_clock();
        assert_eq!(engine.config().smoothing_window(), 8);

        engine.queue_update(ConfigUpdate::SmoothingWindow(1));
        // Not applied until a tick runs.
        assert_eq!(engine.config().smoothing_window(), 8);

        engine.on_sample(&gaze_sample(0.0, 0.0));
        assert_eq!(engine.config().smoothing_window(), 1);
    }

    #[test]
    fn test_queued_update_clamped() {
        let (mut engine, _clock) = engine_with_clock();
        engine.queue_update(ConfigUpdate::SmoothingWindow(0));
        engine.on_sample(&gaze_sample(0.0, 0.0));
        assert_eq!(engine.config().smoothing_window(), 1);
    }

    #[test]
    fn test_planar_projector_center() {
        let projector = PlanarProjector::new(100.0, 200.0, 0.2, 0.2);
        let screen = projector.project(Vec3::new(0.0, 0.0, -0.08)).unwrap();
        assert!((screen.x - 50.0).abs() < 1e-4);
        assert!((screen.y - 100.0).abs() < 1e-4);

        // +y in plane space is up, which is a smaller screen y.
        let above = projector.project(Vec3::new(0.0, 0.05, -0.08)).unwrap();
        assert!(above.y < screen.y);
    }

    #[test]
    fn test_planar_projector_rejects_non_finite() {
        let projector = PlanarProjector::new(100.0, 200.0, 0.2, 0.2);
        assert!(projector.project(Vec3::new(f32::NAN, 0.0, 0.0)).is_none());
    }
}
