//! Dwell-to-scroll controller.
//!
//! Polled at a fixed cadence by the host (independent of the tracker frame
//! rate): classifies the latest screen-space focus point into the top zone,
//! bottom zone, or neutral band, accumulates consecutive-hit counters, and
//! fires one debounced `ScrollCommand` per dwell. A cooldown equal to the
//! scroll animation duration suppresses evaluation entirely while a scroll
//! is in flight; the deadline is a stored instant checked against the clock,
//! not an OS timer.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::math::Vec2;

// ── Viewport ─────────────────────────────────────────────────

/// Host-reported scroll geometry, refreshed every poll. The controller
/// treats its own idea of the maximum offset as advisory and re-derives it
/// from this each time.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Visible width (pixels).
    pub width: f32,
    /// Visible height (pixels).
    pub height: f32,
    /// Current vertical content offset (pixels).
    pub offset_y: f32,
    /// Total content height (pixels).
    pub content_height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, offset_y: f32, content_height: f32) -> Self {
        Self {
            width,
            height,
            offset_y,
            content_height,
        }
    }

    /// Largest legal content offset.
    pub fn max_offset(&self) -> f32 {
        (self.content_height - self.height).max(0.0)
    }
}

// ── Scroll command ───────────────────────────────────────────

/// Scroll direction on the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// One debounced scroll step for the host to animate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCommand {
    pub direction: ScrollDirection,
    /// Absolute target offset, already clamped to the content bounds.
    pub target_offset: f32,
    /// Animation duration the host should use (seconds).
    pub duration_s: f64,
}

// ── Zone ─────────────────────────────────────────────────────

/// Which scroll zone a focus point falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Top,
    Bottom,
    Neutral,
}

// ── ScrollController ─────────────────────────────────────────

pub struct ScrollController {
    clock: Arc<dyn Clock>,
    consecutive_top_hits: u32,
    consecutive_bottom_hits: u32,
    cooldown_until: Option<Instant>,
}

impl ScrollController {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            consecutive_top_hits: 0,
            consecutive_bottom_hits: 0,
            cooldown_until: None,
        }
    }

    /// One fixed-cadence poll. `focus` is the latest projected focus point
    /// (None when no eye has been tracked yet this session).
    pub fn evaluate(
        &mut self,
        focus: Option<Vec2>,
        viewport: &Viewport,
        config: &EngineConfig,
    ) -> Option<ScrollCommand> {
        // In-flight scroll: skip evaluation entirely so dwell evidence does
        // not compound during the animation.
        if let Some(deadline) = self.cooldown_until {
            if self.clock.now() < deadline {
                return None;
            }
            self.cooldown_until = None;
        }

        let zone = focus.map_or(Zone::Neutral, |p| self.classify(p, viewport, config));

        match zone {
            Zone::Top => {
                self.consecutive_top_hits = self.consecutive_top_hits.saturating_add(1);
                self.consecutive_bottom_hits = 0;
            }
            Zone::Bottom => {
                self.consecutive_bottom_hits = self.consecutive_bottom_hits.saturating_add(1);
                self.consecutive_top_hits = 0;
            }
            Zone::Neutral => {
                self.consecutive_top_hits = 0;
                self.consecutive_bottom_hits = 0;
            }
        }

        let threshold = config.counter_threshold();
        if self.consecutive_top_hits > threshold {
            return self.fire(ScrollDirection::Up, viewport, config);
        }
        if self.consecutive_bottom_hits > threshold {
            return self.fire(ScrollDirection::Down, viewport, config);
        }
        None
    }

    /// Zone membership for a screen-space point, including the overscan
    /// margin beyond the viewport edges.
    fn classify(&self, point: Vec2, viewport: &Viewport, config: &EngineConfig) -> Zone {
        if !point.is_finite() {
            return Zone::Neutral;
        }
        let overscan = config.zone_overscan();
        if point.x < -overscan || point.x > viewport.width + overscan {
            return Zone::Neutral;
        }

        let band = viewport.height * config.zone_fraction();
        if point.y >= -overscan && point.y < band {
            Zone::Top
        } else if point.y > viewport.height - band && point.y <= viewport.height + overscan {
            Zone::Bottom
        } else {
            Zone::Neutral
        }
    }

    /// Issue a command for one scroll step (a third of the viewport), unless
    /// the content is already at that edge — then nothing fires and no
    /// cooldown starts.
    fn fire(
        &mut self,
        direction: ScrollDirection,
        viewport: &Viewport,
        config: &EngineConfig,
    ) -> Option<ScrollCommand> {
        let step = viewport.height / 3.0;
        let target = match direction {
            ScrollDirection::Up => (viewport.offset_y - step).max(0.0),
            ScrollDirection::Down => (viewport.offset_y + step).min(viewport.max_offset()),
        };

        if (target - viewport.offset_y).abs() < f32::EPSILON {
            debug!("scroll {} suppressed: already at content edge", direction.as_str());
            return None;
        }

        match direction {
            ScrollDirection::Up => self.consecutive_top_hits = 0,
            ScrollDirection::Down => self.consecutive_bottom_hits = 0,
        }
        let duration = config.scroll_duration_s();
        self.cooldown_until = Some(self.clock.now() + Duration::from_secs_f64(duration));

        info!(
            "scroll {} to offset {:.0} over {:.1}s",
            direction.as_str(),
            target,
            duration
        );
        Some(ScrollCommand {
            direction,
            target_offset: target,
            duration_s: duration,
        })
    }

    /// Whether a fired scroll is still cooling down.
    pub fn cooldown_active(&self) -> bool {
        self.cooldown_until
            .map(|deadline| self.clock.now() < deadline)
            .unwrap_or(false)
    }

    /// Current dwell counters (top, bottom).
    pub fn counters(&self) -> (u32, u32) {
        (self.consecutive_top_hits, self.consecutive_bottom_hits)
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TestClock;

    fn viewport() -> Viewport {
        // 375x812 screen over four pages of content.
        Viewport::new(375.0, 812.0, 0.0, 3248.0)
    }

    fn setup() -> (ScrollController, Arc<TestClock>, EngineConfig) {
        let clock = Arc::new(TestClock::new());
        let controller = ScrollController::new(clock.clone());
        (controller, clock, EngineConfig::default())
    }

    fn bottom_point(viewport: &Viewport) -> Vec2 {
        Vec2::new(viewport.width / 2.0, viewport.height - 10.0)
    }

    fn top_point(viewport: &Viewport) -> Vec2 {
        Vec2::new(viewport.width / 2.0, 10.0)
    }

    #[test]
    fn test_dwell_fires_exactly_one_command() {
        let (mut controller, clock, config) = setup();
        let vp = viewport();
        let threshold = config.counter_threshold();

        let mut commands = Vec::new();
        for _ in 0..=threshold {
            if let Some(cmd) = controller.evaluate(Some(bottom_point(&vp)), &vp, &config) {
                commands.push(cmd);
            }
            clock.advance(Duration::from_millis(100));
        }
        assert_eq!(commands.len(), 1, "threshold+1 polls fire exactly once");
        assert_eq!(commands[0].direction, ScrollDirection::Down);
        assert!((commands[0].target_offset - vp.height / 3.0).abs() < 0.5);

        // Point stays in the zone for the rest of the cooldown: nothing more.
        for _ in 0..10 {
            assert!(controller
                .evaluate(Some(bottom_point(&vp)), &vp, &config)
                .is_none());
            clock.advance(Duration::from_millis(100));
        }
    }

    #[test]
    fn test_cooldown_expires_after_scroll_duration() {
        let (mut controller, clock, config) = setup();
        let vp = viewport();

        for _ in 0..=config.counter_threshold() {
            controller.evaluate(Some(bottom_point(&vp)), &vp, &config);
        }
        assert!(controller.cooldown_active());

        clock.advance(Duration::from_secs_f64(config.scroll_duration_s()));
        assert!(!controller.cooldown_active());

        // Host reports the new offset; dwell must build up again from zero.
        let scrolled = Viewport::new(vp.width, vp.height, vp.height / 3.0, vp.content_height);
        let mut fired = 0;
        for _ in 0..=config.counter_threshold() {
            if controller
                .evaluate(Some(bottom_point(&scrolled)), &scrolled, &config)
                .is_some()
            {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_zone_exit_resets_counter() {
        let (mut controller, _clock, config) = setup();
        let vp = viewport();
        let center = Vec2::new(vp.width / 2.0, vp.height / 2.0);

        for _ in 0..config.counter_threshold() {
            controller.evaluate(Some(bottom_point(&vp)), &vp, &config);
        }
        assert_eq!(controller.counters().1, config.counter_threshold());

        controller.evaluate(Some(center), &vp, &config);
        assert_eq!(controller.counters(), (0, 0));
    }

    #[test]
    fn test_opposite_zone_resets_other_counter() {
        let (mut controller, _clock, config) = setup();
        let vp = viewport();

        for _ in 0..3 {
            controller.evaluate(Some(bottom_point(&vp)), &vp, &config);
        }
        controller.evaluate(Some(top_point(&vp)), &vp, &config);
        let (top, bottom) = controller.counters();
        assert_eq!(bottom, 0);
        assert_eq!(top, 1);
    }

    #[test]
    fn test_boundary_clamp_no_command_no_cooldown() {
        let (mut controller, _clock, config) = setup();
        // Already scrolled to the very bottom.
        let vp = Viewport::new(375.0, 812.0, 3248.0 - 812.0, 3248.0);

        for _ in 0..=(config.counter_threshold() + 5) {
            assert!(controller
                .evaluate(Some(bottom_point(&vp)), &vp, &config)
                .is_none());
        }
        assert!(!controller.cooldown_active(), "edge clamp must not arm cooldown");
    }

    #[test]
    fn test_scroll_up_from_top_suppressed() {
        let (mut controller, _clock, config) = setup();
        let vp = viewport(); // offset 0: top edge

        for _ in 0..=(config.counter_threshold() + 5) {
            assert!(controller
                .evaluate(Some(top_point(&vp)), &vp, &config)
                .is_none());
        }
        assert!(!controller.cooldown_active());
    }

    #[test]
    fn test_up_command_after_scrolling_down() {
        let (mut controller, _clock, config) = setup();
        let vp = Viewport::new(375.0, 812.0, 1000.0, 3248.0);

        let mut command = None;
        for _ in 0..=config.counter_threshold() {
            command = controller.evaluate(Some(top_point(&vp)), &vp, &config);
        }
        let cmd = command.expect("dwell at top should scroll up");
        assert_eq!(cmd.direction, ScrollDirection::Up);
        assert!((cmd.target_offset - (1000.0 - vp.height / 3.0)).abs() < 0.5);
    }

    #[test]
    fn test_final_step_clamps_to_max_offset() {
        let (mut controller, _clock, config) = setup();
        // 50px from the bottom: a full step would overshoot.
        let max = 3248.0 - 812.0;
        let vp = Viewport::new(375.0, 812.0, max - 50.0, 3248.0);

        let mut command = None;
        for _ in 0..=config.counter_threshold() {
            command = controller.evaluate(Some(bottom_point(&vp)), &vp, &config);
        }
        let cmd = command.expect("partial step should still fire");
        assert_eq!(cmd.target_offset, max);
    }

    #[test]
    fn test_no_focus_counts_as_neutral() {
        let (mut controller, _clock, config) = setup();
        let vp = viewport();

        for _ in 0..2 {
            controller.evaluate(Some(bottom_point(&vp)), &vp, &config);
        }
        controller.evaluate(None, &vp, &config);
        assert_eq!(controller.counters(), (0, 0));
    }

    #[test]
    fn test_overscan_extends_zone() {
        let (mut controller, _clock, config) = setup();
        let vp = viewport();

        // Slightly below the physical screen, within the overscan margin.
        let below = Vec2::new(vp.width / 2.0, vp.height + config.zone_overscan() / 2.0);
        controller.evaluate(Some(below), &vp, &config);
        assert_eq!(controller.counters().1, 1);

        // Far outside the overscan: neutral.
        let far = Vec2::new(vp.width / 2.0, vp.height + config.zone_overscan() * 3.0);
        controller.evaluate(Some(far), &vp, &config);
        assert_eq!(controller.counters(), (0, 0));
    }
}
