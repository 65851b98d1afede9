//! Engine configuration — validated tunables with setter-side clamping.
//!
//! All calibration parameters live in one owned `EngineConfig` handed to the
//! engine at construction. Out-of-range writes are clamped to the documented
//! bounds at write time; reads never re-validate. Settings UI input arrives
//! as `ConfigUpdate` values which the engine drains at the start of its next
//! evaluation tick, so no write ever races a poll.

use std::f32::consts::FRAC_PI_2;
use tracing::debug;

// ── Bounds ───────────────────────────────────────────────────

pub const PLANE_DEPTH_MIN: f32 = 0.03;
pub const PLANE_DEPTH_MAX: f32 = 0.13;
pub const HORIZONTAL_TILT_MIN: f32 = -0.5;
pub const HORIZONTAL_TILT_MAX: f32 = 0.5;
pub const VERTICAL_TILT_MIN: f32 = FRAC_PI_2 - 0.5;
pub const VERTICAL_TILT_MAX: f32 = FRAC_PI_2 + 0.5;
pub const SMOOTHING_WINDOW_MIN: usize = 1;
pub const SMOOTHING_WINDOW_MAX: usize = 30;
pub const DOUBLE_BLINK_WINDOW_MIN_S: f64 = 0.2;
pub const DOUBLE_BLINK_WINDOW_MAX_S: f64 = 3.0;
pub const COUNTER_THRESHOLD_MIN: u32 = 1;
pub const COUNTER_THRESHOLD_MAX: u32 = 30;
pub const SCROLL_DURATION_MIN_S: f64 = 0.2;
pub const SCROLL_DURATION_MAX_S: f64 = 10.0;
pub const ZONE_FRACTION_MIN: f32 = 0.05;
pub const ZONE_FRACTION_MAX: f32 = 0.45;
pub const ZONE_OVERSCAN_MIN: f32 = 0.0;
pub const ZONE_OVERSCAN_MAX: f32 = 400.0;
pub const DISMISS_DURATION_MIN_S: f64 = 0.05;
pub const DISMISS_DURATION_MAX_S: f64 = 2.0;

// ── EngineConfig ─────────────────────────────────────────────

/// Validated engine tunables. Fields are private; every setter clamps.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Distance of the virtual target plane along -Z (meters).
    plane_depth: f32,
    /// Horizontal gaze tilt correction (radians, yaw).
    horizontal_tilt: f32,
    /// Vertical gaze tilt correction (radians; neutral at pi/2).
    vertical_tilt: f32,
    /// Distance of the far point used to parameterize each gaze ray (meters).
    sight_length: f32,
    /// Eyelid-closure signal above this starts a blink.
    blink_close_threshold: f32,
    /// Eyelid-closure signal below this completes a blink.
    blink_open_threshold: f32,
    /// Rolling-mean window for the focus smoother (samples).
    smoothing_window: usize,
    /// Two synchronized blinks within this window form a gesture (seconds).
    double_blink_window_s: f64,
    /// Consecutive zone hits required before a scroll fires.
    counter_threshold: u32,
    /// Scroll animation duration; also the cooldown length (seconds).
    scroll_duration_s: f64,
    /// Top/bottom scroll zone heights as fractions of the viewport.
    zone_fraction: f32,
    /// Zone overscan margin beyond the viewport edges (pixels).
    zone_overscan: f32,
    /// Gesture pulse lifetime before auto-dismissal (seconds).
    dismiss_duration_s: f64,
    /// Focus marker size hint for the renderer (pixels).
    aim_size: (f32, f32),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            plane_depth: 0.08,
            horizontal_tilt: 0.0,
            vertical_tilt: 1.6,
            sight_length: 0.4,
            blink_close_threshold: 0.8,
            blink_open_threshold: 0.2,
            smoothing_window: 8,
            double_blink_window_s: 1.0,
            counter_threshold: 6,
            scroll_duration_s: 2.0,
            zone_fraction: 0.2,
            zone_overscan: 50.0,
            dismiss_duration_s: 0.2,
            aim_size: (30.0, 30.0),
        }
    }
}

impl EngineConfig {
    pub fn plane_depth(&self) -> f32 {
        self.plane_depth
    }

    pub fn horizontal_tilt(&self) -> f32 {
        self.horizontal_tilt
    }

    pub fn vertical_tilt(&self) -> f32 {
        self.vertical_tilt
    }

    pub fn sight_length(&self) -> f32 {
        self.sight_length
    }

    pub fn blink_close_threshold(&self) -> f32 {
        self.blink_close_threshold
    }

    pub fn blink_open_threshold(&self) -> f32 {
        self.blink_open_threshold
    }

    pub fn smoothing_window(&self) -> usize {
        self.smoothing_window
    }

    pub fn double_blink_window_s(&self) -> f64 {
        self.double_blink_window_s
    }

    pub fn counter_threshold(&self) -> u32 {
        self.counter_threshold
    }

    pub fn scroll_duration_s(&self) -> f64 {
        self.scroll_duration_s
    }

    pub fn zone_fraction(&self) -> f32 {
        self.zone_fraction
    }

    pub fn zone_overscan(&self) -> f32 {
        self.zone_overscan
    }

    pub fn dismiss_duration_s(&self) -> f64 {
        self.dismiss_duration_s
    }

    pub fn aim_size(&self) -> (f32, f32) {
        self.aim_size
    }

    pub fn set_plane_depth(&mut self, depth: f32) {
        self.plane_depth = clamp_f32("plane_depth", depth, PLANE_DEPTH_MIN, PLANE_DEPTH_MAX);
    }

    pub fn set_horizontal_tilt(&mut self, tilt: f32) {
        self.horizontal_tilt = clamp_f32(
            "horizontal_tilt",
            tilt,
            HORIZONTAL_TILT_MIN,
            HORIZONTAL_TILT_MAX,
        );
    }

    pub fn set_vertical_tilt(&mut self, tilt: f32) {
        self.vertical_tilt = clamp_f32("vertical_tilt", tilt, VERTICAL_TILT_MIN, VERTICAL_TILT_MAX);
    }

    /// Blink thresholds clamp to (open, 1] and [0, close) respectively so the
    /// hysteresis ordering close > open always holds.
    pub fn set_blink_close_threshold(&mut self, threshold: f32) {
        let floor = self.blink_open_threshold + 0.01;
        self.blink_close_threshold = clamp_f32("blink_close_threshold", threshold, floor, 1.0);
    }

    pub fn set_blink_open_threshold(&mut self, threshold: f32) {
        let ceil = self.blink_close_threshold - 0.01;
        self.blink_open_threshold = clamp_f32("blink_open_threshold", threshold, 0.0, ceil);
    }

    pub fn set_smoothing_window(&mut self, window: usize) {
        let clamped = window.clamp(SMOOTHING_WINDOW_MIN, SMOOTHING_WINDOW_MAX);
        if clamped != window {
            debug!("smoothing_window {} clamped to {}", window, clamped);
        }
        self.smoothing_window = clamped;
    }

    pub fn set_double_blink_window_s(&mut self, window_s: f64) {
        self.double_blink_window_s = clamp_f64(
            "double_blink_window_s",
            window_s,
            DOUBLE_BLINK_WINDOW_MIN_S,
            DOUBLE_BLINK_WINDOW_MAX_S,
        );
    }

    pub fn set_counter_threshold(&mut self, threshold: u32) {
        let clamped = threshold.clamp(COUNTER_THRESHOLD_MIN, COUNTER_THRESHOLD_MAX);
        if clamped != threshold {
            debug!("counter_threshold {} clamped to {}", threshold, clamped);
        }
        self.counter_threshold = clamped;
    }

    pub fn set_scroll_duration_s(&mut self, duration_s: f64) {
        self.scroll_duration_s = clamp_f64(
            "scroll_duration_s",
            duration_s,
            SCROLL_DURATION_MIN_S,
            SCROLL_DURATION_MAX_S,
        );
    }

    pub fn set_zone_fraction(&mut self, fraction: f32) {
        self.zone_fraction = clamp_f32("zone_fraction", fraction, ZONE_FRACTION_MIN, ZONE_FRACTION_MAX);
    }

    pub fn set_zone_overscan(&mut self, overscan: f32) {
        self.zone_overscan = clamp_f32("zone_overscan", overscan, ZONE_OVERSCAN_MIN, ZONE_OVERSCAN_MAX);
    }

    pub fn set_dismiss_duration_s(&mut self, duration_s: f64) {
        self.dismiss_duration_s = clamp_f64(
            "dismiss_duration_s",
            duration_s,
            DISMISS_DURATION_MIN_S,
            DISMISS_DURATION_MAX_S,
        );
    }

    pub fn set_aim_size(&mut self, width: f32, height: f32) {
        self.aim_size = (width.max(1.0), height.max(1.0));
    }

    /// Apply one queued update through the clamping setters.
    pub fn apply(&mut self, update: ConfigUpdate) {
        match update {
            ConfigUpdate::PlaneDepth(v) => self.set_plane_depth(v),
            ConfigUpdate::HorizontalTilt(v) => self.set_horizontal_tilt(v),
            ConfigUpdate::VerticalTilt(v) => self.set_vertical_tilt(v),
            ConfigUpdate::BlinkCloseThreshold(v) => self.set_blink_close_threshold(v),
            ConfigUpdate::BlinkOpenThreshold(v) => self.set_blink_open_threshold(v),
            ConfigUpdate::SmoothingWindow(v) => self.set_smoothing_window(v),
            ConfigUpdate::DoubleBlinkWindowS(v) => self.set_double_blink_window_s(v),
            ConfigUpdate::CounterThreshold(v) => self.set_counter_threshold(v),
            ConfigUpdate::ScrollDurationS(v) => self.set_scroll_duration_s(v),
            ConfigUpdate::ZoneFraction(v) => self.set_zone_fraction(v),
            ConfigUpdate::ZoneOverscan(v) => self.set_zone_overscan(v),
            ConfigUpdate::DismissDurationS(v) => self.set_dismiss_duration_s(v),
        }
    }
}

fn clamp_f32(name: &str, value: f32, min: f32, max: f32) -> f32 {
    let clamped = if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    };
    if clamped != value {
        debug!("{} {} clamped to {}", name, value, clamped);
    }
    clamped
}

fn clamp_f64(name: &str, value: f64, min: f64, max: f64) -> f64 {
    let clamped = if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    };
    if clamped != value {
        debug!("{} {} clamped to {}", name, value, clamped);
    }
    clamped
}

// ── ConfigUpdate ─────────────────────────────────────────────

/// A single settings write, queued from UI input and drained by the engine
/// at the start of its next evaluation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigUpdate {
    PlaneDepth(f32),
    HorizontalTilt(f32),
    VerticalTilt(f32),
    BlinkCloseThreshold(f32),
    BlinkOpenThreshold(f32),
    SmoothingWindow(usize),
    DoubleBlinkWindowS(f64),
    CounterThreshold(u32),
    ScrollDurationS(f64),
    ZoneFraction(f32),
    ZoneOverscan(f32),
    DismissDurationS(f64),
}

// ── Tests ────────────────────────────────────────────────────
