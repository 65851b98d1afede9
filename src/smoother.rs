//! Rolling-mean focus smoothing.
//!
//! Raw plane hits jitter with every tracker frame; the smoother keeps a FIFO
//! history and returns the component-wise mean of the most recent `window`
//! points. The window is live-adjustable (the "responsive ↔ smooth" slider)
//! and takes effect on the next push without a reset. A hard cap bounds the
//! history regardless of the configured window.

use std::collections::VecDeque;

use crate::math::Vec3;

/// Absolute upper bound on retained history, independent of the window.
pub const HISTORY_HARD_CAP: usize = 1000;

// ── FocusSmoother ────────────────────────────────────────────

#[derive(Debug)]
pub struct FocusSmoother {
    history: VecDeque<Vec3>,
}

impl FocusSmoother {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(64),
        }
    }

    /// Append a point and return the mean of the last `window` points.
    /// `window` is clamped to at least 1 here as a final guard; the config
    /// setters already enforce the documented bounds.
    pub fn push(&mut self, point: Vec3, window: usize) -> Vec3 {
        let window = window.max(1);

        self.history.push_back(point);

        // Compact down to the current window's tail if the cap is exceeded.
        if self.history.len() > HISTORY_HARD_CAP {
            let excess = self.history.len() - window.min(HISTORY_HARD_CAP);
            self.history.drain(..excess);
        }

        let n = self.history.len().min(window);
        let start = self.history.len() - n;
        let mut sum = Vec3::ZERO;
        for p in self.history.iter().skip(start) {
            sum = sum.add(*p);
        }
        sum.scale(1.0 / n as f32)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

impl Default for FocusSmoother {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_idempotence() {
        // Pushing the same point >= window times yields that exact point.
        let mut smoother = FocusSmoother::new();
        let p = Vec3::new(0.1, -0.2, -0.08);
        let mut out = Vec3::ZERO;
        for _ in 0..10 {
            out = smoother.push(p, 5);
        }
        assert!((out.x - p.x).abs() < 1e-6);
        assert!((out.y - p.y).abs() < 1e-6);
        assert!((out.z - p.z).abs() < 1e-6);
    }

    #[test]
    fn test_window_bound() {
        // After pushing more than `window` points, the mean depends only on
        // the last `window` pushes.
        let mut smoother = FocusSmoother::new();
        for _ in 0..20 {
            smoother.push(Vec3::new(100.0, 100.0, 100.0), 4);
        }
        let mut out = Vec3::ZERO;
        for _ in 0..4 {
            out = smoother.push(Vec3::new(1.0, 2.0, 3.0), 4);
        }
        assert!((out.x - 1.0).abs() < 1e-5, "early points leaked: {:?}", out);
        assert!((out.y - 2.0).abs() < 1e-5);
        assert!((out.z - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_partial_window_averages_what_exists() {
        let mut smoother = FocusSmoother::new();
        smoother.push(Vec3::new(0.0, 0.0, 0.0), 10);
        let out = smoother.push(Vec3::new(2.0, 2.0, 2.0), 10);
        assert!((out.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_window_change_applies_next_push() {
        let mut smoother = FocusSmoother::new();
        for _ in 0..8 {
            smoother.push(Vec3::new(0.0, 0.0, 0.0), 8);
        }
        // Shrinking the window to 1 makes the next push fully responsive.
        let out = smoother.push(Vec3::new(5.0, 5.0, 5.0), 1);
        assert!((out.x - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_history_hard_cap() {
        let mut smoother = FocusSmoother::new();
        for i in 0..(HISTORY_HARD_CAP + 500) {
            smoother.push(Vec3::new(i as f32, 0.0, 0.0), 30);
        }
        assert!(smoother.len() <= HISTORY_HARD_CAP);
    }

    #[test]
    fn test_reset() {
        let mut smoother = FocusSmoother::new();
        smoother.push(Vec3::new(1.0, 1.0, 1.0), 5);
        assert!(!smoother.is_empty());
        smoother.reset();
        assert!(smoother.is_empty());
    }
}
