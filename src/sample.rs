//! Tracking samples and sample sources.
//!
//! The face-tracking collaborator delivers one `TrackingSample` per update
//! (~60 Hz): both eye poses plus both eyelid-closure scalars. Either eye may
//! be absent in a frame; the engine skips that side. `SampleProvider` lets
//! tests and the demo binary drive the engine from a scripted or synthetic
//! sequence instead of real hardware.

use std::collections::VecDeque;

use crate::math::{Quat, Vec3};

// ── Eye pose ─────────────────────────────────────────────────

/// Position and orientation of one eye in tracker space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyePose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl EyePose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Identity-oriented pose at a position (forward along -Z).
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

// ── Tracking sample ──────────────────────────────────────────

/// One face-tracking update. Immutable once constructed; the engine copies
/// what it retains.
#[derive(Debug, Clone, Copy)]
pub struct TrackingSample {
    /// Left eye pose, if tracked this frame.
    pub left_eye: Option<EyePose>,
    /// Right eye pose, if tracked this frame.
    pub right_eye: Option<EyePose>,
    /// Left eyelid-closure signal in [0, 1]; 1.0 = fully closed.
    pub left_closure: f32,
    /// Right eyelid-closure signal in [0, 1]; 1.0 = fully closed.
    pub right_closure: f32,
    /// Tracker timestamp (seconds, monotonic).
    pub timestamp_s: f64,
}

impl TrackingSample {
    /// Sample with both eyes present and eyelids open.
    pub fn binocular(left: EyePose, right: EyePose, timestamp_s: f64) -> Self {
        Self {
            left_eye: Some(left),
            right_eye: Some(right),
            left_closure: 0.0,
            right_closure: 0.0,
            timestamp_s,
        }
    }

    pub fn with_closure(mut self, left: f32, right: f32) -> Self {
        self.left_closure = left.clamp(0.0, 1.0);
        self.right_closure = right.clamp(0.0, 1.0);
        self
    }

    /// Whether at least one eye was tracked this frame.
    pub fn has_any_eye(&self) -> bool {
        self.left_eye.is_some() || self.right_eye.is_some()
    }
}

// ── Sample provider ──────────────────────────────────────────

/// Trait for sources of tracking samples.
pub trait SampleProvider: Send {
    /// Get the next sample, if any.
    fn next_sample(&mut self) -> Option<TrackingSample>;
    /// Whether there are more samples to deliver.
    fn has_samples(&self) -> bool;
}

/// Delivers samples from a pre-defined queue.
pub struct ScriptedSampleProvider {
    samples: VecDeque<TrackingSample>,
}

impl ScriptedSampleProvider {
    pub fn new(samples: Vec<TrackingSample>) -> Self {
        Self {
            samples: VecDeque::from(samples),
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl SampleProvider for ScriptedSampleProvider {
    fn next_sample(&mut self) -> Option<TrackingSample> {
        self.samples.pop_front()
    }

    fn has_samples(&self) -> bool {
        !self.samples.is_empty()
    }
}

// ── Synthetic reading session ────────────────────────────────

/// Generates a synthetic reading session for development without tracking
/// hardware: gaze drifts from the middle of the page toward the bottom edge,
/// with a double blink partway through.
pub struct SyntheticReadingProvider {
    frame: u64,
    total_frames: u64,
    rate_hz: f64,
}

impl SyntheticReadingProvider {
    pub fn new(duration_s: f64, rate_hz: f64) -> Self {
        Self {
            frame: 0,
            total_frames: (duration_s * rate_hz).max(1.0) as u64,
            rate_hz,
        }
    }
}

impl SampleProvider for SyntheticReadingProvider {
    fn next_sample(&mut self) -> Option<TrackingSample> {
        if self.frame >= self.total_frames {
            return None;
        }
        let t = self.frame as f64 / self.rate_hz;
        self.frame += 1;

        // Eyes ~6cm apart, ~30cm from the screen, pitching slowly downward.
        let progress = (self.frame as f32) / (self.total_frames as f32);
        let pitch = -0.25 * progress;
        let orientation = Quat::from_euler(0.0, pitch, 0.0);
        let left = EyePose::new(Vec3::new(-0.03, 0.0, 0.3), orientation);
        let right = EyePose::new(Vec3::new(0.03, 0.0, 0.3), orientation);

        // Two synchronized blinks around the session midpoint, 0.5s apart.
        let mid = self.total_frames as f64 / self.rate_hz / 2.0;
        let closure = if (t - mid).abs() < 0.1 || (t - (mid + 0.5)).abs() < 0.1 {
            0.95
        } else {
            0.05
        };

        Some(TrackingSample::binocular(left, right, t).with_closure(closure, closure))
    }

    fn has_samples(&self) -> bool {
        self.frame < self.total_frames
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_provider_drains_in_order() {
        let samples = vec![
            TrackingSample::binocular(
                EyePose::at(Vec3::ZERO),
                EyePose::at(Vec3::new(0.06, 0.0, 0.0)),
                0.0,
            ),
            TrackingSample::binocular(
                EyePose::at(Vec3::ZERO),
                EyePose::at(Vec3::new(0.06, 0.0, 0.0)),
                0.016,
            ),
        ];
        let mut provider = ScriptedSampleProvider::new(samples);
        assert!(provider.has_samples());
        assert_eq!(provider.remaining(), 2);

        let s1 = provider.next_sample().unwrap();
        assert_eq!(s1.timestamp_s, 0.0);
        let s2 = provider.next_sample().unwrap();
        assert_eq!(s2.timestamp_s, 0.016);

        assert!(!provider.has_samples());
        assert!(provider.next_sample().is_none());
    }

    #[test]
    fn test_closure_clamped_to_unit_range() {
        let s = TrackingSample::binocular(
            EyePose::at(Vec3::ZERO),
            EyePose::at(Vec3::ZERO),
            0.0,
        )
        .with_closure(1.5, -0.2);
        assert_eq!(s.left_closure, 1.0);
        assert_eq!(s.right_closure, 0.0);
    }

    #[test]
    fn test_partial_sample() {
        let mut s = TrackingSample::binocular(
            EyePose::at(Vec3::ZERO),
            EyePose::at(Vec3::ZERO),
            0.0,
        );
        s.right_eye = None;
        assert!(s.has_any_eye());
        s.left_eye = None;
        assert!(!s.has_any_eye());
    }

    #[test]
    fn test_synthetic_session_bounded() {
        let mut provider = SyntheticReadingProvider::new(1.0, 60.0);
        let mut count = 0;
        let mut saw_blink = false;
        while let Some(sample) = provider.next_sample() {
            count += 1;
            if sample.left_closure > 0.9 {
                saw_blink = true;
            }
        }
        assert_eq!(count, 60);
        assert!(saw_blink, "synthetic session should contain blink frames");
    }
}
