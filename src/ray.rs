//! Gaze ray to target plane intersection.
//!
//! Each eye's gaze ray runs from the eye position through a far point along
//! its corrected forward axis. The ray is intersected with the virtual
//! target plane at `z = -plane_depth` by solving the parametric line for the
//! plane's z, then evaluating x and y at that parameter. Per-eye hits are
//! averaged into the raw focus point. Near-parallel geometry holds the
//! previous point instead of producing a non-finite result.

use std::f32::consts::FRAC_PI_2;
use tracing::debug;

use crate::config::EngineConfig;
use crate::math::{Quat, Vec3};
use crate::sample::{EyePose, TrackingSample};

/// Denominator below this is treated as parallel to the plane.
const PARALLEL_EPSILON: f32 = 1e-6;

// ── RayIntersector ───────────────────────────────────────────

/// Computes the raw focus point on the target plane, holding the last good
/// value across degenerate frames.
#[derive(Debug, Default)]
pub struct RayIntersector {
    last_point: Option<Vec3>,
}

impl RayIntersector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intersect both eye rays with the target plane and average the hits.
    /// A missing eye contributes nothing; if neither eye yields a finite hit
    /// the previous point is returned unchanged (`None` before any hit).
    pub fn intersect(&mut self, sample: &TrackingSample, config: &EngineConfig) -> Option<Vec3> {
        let plane_z = -config.plane_depth();

        let left = sample
            .left_eye
            .and_then(|eye| eye_plane_hit(&eye, plane_z, config));
        let right = sample
            .right_eye
            .and_then(|eye| eye_plane_hit(&eye, plane_z, config));

        let point = match (left, right) {
            (Some(l), Some(r)) => Some(l.midpoint(r)),
            (Some(l), None) => Some(l),
            (None, Some(r)) => Some(r),
            (None, None) => None,
        };

        match point {
            Some(p) if p.is_finite() => {
                self.last_point = Some(p);
                Some(p)
            }
            _ => {
                if sample.has_any_eye() {
                    debug!(
                        "degenerate gaze geometry at t={:.3}s, holding previous focus",
                        sample.timestamp_s
                    );
                }
                self.last_point
            }
        }
    }

    /// The most recent finite focus point, if any.
    pub fn last_point(&self) -> Option<Vec3> {
        self.last_point
    }

    pub fn reset(&mut self) {
        self.last_point = None;
    }
}

/// Corrected forward direction for an eye: the calibration tilts are applied
/// in eye-local space before the eye's own orientation. Neutral vertical
/// tilt is pi/2, matching the tracker's eye-cone convention.
fn corrected_forward(eye: &EyePose, config: &EngineConfig) -> Vec3 {
    let tilt = Quat::from_euler(
        config.horizontal_tilt(),
        config.vertical_tilt() - FRAC_PI_2,
        0.0,
    );
    eye.orientation.rotate(tilt.rotate(Vec3::new(0.0, 0.0, -1.0)))
}

/// Two-point line-plane solve for one eye. The far point sits
/// `sight_length` along the corrected forward axis; x and y are evaluated
/// at the parameter where the line's z equals the plane's z. The y
/// numerator uses the y pair throughout.
fn eye_plane_hit(eye: &EyePose, plane_z: f32, config: &EngineConfig) -> Option<Vec3> {
    let forward = corrected_forward(eye, config);
    let far = eye.position.add(forward.scale(config.sight_length()));

    let denom = far.z - eye.position.z;
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = (plane_z - eye.position.z) / denom;
    let x = eye.position.x + (far.x - eye.position.x) * t;
    let y = eye.position.y + (far.y - eye.position.y) * t;

    let hit = Vec3::new(x, y, plane_z);
    hit.is_finite().then_some(hit)
}

// ── Tests ────────────────────────────────────────────────────
