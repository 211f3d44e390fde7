//! Spatial predicates and pose sampling for scene staging.
//!
//! Everything here is pure math over commanded poses and host-reported
//! bounds. Sampling draws from caller-supplied RNGs so a session seed
//! fully determines every proposed pose.

use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use scenegen_host::{Aabb, Orientation};

/// Euclidean distance between two points.
pub fn distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (a - b).norm()
}

/// Returns whether two boxes overlap once `padding` inflates the test.
///
/// Positive padding treats boxes as overlapping when they come within
/// that margin of each other; comparisons are closed, so touching faces
/// count as overlap.
pub fn overlaps(a: &Aabb, b: &Aabb, padding: f64) -> bool {
    let (amin, amax) = (a.min(), a.max());
    let (bmin, bmax) = (b.min(), b.max());
    (0..3).all(|i| amin[i] <= bmax[i] + padding && amax[i] >= bmin[i] - padding)
}

/// Shortest distance between two boxes.
///
/// Per-axis separations are clamped at zero and combined as a Euclidean
/// norm, so the result is 0 exactly when the boxes overlap or touch.
pub fn aabb_gap(a: &Aabb, b: &Aabb) -> f64 {
    let (amin, amax) = (a.min(), a.max());
    let (bmin, bmax) = (b.min(), b.max());

    let mut sum_sq = 0.0;
    for i in 0..3 {
        let gap = (bmin[i] - amax[i]).max(amin[i] - bmax[i]).max(0.0);
        sum_sq += gap * gap;
    }
    sum_sq.sqrt()
}

/// Orientation that aims the +X forward axis from one point at another.
///
/// Roll is always zero. Aiming a point at itself returns the identity
/// orientation.
pub fn look_rotation(from: &Vector3<f64>, to: &Vector3<f64>) -> Orientation {
    let delta = to - from;
    if delta.norm() == 0.0 {
        return Orientation::default();
    }

    let yaw = delta.y.atan2(delta.x).to_degrees();
    let pitch = delta.z.atan2(delta.x.hypot(delta.y)).to_degrees();
    Orientation::new(pitch, yaw, 0.0)
}

/// Angle between two vectors in degrees, 0 if either is zero-length.
pub fn angle_between_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let norms = a.norm() * b.norm();
    if norms == 0.0 {
        return 0.0;
    }
    let cos = (a.dot(b) / norms).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Draws a point from an axis-aligned Gaussian around `anchor`.
///
/// Standard deviations must be non-negative. A zero deviation pins that
/// axis to the anchor exactly, without consuming randomness for it.
pub fn sample_gaussian<R: Rng + ?Sized>(
    rng: &mut R,
    anchor: &Vector3<f64>,
    std: &Vector3<f64>,
) -> Vector3<f64> {
    Vector3::new(
        gauss_axis(rng, anchor.x, std.x),
        gauss_axis(rng, anchor.y, std.y),
        gauss_axis(rng, anchor.z, std.z),
    )
}

fn gauss_axis<R: Rng + ?Sized>(rng: &mut R, mean: f64, std: f64) -> f64 {
    if std == 0.0 {
        return mean;
    }
    let normal = Normal::new(mean, std).unwrap();
    normal.sample(rng)
}

/// Draws a flat heading with yaw uniform in [0, 360).
pub fn sample_yaw<R: Rng + ?Sized>(rng: &mut R) -> Orientation {
    Orientation::yaw_only(rng.gen_range(0.0..360.0))
}

/// Gaussian working volume the session stages into.
///
/// Objects scatter around `anchor`; the camera scatters around
/// `anchor + camera_offset` with its own (typically wider) deviations.
#[derive(Debug, Clone)]
pub struct WorkingVolume {
    /// Center of the object placement region
    pub anchor: Vector3<f64>,

    /// Per-axis deviation for object positions
    pub object_std: Vector3<f64>,

    /// Camera anchor relative to the object anchor
    pub camera_offset: Vector3<f64>,

    /// Per-axis deviation for camera positions
    pub camera_std: Vector3<f64>,
}

impl WorkingVolume {
    /// Returns the absolute camera anchor.
    pub fn camera_anchor(&self) -> Vector3<f64> {
        self.anchor + self.camera_offset
    }

    /// Draws an object position.
    pub fn sample_object_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector3<f64> {
        sample_gaussian(rng, &self.anchor, &self.object_std)
    }

    /// Draws a camera position.
    pub fn sample_camera_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector3<f64> {
        sample_gaussian(rng, &self.camera_anchor(), &self.camera_std)
    }
}
