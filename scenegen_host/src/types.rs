//! Common types for the SceneGen host abstraction.

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Euler orientation in degrees, Unreal convention.
///
/// Axes are X-forward / Y-right / Z-up:
/// - `yaw` rotates about +Z (positive turns toward +Y)
/// - `pitch` tilts about the local Y axis (positive tilts toward +Z)
/// - `roll` banks about the local X axis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    /// Tilt above the horizontal plane, degrees
    pub pitch: f64,

    /// Heading in the horizontal plane, degrees
    pub yaw: f64,

    /// Bank about the forward axis, degrees
    pub roll: f64,
}

impl Orientation {
    /// Creates an orientation from pitch/yaw/roll in degrees.
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Creates a flat heading (pitch and roll zero).
    pub fn yaw_only(yaw: f64) -> Self {
        Self { pitch: 0.0, yaw, roll: 0.0 }
    }

    /// Returns the equivalent rotation matrix.
    pub fn rotation(&self) -> Rotation3<f64> {
        // nalgebra's (roll, pitch, yaw) order matches Rz(yaw)*Ry(pitch)*Rx(roll);
        // pitch is negated because +pitch tilts toward +Z in this convention.
        Rotation3::from_euler_angles(
            self.roll.to_radians(),
            -self.pitch.to_radians(),
            self.yaw.to_radians(),
        )
    }

    /// Returns the unit forward vector (+X rotated by this orientation).
    pub fn forward(&self) -> Vector3<f64> {
        self.rotation() * Vector3::x()
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(pitch={:.1}, yaw={:.1}, roll={:.1})",
            self.pitch, self.yaw, self.roll
        )
    }
}

/// A rigid transform: position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// World-space position (editor units)
    pub position: Vector3<f64>,

    /// World-space orientation
    pub orientation: Orientation,
}

impl Pose {
    /// Creates a pose from position and orientation.
    pub fn new(position: Vector3<f64>, orientation: Orientation) -> Self {
        Self { position, orientation }
    }

    /// Creates a pose at the given position with identity orientation.
    pub fn at(position: Vector3<f64>) -> Self {
        Self {
            position,
            orientation: Orientation::default(),
        }
    }
}

/// Axis-aligned bounding box stored as center plus half-extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Box center in world space
    pub origin: Vector3<f64>,

    /// Half-extent along each world axis (non-negative)
    pub half_extents: Vector3<f64>,
}

impl Aabb {
    /// Creates a box from center and half-extents.
    pub fn new(origin: Vector3<f64>, half_extents: Vector3<f64>) -> Self {
        Self { origin, half_extents }
    }

    /// Creates a box from opposite corners.
    pub fn from_min_max(min: Vector3<f64>, max: Vector3<f64>) -> Self {
        Self {
            origin: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    /// Returns the minimum corner.
    pub fn min(&self) -> Vector3<f64> {
        self.origin - self.half_extents
    }

    /// Returns the maximum corner.
    pub fn max(&self) -> Vector3<f64> {
        self.origin + self.half_extents
    }
}

/// Opaque handle to an actor owned by the host.
///
/// Handles stay unique for the lifetime of a host; destroying an actor
/// never recycles its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorHandle(pub u64);

impl std::fmt::Display for ActorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Opaque handle to an in-flight capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaptureHandle(pub u64);

impl std::fmt::Display for CaptureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "capture#{}", self.0)
    }
}

/// What kind of actor to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorClass {
    /// A static mesh prop, identified by its asset path
    StaticMesh {
        /// Mesh asset path, e.g. `/Game/Shapes/Shape_Cube.Shape_Cube`
        mesh: String,
    },

    /// A cinematic camera with physical lens settings
    CineCamera,
}

impl ActorClass {
    /// Creates a static mesh class from an asset path.
    pub fn static_mesh(mesh: impl Into<String>) -> Self {
        Self::StaticMesh { mesh: mesh.into() }
    }
}

/// State of a capture request as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Requested but not yet written to disk
    Pending,

    /// Image file has been written
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_forward_identity_is_x() {
        let fwd = Orientation::default().forward();
        assert_relative_eq!(fwd.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(fwd.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(fwd.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_forward_yaw_quarter_turn() {
        let fwd = Orientation::yaw_only(90.0).forward();
        assert_relative_eq!(fwd.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(fwd.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(fwd.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_forward_positive_pitch_tilts_up() {
        let fwd = Orientation::new(30.0, 0.0, 0.0).forward();
        assert_relative_eq!(fwd.x, 30f64.to_radians().cos(), epsilon = 1e-12);
        assert_relative_eq!(fwd.z, 30f64.to_radians().sin(), epsilon = 1e-12);
        assert!(fwd.z > 0.0);
    }

    #[test]
    fn test_aabb_corners_round_trip() {
        let min = Vector3::new(-1.0, -2.0, -3.0);
        let max = Vector3::new(5.0, 4.0, 3.0);
        let aabb = Aabb::from_min_max(min, max);

        assert_relative_eq!(aabb.min().x, min.x);
        assert_relative_eq!(aabb.max().y, max.y);
        assert_relative_eq!(aabb.origin.x, 2.0);
        assert_relative_eq!(aabb.half_extents.z, 3.0);
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(ActorHandle(7).to_string(), "actor#7");
        assert_eq!(CaptureHandle(3).to_string(), "capture#3");
    }
}
