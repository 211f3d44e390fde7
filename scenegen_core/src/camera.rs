//! Cinematic camera wrapper and lens model.

use crate::error::SceneError;
use crate::geometry;
use crate::object::Placeable;
use crate::SESSION_TAG;
use nalgebra::Vector3;
use scenegen_host::{
    ActorClass, ActorHandle, CaptureHandle, EditorHost, HostError, Orientation, Pose,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Physical lens and sensor parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Sensor width in millimeters
    pub sensor_width_mm: f64,

    /// Sensor height in millimeters
    pub sensor_height_mm: f64,

    /// Focal length in millimeters
    pub focal_length_mm: f64,

    /// Aperture as an f-stop number
    pub aperture_f: f64,
}

impl Default for CameraIntrinsics {
    /// A 50mm lens on a square 50mm sensor at f/10.
    fn default() -> Self {
        Self {
            sensor_width_mm: 50.0,
            sensor_height_mm: 50.0,
            focal_length_mm: 50.0,
            aperture_f: 10.0,
        }
    }
}

impl CameraIntrinsics {
    /// Horizontal and vertical field of view in degrees.
    ///
    /// Uses the pinhole model `fov = 2 * atan(sensor / (2 * focal))`.
    /// A non-positive focal length yields (0, 0) rather than NaN.
    pub fn field_of_view(&self) -> (f64, f64) {
        if self.focal_length_mm <= 0.0 {
            return (0.0, 0.0);
        }
        let h = 2.0 * (self.sensor_width_mm / (2.0 * self.focal_length_mm)).atan();
        let v = 2.0 * (self.sensor_height_mm / (2.0 * self.focal_length_mm)).atan();
        (h.to_degrees(), v.to_degrees())
    }
}

/// Focus configuration for the camera.
///
/// The variants carry their own requirements: manual focus always has a
/// distance, tracking always has a target. Any transition between modes
/// is legal at any time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FocusMode {
    /// No depth-of-field simulation
    #[default]
    Disabled,

    /// Fixed focus plane at a distance in editor units
    Manual {
        /// Focus distance in editor units
        distance: f64,
    },

    /// Focus follows an actor
    Tracking {
        /// Actor the focus plane follows
        target: ActorHandle,
    },
}

impl FocusMode {
    /// Record-friendly name of the mode.
    pub fn method_name(&self) -> &'static str {
        match self {
            FocusMode::Disabled => "disabled",
            FocusMode::Manual { .. } => "manual",
            FocusMode::Tracking { .. } => "tracking",
        }
    }

    /// Manual focus distance, 0 for the other modes.
    pub fn manual_distance(&self) -> f64 {
        match self {
            FocusMode::Manual { distance } => *distance,
            _ => 0.0,
        }
    }
}

/// The session's cinematic camera.
///
/// Like [`SceneObject`](crate::SceneObject), the wrapper caches the
/// commanded pose so frame records can snapshot it without re-querying
/// the host. Roll stays zero through every aim operation.
#[derive(Debug)]
pub struct SceneCamera {
    handle: ActorHandle,
    label: String,
    path: String,
    pose: Pose,
    intrinsics: CameraIntrinsics,
    focus: FocusMode,
    issued: Vec<CaptureHandle>,
}

impl SceneCamera {
    /// Spawns a camera actor at the origin and tags it for session sweeps.
    pub fn spawn(
        host: &mut dyn EditorHost,
        label: &str,
        intrinsics: CameraIntrinsics,
    ) -> Result<Self, SceneError> {
        let pose = Pose::default();
        let handle = host.spawn(ActorClass::CineCamera, label, pose)?;
        host.set_tag(handle, SESSION_TAG)?;
        let path = host.actor_path(handle)?;
        debug!(%handle, label, path, "spawned scene camera");

        Ok(Self {
            handle,
            label: label.to_string(),
            path,
            pose,
            intrinsics,
            focus: FocusMode::default(),
            issued: Vec::new(),
        })
    }

    /// Returns the underlying actor handle.
    pub fn handle(&self) -> ActorHandle {
        self.handle
    }

    /// Returns the lens parameters.
    pub fn intrinsics(&self) -> CameraIntrinsics {
        self.intrinsics
    }

    /// Horizontal and vertical field of view in degrees.
    pub fn field_of_view(&self) -> (f64, f64) {
        self.intrinsics.field_of_view()
    }

    /// Returns the current focus mode.
    pub fn focus(&self) -> FocusMode {
        self.focus
    }

    /// Switches focus mode. Takes effect from the next capture.
    pub fn set_focus(&mut self, mode: FocusMode) {
        self.focus = mode;
    }

    fn ensure_alive(&self, host: &dyn EditorHost) -> Result<(), SceneError> {
        if host.is_alive(self.handle) {
            Ok(())
        } else {
            Err(HostError::DeadHandle(self.handle).into())
        }
    }

    /// Teleports the camera, optionally re-orienting it.
    ///
    /// With `None` the previously commanded orientation is kept.
    pub fn move_to(
        &mut self,
        host: &mut dyn EditorHost,
        position: Vector3<f64>,
        orientation: Option<Orientation>,
    ) -> Result<(), SceneError> {
        self.ensure_alive(host)?;
        let pose = Pose::new(position, orientation.unwrap_or(self.pose.orientation));
        host.set_pose(self.handle, pose)?;
        self.pose = pose;
        Ok(())
    }

    /// Aims the camera at a world point without moving it. Roll is reset
    /// to zero.
    pub fn look_at(
        &mut self,
        host: &mut dyn EditorHost,
        target: &Vector3<f64>,
    ) -> Result<(), SceneError> {
        let rotation = geometry::look_rotation(&self.pose.position, target);
        self.move_to(host, self.pose.position, Some(rotation))
    }

    /// Aims the camera at the centroid of a target set.
    pub fn look_at_centroid(
        &mut self,
        host: &mut dyn EditorHost,
        targets: &[Vector3<f64>],
    ) -> Result<(), SceneError> {
        if targets.is_empty() {
            return Err(SceneError::EmptyTargetSet);
        }
        let centroid = targets.iter().sum::<Vector3<f64>>() / targets.len() as f64;
        self.look_at(host, &centroid)
    }

    /// Angle in degrees between the camera's forward axis and the
    /// direction to a target point. 0 when the target sits on the camera.
    pub fn angle_to(&self, target: &Vector3<f64>) -> f64 {
        let forward = self.pose.orientation.forward();
        let direction = target - self.pose.position;
        geometry::angle_between_deg(&forward, &direction)
    }

    /// Requests a still capture and retains the handle.
    ///
    /// The request is non-blocking; the host settles for `settle` before
    /// writing the image. Handles accumulate in the wrapper so a session
    /// can audit its requests, but polling them is optional.
    pub fn capture(
        &mut self,
        host: &mut dyn EditorHost,
        destination: &Path,
        resolution: (u32, u32),
        settle: Duration,
    ) -> Result<CaptureHandle, SceneError> {
        self.ensure_alive(host)?;
        let capture = host.request_capture(self.handle, destination, resolution, settle)?;
        self.issued.push(capture);
        debug!(%capture, destination = %destination.display(), "capture requested");
        Ok(capture)
    }

    /// All capture handles issued through this camera, oldest first.
    pub fn issued_captures(&self) -> &[CaptureHandle] {
        &self.issued
    }
}

impl Placeable for SceneCamera {
    fn label(&self) -> &str {
        &self.label
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn pose(&self) -> Pose {
        self.pose
    }
}
