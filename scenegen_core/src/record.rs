//! Ground truth frame records.
//!
//! Each captured image gets a JSON twin describing the commanded scene
//! state at the moment the capture was requested. Records are pure
//! snapshots: building one reads only cached wrapper state, so a record
//! can never disagree with what the pipeline asked the host to do.

use crate::camera::SceneCamera;
use crate::error::SceneError;
use crate::object::Placeable;
use nalgebra::Vector3;
use scenegen_host::{Orientation, Pose};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// World position as named fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Vector3<f64>> for LocationRecord {
    fn from(v: Vector3<f64>) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

/// Euler rotation in degrees as named fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationRecord {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl From<Orientation> for RotationRecord {
    fn from(o: Orientation) -> Self {
        Self {
            pitch: o.pitch,
            yaw: o.yaw,
            roll: o.roll,
        }
    }
}

/// Focus configuration at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusRecord {
    /// Focus method name: "disabled", "manual" or "tracking"
    pub method: String,

    /// Manual focus distance, 0 unless the method is "manual"
    pub manual_distance: f64,
}

/// Lens parameters plus the field of view they imply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntrinsicsRecord {
    pub sensor_width_mm: f64,
    pub sensor_height_mm: f64,
    pub focal_length_mm: f64,
    pub aperture_f: f64,
    pub hfov_deg: f64,
    pub vfov_deg: f64,
    pub focus: FocusRecord,
}

/// The camera's slice of a frame record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRecord {
    pub label: String,
    pub path: String,
    pub location: LocationRecord,
    pub rotation: RotationRecord,
    pub intrinsics: IntrinsicsRecord,
}

/// One staged object's slice of a frame record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorRecord {
    pub label: String,
    pub location: LocationRecord,
    pub rotation: RotationRecord,
}

impl ActorRecord {
    fn from_placeable(p: &dyn Placeable) -> Self {
        let Pose { position, orientation } = p.pose();
        Self {
            label: p.label().to_string(),
            location: position.into(),
            rotation: orientation.into(),
        }
    }
}

/// Complete ground truth for one frame.
///
/// Actors are keyed by their stable scene path; `BTreeMap` keeps the
/// serialized order deterministic across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub camera: CameraRecord,
    pub actors: BTreeMap<String, ActorRecord>,
}

impl FrameRecord {
    /// Snapshots the commanded state of a camera and its staged objects.
    pub fn snapshot<'a, I>(camera: &SceneCamera, objects: I) -> Self
    where
        I: IntoIterator<Item = &'a dyn Placeable>,
    {
        let intrinsics = camera.intrinsics();
        let (hfov, vfov) = intrinsics.field_of_view();
        let focus = camera.focus();
        let Pose { position, orientation } = camera.pose();

        let camera_record = CameraRecord {
            label: camera.label().to_string(),
            path: camera.path().to_string(),
            location: position.into(),
            rotation: orientation.into(),
            intrinsics: IntrinsicsRecord {
                sensor_width_mm: intrinsics.sensor_width_mm,
                sensor_height_mm: intrinsics.sensor_height_mm,
                focal_length_mm: intrinsics.focal_length_mm,
                aperture_f: intrinsics.aperture_f,
                hfov_deg: hfov,
                vfov_deg: vfov,
                focus: FocusRecord {
                    method: focus.method_name().to_string(),
                    manual_distance: focus.manual_distance(),
                },
            },
        };

        let actors = objects
            .into_iter()
            .map(|p| (p.path().to_string(), ActorRecord::from_placeable(p)))
            .collect();

        Self {
            camera: camera_record,
            actors,
        }
    }

    /// Writes the record as pretty-printed JSON.
    pub fn write_to_file(&self, path: &Path) -> Result<(), SceneError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
