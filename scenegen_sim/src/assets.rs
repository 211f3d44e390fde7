//! Asset catalog and standard stage for batch sessions.
//!
//! The paths mirror an editor content layout; the half-extents give the
//! simulated host believable bounds for each mesh at scale 1.0.

use nalgebra::Vector3;
use scenegen_core::camera::{CameraIntrinsics, SceneCamera};
use scenegen_core::error::SceneError;
use scenegen_core::object::{sweep_tagged, SceneObject};
use scenegen_core::session::Stage;
use scenegen_core::SESSION_TAG;
use scenegen_host::{MeshAsset, SimHost};
use tracing::info;

/// Unit cube mesh, 100 units per side.
pub const CUBE_PATH: &str = "/Game/Shapes/Shape_Cube.Shape_Cube";

/// Boulder prop.
pub const ROCK_PATH: &str = "/Game/Props/SM_Rock.SM_Rock";

/// Flatbed truck prop.
pub const TRUCK_PATH: &str = "/Game/Vehicles/SM_Truck.SM_Truck";

/// Plain gray material used on the cube.
pub const BASIC_MATERIAL_PATH: &str = "/Game/Materials/M_Basic.M_Basic";

/// Creates a simulated editor world with the standard catalog loaded.
pub fn editor_host() -> SimHost {
    let mut host = SimHost::new();
    host.register_mesh(CUBE_PATH, MeshAsset::new(50.0, 50.0, 50.0));
    host.register_mesh(ROCK_PATH, MeshAsset::new(120.0, 90.0, 75.0));
    host.register_mesh(TRUCK_PATH, MeshAsset::new(260.0, 110.0, 130.0));
    host.register_material(BASIC_MATERIAL_PATH);
    host
}

/// Builds the standard stage: a tall cube, a rock, a truck and a camera.
///
/// Sweeps leftovers from previous sessions first, so re-running against
/// a persistent world never accumulates actors.
pub fn build_stage(host: &mut SimHost, seed: u64) -> Result<Stage, SceneError> {
    let swept = sweep_tagged(host, SESSION_TAG)?;
    if swept > 0 {
        info!(swept, "cleared previous session actors");
    }

    let mut cube = SceneObject::spawn(host, CUBE_PATH, "Cube", Some(Vector3::new(1.0, 1.0, 2.0)))?;
    cube.set_material(host, BASIC_MATERIAL_PATH, 0)?;
    let rock = SceneObject::spawn(host, ROCK_PATH, "Rock", None)?;
    let truck = SceneObject::spawn(host, TRUCK_PATH, "Truck", None)?;

    let camera = SceneCamera::spawn(host, "RenderCamera", CameraIntrinsics::default())?;

    Ok(Stage::new(vec![cube, rock, truck], camera, seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_catalog_loads_every_standard_asset() {
        let mut host = editor_host();
        let stage = build_stage(&mut host, 1).unwrap();

        assert_eq!(stage.objects.len(), 3);
        assert_eq!(host.live_actor_count(), 4);
        assert_eq!(
            host.material_in_slot(stage.objects[0].handle(), 0),
            Some(BASIC_MATERIAL_PATH)
        );
    }

    #[test]
    fn test_cube_spawns_doubled_in_height() {
        let mut host = editor_host();
        let stage = build_stage(&mut host, 1).unwrap();

        let bounds = stage.objects[0].bounds(&host).unwrap();
        assert_relative_eq!(bounds.half_extents.z, 100.0);
        assert_relative_eq!(bounds.half_extents.x, 50.0);
    }

    #[test]
    fn test_rebuild_sweeps_previous_session() {
        let mut host = editor_host();
        let first = build_stage(&mut host, 1).unwrap();
        let second = build_stage(&mut host, 1).unwrap();

        assert!(!first.objects[0].is_alive(&host));
        assert!(second.objects[0].is_alive(&host));
        assert_eq!(host.live_actor_count(), 4);
    }
}
