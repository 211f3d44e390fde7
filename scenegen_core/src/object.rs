//! Scene object wrapper over host actors.
//!
//! `SceneObject` pairs a host actor handle with the identity and pose the
//! pipeline *commanded*. Ground truth records read the commanded pose, so
//! record contents never race against renderer state. Bounds are the one
//! exception: extents depend on current orientation, so every spatial
//! check re-queries them from the host.

use crate::error::SceneError;
use crate::geometry;
use crate::SESSION_TAG;
use nalgebra::Vector3;
use scenegen_host::{ActorClass, ActorHandle, Aabb, EditorHost, HostError, Pose};
use tracing::{debug, info};

/// Anything that can appear in a frame record.
pub trait Placeable {
    /// Human-readable label (not necessarily unique).
    fn label(&self) -> &str;

    /// Stable scene path (unique per actor).
    fn path(&self) -> &str;

    /// Last commanded pose.
    fn pose(&self) -> Pose;
}

/// A static mesh prop staged by the session.
#[derive(Debug)]
pub struct SceneObject {
    handle: ActorHandle,
    label: String,
    path: String,
    pose: Pose,
}

impl SceneObject {
    /// Spawns a mesh actor at the origin and tags it for session sweeps.
    ///
    /// An optional per-axis scale is applied immediately; bounds queried
    /// later already include it.
    pub fn spawn(
        host: &mut dyn EditorHost,
        mesh: &str,
        label: &str,
        scale: Option<Vector3<f64>>,
    ) -> Result<Self, SceneError> {
        let pose = Pose::default();
        let handle = host.spawn(ActorClass::static_mesh(mesh), label, pose)?;
        host.set_tag(handle, SESSION_TAG)?;
        if let Some(scale) = scale {
            host.set_scale(handle, scale)?;
        }
        let path = host.actor_path(handle)?;
        debug!(%handle, label, path, "spawned scene object");

        Ok(Self {
            handle,
            label: label.to_string(),
            path,
            pose,
        })
    }

    /// Returns the underlying actor handle.
    pub fn handle(&self) -> ActorHandle {
        self.handle
    }

    /// Returns whether the backing actor is still alive.
    pub fn is_alive(&self, host: &dyn EditorHost) -> bool {
        host.is_alive(self.handle)
    }

    fn ensure_alive(&self, host: &dyn EditorHost) -> Result<(), SceneError> {
        if host.is_alive(self.handle) {
            Ok(())
        } else {
            Err(HostError::DeadHandle(self.handle).into())
        }
    }

    /// Teleports the object and caches the commanded pose.
    pub fn move_to(&mut self, host: &mut dyn EditorHost, pose: Pose) -> Result<(), SceneError> {
        self.ensure_alive(host)?;
        host.set_pose(self.handle, pose)?;
        self.pose = pose;
        Ok(())
    }

    /// Queries the current world-space bounds from the host.
    pub fn bounds(&self, host: &dyn EditorHost) -> Result<Aabb, SceneError> {
        self.ensure_alive(host)?;
        Ok(host.bounds(self.handle)?)
    }

    /// Returns whether this object's padded bounds overlap another's.
    pub fn overlaps(
        &self,
        host: &dyn EditorHost,
        other: &SceneObject,
        padding: f64,
    ) -> Result<bool, SceneError> {
        let a = self.bounds(host)?;
        let b = other.bounds(host)?;
        Ok(geometry::overlaps(&a, &b, padding))
    }

    /// Pivot-to-pivot distance to another object.
    pub fn distance_to(
        &self,
        host: &dyn EditorHost,
        other: &SceneObject,
    ) -> Result<f64, SceneError> {
        self.ensure_alive(host)?;
        other.ensure_alive(host)?;
        Ok(geometry::distance(&self.pose.position, &other.pose.position))
    }

    /// Shortest gap between this object's bounds and another's.
    pub fn gap_to(&self, host: &dyn EditorHost, other: &SceneObject) -> Result<f64, SceneError> {
        let a = self.bounds(host)?;
        let b = other.bounds(host)?;
        Ok(geometry::aabb_gap(&a, &b))
    }

    /// Assigns a material to one of the mesh's slots.
    pub fn set_material(
        &mut self,
        host: &mut dyn EditorHost,
        material: &str,
        slot: usize,
    ) -> Result<(), SceneError> {
        self.ensure_alive(host)?;
        host.set_material(self.handle, material, slot)?;
        Ok(())
    }

    /// Destroys the backing actor.
    pub fn destroy(&mut self, host: &mut dyn EditorHost) -> Result<(), SceneError> {
        host.destroy(self.handle)?;
        Ok(())
    }
}

impl Placeable for SceneObject {
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

/// Destroys every live actor carrying the given tag.
///
/// Returns the number of actors destroyed. Run at session startup with
/// [`SESSION_TAG`] to clear leftovers from interrupted runs.
pub fn sweep_tagged(host: &mut dyn EditorHost, tag: &str) -> Result<usize, SceneError> {
    let actors = host.find_by_tag(tag);
    let count = actors.len();
    for actor in actors {
        host.destroy(actor)?;
    }
    if count > 0 {
        info!(count, tag, "swept leftover tagged actors");
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use scenegen_host::{MeshAsset, SimHost};

    const CUBE: &str = "/Game/Shapes/Shape_Cube.Shape_Cube";

    fn test_host() -> SimHost {
        let mut host = SimHost::new();
        host.register_mesh(CUBE, MeshAsset::new(50.0, 50.0, 50.0));
        host.register_material("/Game/Materials/M_Basic.M_Basic");
        host
    }

    #[test]
    fn test_spawn_tags_and_caches_path() {
        let mut host = test_host();
        let object = SceneObject::spawn(&mut host, CUBE, "Cube", None).unwrap();

        assert_eq!(host.find_by_tag(SESSION_TAG), vec![object.handle()]);
        assert_eq!(object.path(), host.actor_path(object.handle()).unwrap());
        assert_eq!(object.label(), "Cube");
    }

    #[test]
    fn test_move_to_updates_commanded_pose() {
        let mut host = test_host();
        let mut object = SceneObject::spawn(&mut host, CUBE, "Cube", None).unwrap();

        let pose = Pose::at(Vector3::new(10.0, 20.0, 30.0));
        object.move_to(&mut host, pose).unwrap();

        assert_eq!(object.pose(), pose);
        assert_eq!(host.pose(object.handle()).unwrap(), pose);

        // Teleporting to the same pose again changes nothing.
        object.move_to(&mut host, pose).unwrap();
        assert_eq!(object.pose(), pose);
        assert_eq!(host.pose(object.handle()).unwrap(), pose);
    }

    #[test]
    fn test_spatial_checks_between_objects() {
        let mut host = test_host();
        let mut a = SceneObject::spawn(&mut host, CUBE, "A", None).unwrap();
        let mut b = SceneObject::spawn(&mut host, CUBE, "B", None).unwrap();

        a.move_to(&mut host, Pose::at(Vector3::zeros())).unwrap();
        b.move_to(&mut host, Pose::at(Vector3::new(300.0, 0.0, 0.0)))
            .unwrap();

        assert!(!a.overlaps(&host, &b, 0.0).unwrap());
        assert!(a.overlaps(&host, &b, 150.0).unwrap());
        assert_relative_eq!(a.distance_to(&host, &b).unwrap(), 300.0);
        assert_relative_eq!(a.gap_to(&host, &b).unwrap(), 200.0);

        b.move_to(&mut host, Pose::at(Vector3::new(60.0, 0.0, 0.0)))
            .unwrap();
        assert!(a.overlaps(&host, &b, 0.0).unwrap());
        assert_relative_eq!(a.gap_to(&host, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_scaled_object_has_larger_bounds() {
        let mut host = test_host();
        let tall = SceneObject::spawn(&mut host, CUBE, "Tall", Some(Vector3::new(1.0, 1.0, 2.0)))
            .unwrap();

        let bounds = tall.bounds(&host).unwrap();
        assert_relative_eq!(bounds.half_extents.z, 100.0);
        assert_relative_eq!(bounds.half_extents.x, 50.0);
    }

    #[test]
    fn test_dead_wrapper_rejects_operations() {
        let mut host = test_host();
        let mut a = SceneObject::spawn(&mut host, CUBE, "A", None).unwrap();
        let b = SceneObject::spawn(&mut host, CUBE, "B", None).unwrap();

        a.destroy(&mut host).unwrap();

        assert!(!a.is_alive(&host));
        assert!(matches!(
            a.move_to(&mut host, Pose::default()),
            Err(SceneError::Host(HostError::DeadHandle(_)))
        ));
        assert!(a.distance_to(&host, &b).is_err());
        assert!(b.distance_to(&host, &a).is_err());
        assert!(a.bounds(&host).is_err());
    }

    #[test]
    fn test_sweep_destroys_only_tagged() {
        let mut host = test_host();
        let a = SceneObject::spawn(&mut host, CUBE, "A", None).unwrap();
        let b = SceneObject::spawn(&mut host, CUBE, "B", None).unwrap();
        // An actor outside the session, untagged.
        let other = host
            .spawn(ActorClass::static_mesh(CUBE), "Bystander", Pose::default())
            .unwrap();

        let swept = sweep_tagged(&mut host, SESSION_TAG).unwrap();

        assert_eq!(swept, 2);
        assert!(!host.is_alive(a.handle()));
        assert!(!host.is_alive(b.handle()));
        assert!(host.is_alive(other));
        assert_eq!(sweep_tagged(&mut host, SESSION_TAG).unwrap(), 0);
    }

    #[test]
    fn test_set_material() {
        let mut host = test_host();
        let mut object = SceneObject::spawn(&mut host, CUBE, "Cube", None).unwrap();

        object
            .set_material(&mut host, "/Game/Materials/M_Basic.M_Basic", 0)
            .unwrap();
        assert_eq!(
            host.material_in_slot(object.handle(), 0),
            Some("/Game/Materials/M_Basic.M_Basic")
        );
    }
}
