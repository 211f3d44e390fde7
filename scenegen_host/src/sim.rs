//! In-memory editor host for tests and batch runs.
//!
//! `SimHost` keeps the whole world in plain structs:
//! - Actors with poses, scales, tags and materials
//! - A mesh catalog mapping asset paths to local half-extents
//! - A virtual clock advanced by `tick()`
//! - Capture requests that complete after their settle delay
//!
//! Determinism: the host itself draws no randomness. Actor handles and
//! scene paths are assigned from monotonic counters, and map iteration
//! uses `BTreeMap` so tag sweeps visit actors in a stable order.

use crate::error::HostError;
use crate::host::EditorHost;
use crate::types::{
    ActorClass, ActorHandle, Aabb, CaptureHandle, CaptureStatus, Pose,
};
use nalgebra::Vector3;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error};

/// Half-extent used for camera actor bounds (editor units).
const CAMERA_HALF_EXTENT: f64 = 15.0;

/// Catalog entry describing a loadable mesh asset.
#[derive(Debug, Clone)]
pub struct MeshAsset {
    /// Local-space half-extents at scale 1.0
    pub half_extents: Vector3<f64>,
}

impl MeshAsset {
    /// Creates a mesh asset from per-axis half-extents.
    pub fn new(hx: f64, hy: f64, hz: f64) -> Self {
        Self {
            half_extents: Vector3::new(hx, hy, hz),
        }
    }
}

/// One actor in the simulated world.
#[derive(Debug, Clone)]
struct SimActor {
    class: ActorClass,
    label: String,
    path: String,
    pose: Pose,
    scale: Vector3<f64>,
    tags: Vec<String>,
    materials: BTreeMap<usize, String>,
    alive: bool,
}

/// One capture request in flight or completed.
#[derive(Debug, Clone)]
struct SimCapture {
    camera: ActorHandle,
    destination: PathBuf,
    resolution: (u32, u32),
    due: Duration,
    completed: bool,
}

/// Simulated editor host.
///
/// The world starts empty; register meshes and materials before spawning.
/// Time only moves when the embedding calls [`SimHost::tick`].
#[derive(Debug, Default)]
pub struct SimHost {
    /// Loadable mesh assets by path
    assets: BTreeMap<String, MeshAsset>,

    /// Loadable material paths
    materials: Vec<String>,

    /// All actors ever spawned (dead ones stay, flagged)
    actors: BTreeMap<u64, SimActor>,

    /// Next actor handle (never recycled)
    next_actor: u64,

    /// All capture requests ever made
    captures: BTreeMap<u64, SimCapture>,

    /// Next capture handle (never recycled)
    next_capture: u64,

    /// Virtual clock since host creation
    clock: Duration,
}

impl SimHost {
    /// Creates an empty simulated world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mesh asset so `spawn` can load it.
    pub fn register_mesh(&mut self, path: impl Into<String>, asset: MeshAsset) {
        self.assets.insert(path.into(), asset);
    }

    /// Registers a material asset so `set_material` can load it.
    pub fn register_material(&mut self, path: impl Into<String>) {
        self.materials.push(path.into());
    }

    /// Advances the virtual clock and completes captures that are due.
    ///
    /// Completed captures write a small stub file to their destination so
    /// tests can assert on outputs without a renderer.
    pub fn tick(&mut self, dt: Duration) {
        self.clock += dt;

        for (id, capture) in self.captures.iter_mut() {
            if capture.completed || capture.due > self.clock {
                continue;
            }
            let (w, h) = capture.resolution;
            let stub = format!("SIMHOST CAPTURE {}x{}\n", w, h);
            if let Err(e) = std::fs::write(&capture.destination, stub) {
                error!(
                    capture = *id,
                    path = %capture.destination.display(),
                    "capture write failed: {}", e
                );
            }
            capture.completed = true;
            debug!(
                capture = *id,
                camera = %capture.camera,
                path = %capture.destination.display(),
                "capture completed"
            );
        }
    }

    /// Returns how many captures were requested over the host's lifetime.
    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    /// Returns how many captures have completed.
    pub fn completed_capture_count(&self) -> usize {
        self.captures.values().filter(|c| c.completed).count()
    }

    /// Returns the number of live actors.
    pub fn live_actor_count(&self) -> usize {
        self.actors.values().filter(|a| a.alive).count()
    }

    /// Returns the material assigned to an actor's slot, if any.
    pub fn material_in_slot(&self, actor: ActorHandle, slot: usize) -> Option<&str> {
        self.actors
            .get(&actor.0)
            .and_then(|a| a.materials.get(&slot))
            .map(String::as_str)
    }

    fn live(&self, actor: ActorHandle) -> Result<&SimActor, HostError> {
        self.actors
            .get(&actor.0)
            .filter(|a| a.alive)
            .ok_or(HostError::DeadHandle(actor))
    }

    fn live_mut(&mut self, actor: ActorHandle) -> Result<&mut SimActor, HostError> {
        self.actors
            .get_mut(&actor.0)
            .filter(|a| a.alive)
            .ok_or(HostError::DeadHandle(actor))
    }
}

impl EditorHost for SimHost {
    fn spawn(
        &mut self,
        class: ActorClass,
        label: &str,
        pose: Pose,
    ) -> Result<ActorHandle, HostError> {
        if let ActorClass::StaticMesh { mesh } = &class {
            if !self.assets.contains_key(mesh) {
                return Err(HostError::load_failure(mesh.clone()));
            }
        }

        let id = self.next_actor;
        self.next_actor += 1;

        let actor = SimActor {
            class,
            label: label.to_string(),
            path: format!("/SceneGen/{}_{}", label, id),
            pose,
            scale: Vector3::new(1.0, 1.0, 1.0),
            tags: Vec::new(),
            materials: BTreeMap::new(),
            alive: true,
        };
        self.actors.insert(id, actor);
        debug!(actor = id, label, "spawned actor");

        Ok(ActorHandle(id))
    }

    fn destroy(&mut self, actor: ActorHandle) -> Result<(), HostError> {
        let entry = self.live_mut(actor)?;
        entry.alive = false;
        debug!(actor = actor.0, "destroyed actor");
        Ok(())
    }

    fn is_alive(&self, actor: ActorHandle) -> bool {
        self.actors.get(&actor.0).map_or(false, |a| a.alive)
    }

    fn set_pose(&mut self, actor: ActorHandle, pose: Pose) -> Result<(), HostError> {
        self.live_mut(actor)?.pose = pose;
        Ok(())
    }

    fn pose(&self, actor: ActorHandle) -> Result<Pose, HostError> {
        Ok(self.live(actor)?.pose)
    }

    fn bounds(&self, actor: ActorHandle) -> Result<Aabb, HostError> {
        let entry = self.live(actor)?;

        let local = match &entry.class {
            ActorClass::StaticMesh { mesh } => {
                // Spawn validated the asset; a missing entry here means the
                // catalog was mutated after spawn.
                let asset = self
                    .assets
                    .get(mesh)
                    .ok_or_else(|| HostError::load_failure(mesh.clone()))?;
                asset.half_extents.component_mul(&entry.scale)
            }
            ActorClass::CineCamera => {
                Vector3::repeat(CAMERA_HALF_EXTENT).component_mul(&entry.scale)
            }
        };

        // World AABB of the rotated box: h_world[i] = sum_j |R[i,j]| * h[j]
        let rot = entry.pose.orientation.rotation();
        let m = rot.matrix();
        let mut world = Vector3::zeros();
        for i in 0..3 {
            for j in 0..3 {
                world[i] += m[(i, j)].abs() * local[j];
            }
        }

        Ok(Aabb::new(entry.pose.position, world))
    }

    fn set_scale(&mut self, actor: ActorHandle, scale: Vector3<f64>) -> Result<(), HostError> {
        self.live_mut(actor)?.scale = scale;
        Ok(())
    }

    fn set_material(
        &mut self,
        actor: ActorHandle,
        material: &str,
        slot: usize,
    ) -> Result<(), HostError> {
        if !self.materials.iter().any(|m| m == material) {
            return Err(HostError::load_failure(material));
        }
        self.live_mut(actor)?
            .materials
            .insert(slot, material.to_string());
        Ok(())
    }

    fn set_tag(&mut self, actor: ActorHandle, tag: &str) -> Result<(), HostError> {
        let entry = self.live_mut(actor)?;
        if !entry.tags.iter().any(|t| t == tag) {
            entry.tags.push(tag.to_string());
        }
        Ok(())
    }

    fn find_by_tag(&self, tag: &str) -> Vec<ActorHandle> {
        self.actors
            .iter()
            .filter(|(_, a)| a.alive && a.tags.iter().any(|t| t == tag))
            .map(|(id, _)| ActorHandle(*id))
            .collect()
    }

    fn actor_path(&self, actor: ActorHandle) -> Result<String, HostError> {
        Ok(self.live(actor)?.path.clone())
    }

    fn request_capture(
        &mut self,
        camera: ActorHandle,
        destination: &Path,
        resolution: (u32, u32),
        settle: Duration,
    ) -> Result<CaptureHandle, HostError> {
        self.live(camera)?;

        let id = self.next_capture;
        self.next_capture += 1;

        self.captures.insert(
            id,
            SimCapture {
                camera,
                destination: destination.to_path_buf(),
                resolution,
                due: self.clock + settle,
                completed: false,
            },
        );
        debug!(
            capture = id,
            camera = %camera,
            path = %destination.display(),
            "capture requested"
        );

        Ok(CaptureHandle(id))
    }

    fn poll_capture(&self, capture: CaptureHandle) -> Result<CaptureStatus, HostError> {
        let entry = self
            .captures
            .get(&capture.0)
            .ok_or(HostError::UnknownCapture(capture))?;
        Ok(if entry.completed {
            CaptureStatus::Completed
        } else {
            CaptureStatus::Pending
        })
    }

    fn now(&self) -> Duration {
        self.clock
    }
}
