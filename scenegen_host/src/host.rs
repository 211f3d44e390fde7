//! Core editor host trait for SceneGen pipelines.

use crate::error::HostError;
use crate::types::{
    ActorClass, ActorHandle, Aabb, CaptureHandle, CaptureStatus, Pose,
};
use nalgebra::Vector3;
use std::path::Path;
use std::time::Duration;

/// The central interface for editor interaction.
///
/// This trait abstracts the scene host so that staging and capture logic
/// can run against both a live editor and a headless simulation.
///
/// # Implementations
///
/// - **Simulation**: [`SimHost`](crate::SimHost) - in-memory world with a
///   virtual clock, used by tests and the batch driver
/// - **Production**: an adapter over the editor's scripting API
///
/// # Contract
///
/// - Handles are never recycled; operations on a destroyed actor return
///   [`HostError::DeadHandle`].
/// - `set_pose` is a teleport. The commanded pose is what `pose()` returns
///   afterwards; there is no physics settling.
/// - `bounds()` reflects the actor's *current* orientation and scale and
///   must be re-queried after every transform change.
/// - `request_capture` only enqueues work. Completion is observable via
///   `poll_capture`, and callers are free to never poll.
pub trait EditorHost {
    /// Spawns an actor and returns its handle.
    ///
    /// Fails with [`HostError::LoadFailure`] if the class references an
    /// asset the host cannot load.
    fn spawn(
        &mut self,
        class: ActorClass,
        label: &str,
        pose: Pose,
    ) -> Result<ActorHandle, HostError>;

    /// Destroys an actor. The handle is dead afterwards.
    fn destroy(&mut self, actor: ActorHandle) -> Result<(), HostError>;

    /// Returns whether the handle still refers to a live actor.
    fn is_alive(&self, actor: ActorHandle) -> bool;

    /// Teleports the actor to the given pose.
    fn set_pose(&mut self, actor: ActorHandle, pose: Pose) -> Result<(), HostError>;

    /// Returns the actor's current pose.
    fn pose(&self, actor: ActorHandle) -> Result<Pose, HostError>;

    /// Returns the actor's world-space bounding box.
    ///
    /// The box is axis-aligned in *world* space, so it depends on the
    /// actor's current orientation and scale.
    fn bounds(&self, actor: ActorHandle) -> Result<Aabb, HostError>;

    /// Sets the actor's per-axis scale.
    fn set_scale(&mut self, actor: ActorHandle, scale: Vector3<f64>) -> Result<(), HostError>;

    /// Assigns a material to one of the actor's mesh slots.
    fn set_material(
        &mut self,
        actor: ActorHandle,
        material: &str,
        slot: usize,
    ) -> Result<(), HostError>;

    /// Adds a tag to the actor. Tags are used for session-level sweeps.
    fn set_tag(&mut self, actor: ActorHandle, tag: &str) -> Result<(), HostError>;

    /// Returns all live actors carrying the given tag.
    fn find_by_tag(&self, tag: &str) -> Vec<ActorHandle>;

    /// Returns the actor's stable scene path (unique per actor).
    fn actor_path(&self, actor: ActorHandle) -> Result<String, HostError>;

    /// Enqueues a still capture from the given camera actor.
    ///
    /// The host lets the renderer settle for `settle` before writing the
    /// image to `destination`. Returns immediately with a handle; the
    /// caller may poll it or ignore it.
    fn request_capture(
        &mut self,
        camera: ActorHandle,
        destination: &Path,
        resolution: (u32, u32),
        settle: Duration,
    ) -> Result<CaptureHandle, HostError>;

    /// Reports the state of a previously requested capture.
    fn poll_capture(&self, capture: CaptureHandle) -> Result<CaptureStatus, HostError>;

    /// Returns the host clock as time since host creation.
    ///
    /// In simulation this is the virtual clock; tasks use it for pacing
    /// delays between frames.
    fn now(&self) -> Duration;
}
