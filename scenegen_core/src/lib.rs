//! SceneGen Core - Randomized Staging and Capture Pipeline
//!
//! This library turns a 3D scene host into a synthetic dataset factory:
//! 1. **Rejection sampling**: propose poses from a working volume, accept
//!    only layouts that satisfy spatial constraints, within bounded budgets
//! 2. **Cooperative scheduling**: frame work runs as small task state
//!    machines driven one step per host tick, never blocking the editor
//! 3. **Ground truth records**: every captured image gets a JSON twin
//!    describing the exact commanded scene state

pub mod camera;
pub mod error;
pub mod geometry;
pub mod object;
pub mod record;
pub mod runner;
pub mod session;

// Re-export key types for convenience
pub use camera::{CameraIntrinsics, FocusMode, SceneCamera};
pub use error::SceneError;
pub use geometry::WorkingVolume;
pub use object::{Placeable, SceneObject};
pub use record::FrameRecord;
pub use runner::{DelayTask, RunnerStatus, Step, Task, TaskRunner};
pub use session::{FrameStats, Session, SessionConfig, SessionStats, Stage};

/// Tag applied to every actor a session spawns.
///
/// Session startup destroys all actors carrying this tag, so leftovers
/// from an interrupted run never leak into the next dataset.
pub const SESSION_TAG: &str = "SCENEGEN_SESSION";
