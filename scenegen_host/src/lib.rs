//! SceneGen Editor Host Abstraction Layer
//!
//! This crate provides the abstraction allowing SceneGen pipelines to run
//! against both a **live editor** (Unreal) and a **headless simulation**.
//!
//! # Core Concept: The Host Boundary
//!
//! Everything the pipeline cannot compute by itself crosses one trait:
//! - Actor lifecycle (`spawn()`, `destroy()`)
//! - Transforms and bounds (`set_pose()`, `bounds()`)
//! - Capture requests (`request_capture()`)
//! - Time (`now()`)
//!
//! Pipeline code receives `&mut dyn EditorHost` explicitly; there is no
//! ambient editor singleton. Swapping the implementation swaps the world.
//!
//! # Example
//!
//! ```ignore
//! use scenegen_host::{EditorHost, ActorClass, Pose};
//!
//! fn stage_prop(host: &mut dyn EditorHost) -> Result<(), scenegen_host::HostError> {
//!     let prop = host.spawn(
//!         ActorClass::static_mesh("/Game/Shapes/Shape_Cube.Shape_Cube"),
//!         "Prop",
//!         Pose::default(),
//!     )?;
//!     host.set_pose(prop, Pose::at(nalgebra::Vector3::new(0.0, 0.0, 120.0)))?;
//!     Ok(())
//! }
//! ```

mod error;
mod host;
mod sim;
mod types;

pub use error::HostError;
pub use host::EditorHost;
pub use sim::{MeshAsset, SimHost};
pub use types::{
    ActorClass, ActorHandle, Aabb, CaptureHandle, CaptureStatus, Orientation, Pose,
};
