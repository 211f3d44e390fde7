//! SceneGen batch driver library.
//!
//! Wires a [`SimHost`](scenegen_host::SimHost) world, the standard asset
//! set and a [`Session`](scenegen_core::Session) together into a runnable
//! batch. The binary in `main.rs` is a thin CLI over these pieces;
//! end-to-end tests drive the same code paths headlessly.

pub mod assets;
pub mod driver;

pub use assets::{editor_host, build_stage};
pub use driver::drive;
