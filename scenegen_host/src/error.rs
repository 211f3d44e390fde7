//! Error types for the SceneGen host abstraction.

use crate::types::{ActorHandle, CaptureHandle};
use thiserror::Error;

/// Errors reported by an editor host.
#[derive(Debug, Error)]
pub enum HostError {
    /// Operation addressed an actor that was destroyed or never existed
    #[error("Dead actor handle: {0}")]
    DeadHandle(ActorHandle),

    /// Asset could not be loaded (bad path, missing package)
    #[error("Asset load failed: {0}")]
    LoadFailure(String),

    /// Capture handle is not known to the host
    #[error("Unknown capture handle: {0}")]
    UnknownCapture(CaptureHandle),
}

impl HostError {
    /// Creates a load failure from an asset path.
    pub fn load_failure(asset: impl Into<String>) -> Self {
        Self::LoadFailure(asset.into())
    }
}
