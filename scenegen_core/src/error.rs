//! Error types for the staging and capture pipeline.

use scenegen_host::HostError;
use thiserror::Error;

/// Errors that abort a task or a whole session.
///
/// Rejected samples are *not* errors; the sampling policies report them
/// as ordinary `Ok(false)` outcomes. This enum covers real faults: the
/// host refusing an operation, unusable inputs, or record I/O failing.
#[derive(Debug, Error)]
pub enum SceneError {
    /// An editor host operation failed
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// A look-at was asked to aim at zero targets
    #[error("Look-at target set is empty")]
    EmptyTargetSet,

    /// Writing a frame record (or creating its directory) failed
    #[error("Record I/O error: {0}")]
    RecordIo(#[from] std::io::Error),

    /// Serializing a frame record failed
    #[error("Record encoding error: {0}")]
    RecordEncode(#[from] serde_json::Error),
}
