//! Network construction error types.

use crate::domain::PlatformId;
use crate::timetable::StoreError;

/// Errors that can occur while building the platform graph.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The timetable could not be read; no partial network is usable
    #[error("failed to read timetable: {0}")]
    Store(#[from] StoreError),

    /// A hop points at a platform missing from the node set
    #[error("hop {from} -> {to} references unknown platform {missing}")]
    DanglingEdge {
        from: PlatformId,
        to: PlatformId,
        missing: PlatformId,
    },
}
